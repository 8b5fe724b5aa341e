//! The data-store side of the interception seam.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ExecutorError;
use crate::query::QueryDescriptor;

/// Runs a (possibly rewritten) query against the data store.
///
/// Result shapes:
/// - `findUnique` / `findFirst` / `create` / `update` / `delete`: the row, or `null`
/// - `findMany`: an array of rows
/// - `count`: a number
/// - `updateMany` / `deleteMany`: `{ "count": n }`
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: QueryDescriptor) -> Result<Value, ExecutorError>;
}

#[async_trait]
impl<E> QueryExecutor for Arc<E>
where
    E: QueryExecutor + ?Sized,
{
    async fn execute(&self, query: QueryDescriptor) -> Result<Value, ExecutorError> {
        (**self).execute(query).await
    }
}
