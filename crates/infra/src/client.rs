//! RLS-guarded data client.
//!
//! Every query issued through [`RlsClient`] passes the interceptor before it
//! reaches the executor:
//!
//! ```text
//! Caller + QueryDescriptor
//!   ↓
//! 1. Intercept (bypass, narrow `where`, force owner into `data`, or refuse)
//!   ↓
//! 2. Execute the rewritten query
//! ```
//!
//! A refused query never reaches step 2. The interceptor may itself issue one
//! `findUnique` through the same executor to verify a write target.

use std::sync::Arc;

use serde_json::Value;
use tracing::{instrument, warn};

use mentara_auth::{AccessContext, Caller};
use mentara_rls::{ContextProvider, QueryDescriptor, QueryExecutor, RlsError, RlsInterceptor};

#[derive(Debug)]
pub struct RlsClient<E> {
    interceptor: Arc<RlsInterceptor>,
    executor: E,
}

impl<E: Clone> Clone for RlsClient<E> {
    fn clone(&self) -> Self {
        Self {
            interceptor: Arc::clone(&self.interceptor),
            executor: self.executor.clone(),
        }
    }
}

impl<E> RlsClient<E>
where
    E: QueryExecutor,
{
    pub fn new(interceptor: RlsInterceptor, executor: E) -> Self {
        Self {
            interceptor: Arc::new(interceptor),
            executor,
        }
    }

    /// Run `query` on behalf of `caller`.
    #[instrument(
        skip_all,
        fields(entity = %query.entity_type, operation = %query.operation)
    )]
    pub async fn execute(&self, caller: &Caller, query: QueryDescriptor) -> Result<Value, RlsError> {
        let interception = match self
            .interceptor
            .intercept_explained(caller, query, &self.executor)
            .await
        {
            Ok(i) => i,
            Err(denial) => {
                warn!(
                    role = ?denial.decision.role,
                    reason = %denial.decision.reason,
                    "query refused"
                );
                return Err(denial.error);
            }
        };
        Ok(self.executor.execute(interception.query).await?)
    }

    /// Open a request-scoped session with no identity installed yet.
    pub fn session(&self) -> RlsSession<'_, E> {
        RlsSession {
            client: self,
            provider: ContextProvider::new(),
        }
    }

    /// The unguarded executor, for seeding and system jobs.
    pub fn executor(&self) -> &E {
        &self.executor
    }
}

/// One request's view of the client: owns its own [`ContextProvider`].
#[derive(Debug)]
pub struct RlsSession<'a, E> {
    client: &'a RlsClient<E>,
    provider: ContextProvider,
}

impl<E> RlsSession<'_, E>
where
    E: QueryExecutor,
{
    pub fn set_context(&mut self, ctx: AccessContext) {
        self.provider.set_context(ctx);
    }

    pub fn clear_context(&mut self) {
        self.provider.clear_context();
    }

    pub fn caller(&self) -> Caller {
        self.provider.context()
    }

    pub async fn execute(&self, query: QueryDescriptor) -> Result<Value, RlsError> {
        self.client.execute(&self.caller(), query).await
    }
}
