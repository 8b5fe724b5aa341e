//! Audit record of what the interceptor did to a query.

use serde::Serialize;

use mentara_auth::Role;

use crate::error::RlsError;
use crate::query::{Operation, QueryDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// System caller or exempt role: the query was not touched.
    Bypassed,
    /// Entity without a table row, allowed by configuration.
    PassedThrough,
    /// The entity declares no rule for this operation class.
    Unrestricted,
    /// An ownership predicate was ANDed into `where`.
    Narrowed,
    /// An owner field was forced into `data`.
    Enforced,
    /// The query was refused and must not reach the store.
    Denied,
}

/// Why the interceptor let a query through, and in what form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub entity: String,
    pub operation: Operation,
    pub role: Option<Role>,
    pub outcome: Outcome,
    pub reason: String,
}

impl Decision {
    pub fn new(
        query: &QueryDescriptor,
        role: Option<Role>,
        outcome: Outcome,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            entity: query.entity_type.clone(),
            operation: query.operation,
            role,
            outcome,
            reason: reason.into(),
        }
    }
}

/// A rewritten query together with the decision that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Interception {
    pub query: QueryDescriptor,
    pub decision: Decision,
}

/// A refused query: the error surfaced to the caller plus the decision that
/// refused it.
#[derive(Debug, Clone, PartialEq)]
pub struct Denial {
    pub decision: Decision,
    pub error: RlsError,
}

impl Denial {
    /// `Forbidden(reason)`, recorded with the same reason.
    pub fn forbidden(query: &QueryDescriptor, role: Option<Role>, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            decision: Decision::new(query, role, Outcome::Denied, reason.clone()),
            error: RlsError::Forbidden(reason),
        }
    }
}

impl From<Denial> for RlsError {
    fn from(value: Denial) -> Self {
        value.error
    }
}
