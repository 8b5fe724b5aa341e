use thiserror::Error;

/// Failure reported by a [`QueryExecutor`](crate::QueryExecutor).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// The store cannot run this query (unknown entity, malformed args).
    #[error("unsupported query: {0}")]
    Unsupported(String),

    /// A single-row write matched no row.
    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("store failure: {0}")]
    Store(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RlsError {
    /// The caller may not run this query. The message is safe to show to users.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The ownership lookup (or the guarded query itself) failed in the store.
    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

impl RlsError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, RlsError::Forbidden(_))
    }
}
