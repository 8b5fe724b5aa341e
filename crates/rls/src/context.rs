//! Request-scoped holder for the caller's access context.

use mentara_auth::{AccessContext, Caller};

/// Holds the access context for one request.
///
/// Each request owns its own provider (it is not `Clone` and is never put
/// behind shared state), so contexts cannot leak between concurrent requests.
/// An empty provider stands for a system caller.
#[derive(Debug, Default)]
pub struct ContextProvider {
    current: Option<AccessContext>,
}

impl ContextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the verified identity for this request.
    pub fn set_context(&mut self, ctx: AccessContext) {
        self.current = Some(ctx);
    }

    /// The current caller; [`Caller::System`] when no context is set.
    pub fn context(&self) -> Caller {
        self.current.clone().into()
    }

    /// Forget the identity (request teardown, logout).
    pub fn clear_context(&mut self) {
        self.current = None;
    }

    pub fn access(&self) -> Option<&AccessContext> {
        self.current.as_ref()
    }
}
