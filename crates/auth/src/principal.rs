use serde::{Deserialize, Serialize};

use mentara_core::UserId;

use crate::Role;

/// Identity and role of the user a request acts for.
///
/// Built once per authenticated request (after token verification) and passed
/// by value or reference to every call site that can issue a query. It is
/// never stored on a long-lived service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessContext {
    pub user_id: UserId,
    pub role: Role,
}

impl AccessContext {
    pub fn new(user_id: impl Into<UserId>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Who is issuing a query.
///
/// `System` is the "no context" case: background jobs, seeders and other
/// trusted internal work that runs outside any user request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    System,
    User(AccessContext),
}

impl Caller {
    pub fn user(user_id: impl Into<UserId>, role: Role) -> Self {
        Caller::User(AccessContext::new(user_id, role))
    }

    pub fn access(&self) -> Option<&AccessContext> {
        match self {
            Caller::System => None,
            Caller::User(ctx) => Some(ctx),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, Caller::System)
    }
}

impl From<AccessContext> for Caller {
    fn from(value: AccessContext) -> Self {
        Caller::User(value)
    }
}

impl From<Option<AccessContext>> for Caller {
    fn from(value: Option<AccessContext>) -> Self {
        value.map(Caller::User).unwrap_or(Caller::System)
    }
}
