//! Access-controlled entity types.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use mentara_core::DomainError;

/// Every data model the row-level rules know about.
///
/// Queries name their entity by string; anything that does not parse into
/// this enum is an unknown entity and is governed by
/// [`RlsConfig::unknown_entity`](crate::RlsConfig).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Entity {
    User,
    Meeting,
    Message,
    Conversation,
    Payment,
    Worksheet,
    Notification,
    Post,
    Comment,
}

impl Entity {
    pub const ALL: [Entity; 9] = [
        Entity::User,
        Entity::Meeting,
        Entity::Message,
        Entity::Conversation,
        Entity::Payment,
        Entity::Worksheet,
        Entity::Notification,
        Entity::Post,
        Entity::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Meeting => "Meeting",
            Entity::Message => "Message",
            Entity::Conversation => "Conversation",
            Entity::Payment => "Payment",
            Entity::Worksheet => "Worksheet",
            Entity::Notification => "Notification",
            Entity::Post => "Post",
            Entity::Comment => "Comment",
        }
    }
}

impl core::fmt::Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Entity {
    type Err = DomainError;

    /// Accepts model names (`"Meeting"`) and client delegate names (`"meeting"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Entity::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown entity '{s}'")))
    }
}
