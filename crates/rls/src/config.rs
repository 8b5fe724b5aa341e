//! Fallthrough policy for queries no rule covers.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_ENTITY_VAR: &str = "MENTARA_RLS_UNKNOWN_ENTITY";
pub const MISSING_CONTEXT_VAR: &str = "MENTARA_RLS_MISSING_CONTEXT";

/// What to do with a query that no rule speaks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Pass the query through unmodified.
    #[default]
    Allow,
    /// Reject the query with `Forbidden`.
    Deny,
}

impl FromStr for Fallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Fallback::Allow),
            "deny" => Ok(Fallback::Deny),
            other => Err(ConfigError::InvalidValue(other.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid fallback '{0}' (expected 'allow' or 'deny')")]
    InvalidValue(String),
}

/// Interceptor configuration.
///
/// Defaults keep system jobs and entities without rules unrestricted.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RlsConfig {
    /// Entities with no row in the rule table (including unparseable names).
    pub unknown_entity: Fallback,
    /// Queries issued without an access context (system jobs).
    pub missing_context: Fallback,
}

impl RlsConfig {
    /// Fail closed everywhere: unknown entities and context-less queries are denied.
    pub fn strict() -> Self {
        Self {
            unknown_entity: Fallback::Deny,
            missing_context: Fallback::Deny,
        }
    }

    /// Read `MENTARA_RLS_UNKNOWN_ENTITY` / `MENTARA_RLS_MISSING_CONTEXT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Result<Fallback, ConfigError> {
            lookup(key)
                .map(|v| v.parse())
                .transpose()
                .map(Option::unwrap_or_default)
        };

        Ok(Self {
            unknown_entity: read(UNKNOWN_ENTITY_VAR)?,
            missing_context: read(MISSING_CONTEXT_VAR)?,
        })
    }
}
