//! `mentara-rls`: row-level security for data-access queries.
//!
//! Pure policy plus one async seam: the interceptor rewrites a
//! [`QueryDescriptor`] for a [`Caller`](mentara_auth::Caller) using the
//! [`RuleTable`], consulting a [`QueryExecutor`] only to verify write targets.

pub mod config;
pub mod context;
pub mod decision;
pub mod entity;
pub mod error;
pub mod executor;
pub mod filter;
pub mod interceptor;
pub mod query;
pub mod rules;

pub use config::{ConfigError, Fallback, RlsConfig};
pub use context::ContextProvider;
pub use decision::{Decision, Denial, Interception, Outcome};
pub use entity::Entity;
pub use error::{ExecutorError, RlsError};
pub use executor::QueryExecutor;
pub use interceptor::RlsInterceptor;
pub use query::{Filter, Operation, OperationClass, QueryArgs, QueryDescriptor};
pub use rules::{CreateRule, EntityRules, Rule, RuleTable, Scope, WriteRule};
