//! Infrastructure layer: query executors and the RLS-guarded client.

pub mod client;
pub mod executor;

pub use client::{RlsClient, RlsSession};
pub use executor::InMemoryExecutor;
