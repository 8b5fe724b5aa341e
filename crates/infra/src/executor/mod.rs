//! Query executors (data-store adapters behind the RLS seam).

pub mod in_memory;
pub mod matcher;

pub use in_memory::InMemoryExecutor;
pub use matcher::{Row, matches_filter};
