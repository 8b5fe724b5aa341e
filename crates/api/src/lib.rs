//! HTTP API: server wiring, auth middleware, and request/response mapping.

pub mod app;
pub mod config;
pub mod middleware;
