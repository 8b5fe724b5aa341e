//! HTTP API application wiring (Axum router + shared state).
//!
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `errors.rs`: consistent error responses

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use mentara_infra::{InMemoryExecutor, RlsClient};
use mentara_rls::RlsInterceptor;

use crate::config::ApiConfig;
use crate::middleware;

pub mod errors;
pub mod routes;

/// The guarded data client shared by all handlers.
pub type Db = RlsClient<Arc<InMemoryExecutor>>;

pub fn new_store() -> Arc<InMemoryExecutor> {
    Arc::new(InMemoryExecutor::new())
}

/// Store pre-loaded from a JSON fixture file (see
/// [`InMemoryExecutor::seed_fixtures`]); empty when no file is given.
pub fn load_store(seed_file: Option<&Path>) -> anyhow::Result<Arc<InMemoryExecutor>> {
    let store = new_store();
    let Some(path) = seed_file else {
        tracing::info!("no seed file configured; starting with an empty store");
        return Ok(store);
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    let fixtures: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("parsing seed file {}", path.display()))?;
    let rows = store
        .seed_fixtures(fixtures)
        .with_context(|| format!("loading seed file {}", path.display()))?;
    tracing::info!(rows, path = %path.display(), "seeded store");

    Ok(store)
}

/// Build the full HTTP router over `store`.
pub fn build_app(config: &ApiConfig, store: Arc<InMemoryExecutor>) -> Router {
    let jwt = Arc::new(mentara_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let db: Db = RlsClient::new(RlsInterceptor::with_config(config.rls), store);

    // Protected routes: require a verified caller.
    let protected = routes::router()
        .layer(Extension(db))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}
