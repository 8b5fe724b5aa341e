use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use mentara_auth::AccessContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<AccessContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": ctx.user_id().as_str(),
        "role": ctx.role().as_str(),
    }))
}
