use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use mentara_rls::{ExecutorError, RlsError};

pub fn rls_error_to_response(err: RlsError) -> axum::response::Response {
    match err {
        RlsError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, "forbidden", msg),
        RlsError::Executor(ExecutorError::RecordNotFound(msg)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", msg)
        }
        RlsError::Executor(ExecutorError::Unsupported(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "unsupported_query", msg)
        }
        RlsError::Executor(ExecutorError::Store(msg)) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal store error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
