use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::json;

use mentara_auth::AccessContext;
use mentara_rls::{Operation, QueryDescriptor};

use crate::app::{Db, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_meetings))
        .route("/:id", delete(delete_meeting))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListMeetingsParams {
    pub status: Option<String>,
}

/// Meetings visible to the caller, optionally filtered by status.
pub async fn list_meetings(
    Extension(db): Extension<Db>,
    Extension(ctx): Extension<AccessContext>,
    Query(params): Query<ListMeetingsParams>,
) -> axum::response::Response {
    let mut session = db.session();
    session.set_context(ctx);

    let mut query = QueryDescriptor::new("Meeting", Operation::FindMany);
    if let Some(status) = params.status {
        query = query.with_where(json!({ "status": status }));
    }

    match session.execute(query).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => errors::rls_error_to_response(e),
    }
}

pub async fn delete_meeting(
    Extension(db): Extension<Db>,
    Extension(ctx): Extension<AccessContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let mut session = db.session();
    session.set_context(ctx);

    let query = QueryDescriptor::new("Meeting", Operation::Delete).with_where(json!({ "id": id }));

    match session.execute(query).await {
        Ok(row) => (StatusCode::OK, Json(row)).into_response(),
        Err(e) => errors::rls_error_to_response(e),
    }
}
