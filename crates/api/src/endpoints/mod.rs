//! HTTP endpoints.

mod following;
mod groups;
mod posts;
pub mod views;

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;

use crate::middleware::AppState;

/// Create the router for every page.
///
/// `state` provides the page cache wrapped around the index listing.
pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(posts::router(state))
        .merge(groups::router())
        .merge(following::router())
        .fallback(not_found)
}

/// Unknown paths.
async fn not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "No route matched");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "Page not found",
                "path": uri.path(),
            }
        })),
    )
}
