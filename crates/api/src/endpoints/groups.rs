//! Group endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use yatube_common::{AppResult, Page};

use super::views::{GroupResponse, PostResponse};
use crate::{extractors::RequestContext, middleware::AppState, response::ApiResponse};

/// Group page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPostsResponse {
    pub group: GroupResponse,
    pub page: Page<PostResponse>,
}

/// Posts filed under a group, newest first.
async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    ctx: RequestContext,
) -> AppResult<ApiResponse<GroupPostsResponse>> {
    let (group, posts) = state
        .post_service
        .list_by_group(&slug, ctx.page(), state.page_size)
        .await?;
    let page = state.post_service.with_relations(posts).await?;

    Ok(ApiResponse::ok(GroupPostsResponse {
        group: group.into(),
        page: page.map(Into::into),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/group/{slug}/", get(group_posts))
}
