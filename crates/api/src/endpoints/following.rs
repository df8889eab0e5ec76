//! Profile, follow and feed endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use serde::Serialize;
use yatube_common::{AppResult, Page};
use yatube_core::FollowOutcome;

use super::posts::profile_path;
use super::views::{AuthorResponse, PostResponse};
use crate::{
    extractors::{AuthUser, RequestContext},
    middleware::AppState,
    response::{ApiResponse, found},
};

/// Author profile page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub author: AuthorResponse,
    pub page: Page<PostResponse>,
    pub post_count: u64,
    /// Whether the viewer follows this author; always false for anonymous visitors.
    pub following: bool,
    pub followers_count: u64,
    pub following_count: u64,
}

/// Feed page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub page: Page<PostResponse>,
}

/// An author's posts.
async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
    ctx: RequestContext,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let listing = state
        .post_service
        .list_by_author(&username, ctx.page(), state.page_size)
        .await?;

    let following = match &ctx.viewer {
        Some(viewer) => {
            state
                .following_service
                .is_following(&viewer.id, &listing.author.id)
                .await?
        }
        None => false,
    };
    let counts = state.following_service.counts(&listing.author.id).await?;
    let page = state.post_service.with_relations(listing.posts).await?;

    Ok(ApiResponse::ok(ProfileResponse {
        author: listing.author.into(),
        page: page.map(Into::into),
        post_count: listing.post_count,
        following,
        followers_count: counts.followers,
        following_count: counts.following,
    }))
}

/// Posts from every author the viewer follows.
async fn follow_index(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<ApiResponse<FeedResponse>> {
    let posts = state
        .feed_service
        .feed_for(&user.id, ctx.page(), state.page_size)
        .await?;
    let page = state.post_service.with_relations(posts).await?;

    Ok(ApiResponse::ok(FeedResponse {
        page: page.map(Into::into),
    }))
}

/// Follow an author and return to their profile.
async fn profile_follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let outcome = state
        .following_service
        .follow_by_username(&user, &username)
        .await?;
    if outcome != FollowOutcome::Followed {
        tracing::debug!(?outcome, follower = %user.username, %username, "Follow had no effect");
    }
    Ok(found(&profile_path(&username)))
}

/// Unfollow an author and return to the feed.
async fn profile_unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state
        .following_service
        .unfollow_by_username(&user, &username)
        .await?;
    Ok(found("/follow/"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{username}/", get(profile))
        .route(
            "/profile/{username}/follow/",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow/",
            get(profile_unfollow).post(profile_unfollow),
        )
        .route("/follow/", get(follow_index))
}
