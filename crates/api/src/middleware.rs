//! Application state and middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use sea_orm::DatabaseConnection;
use yatube_common::Config;
use yatube_core::{
    CommentService, FeedService, FollowingService, GroupService, PostService, UserService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use crate::page_cache::PageCache;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub group_service: GroupService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub following_service: FollowingService,
    pub feed_service: FeedService,
    pub page_cache: PageCache,
    /// Where anonymous visitors are sent for protected pages.
    pub login_url: Arc<str>,
    /// Items per listing page.
    pub page_size: u64,
}

impl AppState {
    /// Wire repositories and services over a shared connection.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(db);

        Self {
            user_service: UserService::new(user_repo.clone()),
            group_service: GroupService::new(group_repo.clone()),
            post_service: PostService::new(post_repo.clone(), user_repo.clone(), group_repo),
            comment_service: CommentService::new(
                comment_repo,
                post_repo.clone(),
                user_repo.clone(),
            ),
            following_service: FollowingService::new(follow_repo, user_repo),
            feed_service: FeedService::new(post_repo),
            page_cache: PageCache::from_config(&config.cache),
            login_url: Arc::from(config.server.login_url.as_str()),
            page_size: config.pagination.page_size,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` to a user and stores it in the
/// request extensions. Requests without a valid token pass through anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => tracing::debug!("Unknown access token"),
            Err(e) => tracing::warn!(error = %e, "Token lookup failed"),
        }
    }

    next.run(req).await
}
