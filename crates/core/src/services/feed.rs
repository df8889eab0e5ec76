//! Feed service: posts from the authors a viewer follows.

use yatube_common::{AppResult, Page};
use yatube_db::{entities::post, repositories::PostRepository};

/// Feed service.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(post_repo: PostRepository) -> Self {
        Self { post_repo }
    }

    /// Posts by every author `viewer_id` follows, newest first.
    ///
    /// A viewer who follows nobody gets one empty page.
    pub async fn feed_for(
        &self,
        viewer_id: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let posts = self
            .post_repo
            .page_followed_by(viewer_id, page, page_size)
            .await?;
        tracing::debug!(viewer_id, count = posts.count, "Feed loaded");
        Ok(posts)
    }
}
