//! Following service.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// What a follow request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    /// A new edge was created.
    Followed,
    /// The edge already existed.
    AlreadyFollowing,
    /// Follower and target are the same user; nothing was stored.
    SelfFollowIgnored,
}

/// Follower and following counts of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow a user. Following yourself or following twice is a no-op.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<FollowOutcome> {
        if follower_id == followee_id {
            tracing::debug!(user_id = follower_id, "Self-follow ignored");
            return Ok(FollowOutcome::SelfFollowIgnored);
        }

        if self.follow_repo.is_following(follower_id, followee_id).await? {
            tracing::debug!(follower_id, followee_id, "Already following");
            return Ok(FollowOutcome::AlreadyFollowing);
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(Utc::now().into()),
        };

        match self.follow_repo.create(model).await {
            Ok(_) => {
                tracing::info!(follower_id, followee_id, "Follow created");
                Ok(FollowOutcome::Followed)
            }
            // A concurrent request inserted the same edge first.
            Err(AppError::Conflict(_)) => Ok(FollowOutcome::AlreadyFollowing),
            Err(e) => Err(e),
        }
    }

    /// Unfollow a user. Returns whether an edge was removed.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let removed = self
            .follow_repo
            .delete_by_pair(follower_id, followee_id)
            .await?;

        if removed {
            tracing::info!(follower_id, followee_id, "Follow removed");
        } else {
            tracing::debug!(follower_id, followee_id, "Unfollow without edge ignored");
        }
        Ok(removed)
    }

    /// Check if `follower_id` follows `followee_id`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, followee_id).await
    }

    /// Follow the user called `username`.
    pub async fn follow_by_username(
        &self,
        follower: &user::Model,
        username: &str,
    ) -> AppResult<FollowOutcome> {
        let target = self.user_repo.get_by_username(username).await?;
        self.follow(&follower.id, &target.id).await
    }

    /// Unfollow the user called `username`.
    pub async fn unfollow_by_username(
        &self,
        follower: &user::Model,
        username: &str,
    ) -> AppResult<bool> {
        let target = self.user_repo.get_by_username(username).await?;
        self.unfollow(&follower.id, &target.id).await
    }

    /// Follower and following counts of a user.
    pub async fn counts(&self, user_id: &str) -> AppResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.follow_repo.count_followers(user_id).await?,
            following: self.follow_repo.count_following(user_id).await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yatube_db::test_utils::{TestDatabase, user_model};

    async fn setup() -> (FollowingService, user::Model, user::Model, TestDatabase) {
        let db = TestDatabase::sqlite().await.unwrap();
        let users = UserRepository::new(db.connection());
        let leo = users.create(user_model("leo")).await.unwrap();
        let ann = users.create(user_model("ann")).await.unwrap();
        let service = FollowingService::new(FollowRepository::new(db.connection()), users);
        (service, leo, ann, db)
    }

    #[tokio::test]
    async fn test_self_follow_touches_nothing() {
        // No results queued: any query would fail.
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = FollowingService::new(
            FollowRepository::new(db.clone()),
            UserRepository::new(db),
        );

        let outcome = service.follow("user1", "user1").await.unwrap();

        assert_eq!(outcome, FollowOutcome::SelfFollowIgnored);
    }

    #[tokio::test]
    async fn test_follow_twice_keeps_one_edge() {
        let (service, leo, ann, _db) = setup().await;

        assert_eq!(
            service.follow(&leo.id, &ann.id).await.unwrap(),
            FollowOutcome::Followed
        );
        assert_eq!(
            service.follow(&leo.id, &ann.id).await.unwrap(),
            FollowOutcome::AlreadyFollowing
        );

        let counts = service.counts(&ann.id).await.unwrap();
        assert_eq!(counts, FollowCounts { followers: 1, following: 0 });
        assert!(service.is_following(&leo.id, &ann.id).await.unwrap());
        assert!(!service.is_following(&ann.id, &leo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_self_follow_by_username_creates_no_edge() {
        let (service, leo, _ann, _db) = setup().await;

        let outcome = service.follow_by_username(&leo, "leo").await.unwrap();

        assert_eq!(outcome, FollowOutcome::SelfFollowIgnored);
        assert!(!service.is_following(&leo.id, &leo.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        let (service, leo, ann, _db) = setup().await;

        assert!(!service.unfollow(&leo.id, &ann.id).await.unwrap());
        assert_eq!(service.counts(&leo.id).await.unwrap(), FollowCounts::default());
    }

    #[tokio::test]
    async fn test_follow_then_unfollow_by_username() {
        let (service, leo, ann, _db) = setup().await;

        service.follow_by_username(&leo, "ann").await.unwrap();
        assert!(service.unfollow_by_username(&leo, "ann").await.unwrap());
        assert!(!service.is_following(&leo.id, &ann.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_follow_unknown_username_is_not_found() {
        let (service, leo, _ann, _db) = setup().await;

        let result = service.follow_by_username(&leo, "ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
