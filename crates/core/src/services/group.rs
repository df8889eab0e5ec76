//! Group service.

use super::validation::{SLUG_RE, check};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::group, repositories::GroupRepository};

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(
        length(min = 1, max = 50),
        regex(
            path = *SLUG_RE,
            message = "Letters, digits, hyphens and underscores only."
        )
    )]
    pub slug: String,

    #[serde(default)]
    pub description: String,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group. A slug that is already taken is a conflict.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        check(&input)?;

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// List all groups.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }

    /// Delete a group. Its posts stay, without a group.
    pub async fn delete(&self, slug: &str) -> AppResult<u64> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let detached = self
            .group_repo
            .delete_detaching_posts(&group.id)
            .await?
            .ok_or_else(|| AppError::GroupNotFound(slug.to_string()))?;

        tracing::info!(group_id = %group.id, detached, "Group deleted");
        Ok(detached)
    }
}
