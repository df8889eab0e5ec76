//! Post service.

use std::collections::HashMap;

use super::validation::{field_errors, non_empty, not_blank};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator, Page};
use yatube_db::{
    entities::{group, post, user},
    repositories::{GroupRepository, PostRepository, UserRepository},
};

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

/// Submitted post form, used for both creating and editing.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PostInput {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub text: String,

    /// Group ID; empty means no group.
    #[serde(default)]
    pub group: Option<String>,

    /// Image reference.
    #[serde(default)]
    #[validate(length(max = 512))]
    pub image: Option<String>,
}

impl PostInput {
    /// Form pre-filled from an existing post.
    #[must_use]
    pub fn from_post(post: &post::Model) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.clone(),
            image: post.image.clone(),
        }
    }
}

/// Result of an edit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The post was changed.
    Updated(post::Model),
    /// The editor does not own the post; nothing changed.
    NotAuthor(post::Model),
}

/// Post with its author and group loaded.
#[derive(Debug, Clone)]
pub struct PostWithRelations {
    pub post: post::Model,
    pub author: user::Model,
    pub group: Option<group::Model>,
}

/// An author's profile listing.
#[derive(Debug, Clone)]
pub struct AuthorPosts {
    pub author: user::Model,
    pub posts: Page<post::Model>,
    pub post_count: u64,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new post.
    pub async fn create(&self, author: &user::Model, input: PostInput) -> AppResult<post::Model> {
        let group_id = self.validate(&input).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            text: Set(input.text),
            author_id: Set(author.id.clone()),
            group_id: Set(group_id),
            image: Set(non_empty(input.image)),
            created_at: Set(Utc::now().into()),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, author_id = %author.id, "Post created");
        Ok(post)
    }

    /// Edit a post. Only its author may change it; the creation time never changes.
    pub async fn edit(
        &self,
        editor: &user::Model,
        post_id: &str,
        input: PostInput,
    ) -> AppResult<EditOutcome> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != editor.id {
            tracing::debug!(post_id, editor_id = %editor.id, "Edit by non-author ignored");
            return Ok(EditOutcome::NotAuthor(post));
        }

        let group_id = self.validate(&input).await?;

        let mut active: post::ActiveModel = post.into();
        active.text = Set(input.text);
        active.group_id = Set(group_id);
        active.image = Set(non_empty(input.image));

        let post = self.post_repo.update(active).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(EditOutcome::Updated(post))
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Delete a post and its comments.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if !self.post_repo.delete(id).await? {
            return Err(AppError::PostNotFound(id.to_string()));
        }
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    /// All posts, newest first.
    pub async fn list_all(&self, page: Option<&str>, page_size: u64) -> AppResult<Page<post::Model>> {
        self.post_repo.page_all(page, page_size).await
    }

    /// Posts filed under the group with `slug`.
    pub async fn list_by_group(
        &self,
        slug: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<(group::Model, Page<post::Model>)> {
        let group = self.group_repo.get_by_slug(slug).await?;
        let posts = self.post_repo.page_by_group(&group.id, page, page_size).await?;
        Ok((group, posts))
    }

    /// Posts written by `username`, with the author's total post count.
    pub async fn list_by_author(
        &self,
        username: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<AuthorPosts> {
        let author = self.user_repo.get_by_username(username).await?;
        let posts = self.post_repo.page_by_author(&author.id, page, page_size).await?;
        Ok(AuthorPosts {
            author,
            post_count: posts.count,
            posts,
        })
    }

    /// Number of posts written by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_author(author_id).await
    }

    /// Load authors and groups for a page of posts.
    pub async fn with_relations(
        &self,
        posts: Page<post::Model>,
    ) -> AppResult<Page<PostWithRelations>> {
        let mut author_ids: Vec<String> = posts.items.iter().map(|p| p.author_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();
        let mut group_ids: Vec<String> =
            posts.items.iter().filter_map(|p| p.group_id.clone()).collect();
        group_ids.sort();
        group_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        posts.try_map(|post| {
            let author = authors
                .get(&post.author_id)
                .cloned()
                .ok_or_else(|| AppError::UserNotFound(post.author_id.clone()))?;
            let group = post.group_id.as_ref().and_then(|id| groups.get(id).cloned());
            Ok(PostWithRelations {
                post,
                author,
                group,
            })
        })
    }

    /// Load the author and group of a single post.
    pub async fn with_relations_one(&self, post: post::Model) -> AppResult<PostWithRelations> {
        let author = self.user_repo.get_by_id(&post.author_id).await?;
        let group = match &post.group_id {
            Some(id) => self.group_repo.find_by_id(id).await?,
            None => None,
        };
        Ok(PostWithRelations {
            post,
            author,
            group,
        })
    }

    /// Check the form and resolve its group reference.
    async fn validate(&self, input: &PostInput) -> AppResult<Option<String>> {
        let mut errors = field_errors(input);

        let group_id = non_empty(input.group.clone());
        if let Some(id) = &group_id
            && self.group_repo.find_by_id(id).await?.is_none()
        {
            errors.add("group", "Select a valid choice.");
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(group_id)
    }
}
