//! Post repository.

use std::sync::Arc;

use crate::entities::{Comment, Follow, Post, comment, follow, post};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, sea_query::Query,
};
use yatube_common::{AppError, AppResult, Page, PageWindow};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

/// Newest first; the ID breaks ties between posts created in the same instant.
fn newest_first(query: Select<Post>) -> Select<Post> {
    query
        .order_by_desc(post::Column::CreatedAt)
        .order_by_desc(post::Column::Id)
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post and its comments. Returns whether the post existed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Comment::delete_many()
            .filter(comment::Column::PostId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = Post::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted > 0)
    }

    /// Count posts written by a user.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<post::Model>> {
        newest_first(Post::find())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of all posts.
    pub async fn page_all(&self, page: Option<&str>, page_size: u64) -> AppResult<Page<post::Model>> {
        self.find_page(Condition::all(), page, page_size).await
    }

    /// One page of the posts filed under a group.
    pub async fn page_by_group(
        &self,
        group_id: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let condition = Condition::all().add(post::Column::GroupId.eq(group_id));
        self.find_page(condition, page, page_size).await
    }

    /// One page of the posts written by a user.
    pub async fn page_by_author(
        &self,
        author_id: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let condition = Condition::all().add(post::Column::AuthorId.eq(author_id));
        self.find_page(condition, page, page_size).await
    }

    /// One page of the posts written by anyone `viewer_id` follows.
    ///
    /// The viewer's own posts are not included unless they come from a
    /// followed author, which the schema rules out.
    pub async fn page_followed_by(
        &self,
        viewer_id: &str,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let followees = Query::select()
            .column(follow::Column::FolloweeId)
            .from(Follow)
            .and_where(follow::Column::FollowerId.eq(viewer_id))
            .to_owned();

        let condition = Condition::all().add(post::Column::AuthorId.in_subquery(followees));
        self.find_page(condition, page, page_size).await
    }

    /// Count matching posts, clamp the requested page, then fetch its rows.
    async fn find_page(
        &self,
        condition: Condition,
        page: Option<&str>,
        page_size: u64,
    ) -> AppResult<Page<post::Model>> {
        let count = Post::find()
            .filter(condition.clone())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let window = PageWindow::resolve(count, page, page_size);
        if count == 0 {
            return Ok(window.with_items(Vec::new()));
        }

        let items = newest_first(Post::find().filter(condition))
            .offset(window.offset())
            .limit(window.limit())
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(window.with_items(items))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: format!("post {id}"),
            author_id: author_id.to_string(),
            group_id: None,
            image: None,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_found() {
        let post = create_test_post("p1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("p1").await.unwrap();

        assert_eq!(result, post);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "missing"));
    }
}
