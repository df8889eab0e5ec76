//! User service.

use super::validation::{USERNAME_RE, check};
use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{
    entities::user,
    repositories::{AuthorDeletion, UserRepository},
};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
    #[validate(
        length(min = 1, max = 150),
        regex(
            path = *USERNAME_RE,
            message = "Letters, digits and @/./+/-/_ only."
        )
    )]
    pub username: String,

    #[validate(length(max = 150))]
    pub name: Option<String>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new author with a freshly issued access token.
    pub async fn create(&self, input: CreateUserInput) -> AppResult<user::Model> {
        check(&input)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            name: Set(input.name.filter(|n| !n.trim().is_empty())),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Resolve the user owning an access token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        self.user_repo.find_by_token(token).await
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Delete a user with their posts, comments and follow edges.
    pub async fn delete(&self, username: &str) -> AppResult<AuthorDeletion> {
        let user = self.user_repo.get_by_username(username).await?;
        let deletion = self
            .user_repo
            .delete_cascade(&user.id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        tracing::info!(
            user_id = %user.id,
            posts = deletion.posts,
            comments = deletion.comments,
            follows = deletion.follows,
            "User deleted"
        );
        Ok(deletion)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use yatube_db::test_utils::TestDatabase;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: None,
            token: Some("secret".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_token() {
        let user = create_test_user("user1", "leo");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user.clone()]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service.authenticate_by_token("secret").await.unwrap();

        assert_eq!(result, Some(user));
    }

    #[tokio::test]
    async fn test_blank_token_skips_lookup() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = UserService::new(UserRepository::new(db));

        assert_eq!(service.authenticate_by_token("  ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalid_username_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = UserService::new(UserRepository::new(db));

        let result = service
            .create(CreateUserInput {
                username: "leo tolstoy".to_string(),
                name: None,
            })
            .await;

        match result {
            Err(AppError::Validation(fields)) => assert!(fields.get("username").is_some()),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_issues_unique_tokens() {
        let db = TestDatabase::sqlite().await.unwrap();
        let service = UserService::new(UserRepository::new(db.connection()));

        let leo = service
            .create(CreateUserInput {
                username: "leo".to_string(),
                name: Some("Leo".to_string()),
            })
            .await
            .unwrap();
        let ann = service
            .create(CreateUserInput {
                username: "ann".to_string(),
                name: None,
            })
            .await
            .unwrap();

        assert!(leo.token.is_some());
        assert_ne!(leo.token, ann.token);

        let token = leo.token.clone().unwrap();
        let found = service.authenticate_by_token(&token).await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(leo.id));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let db = TestDatabase::sqlite().await.unwrap();
        let service = UserService::new(UserRepository::new(db.connection()));
        let input = || CreateUserInput {
            username: "leo".to_string(),
            name: None,
        };

        service.create(input()).await.unwrap();
        let result = service.create(input()).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let db = TestDatabase::sqlite().await.unwrap();
        let service = UserService::new(UserRepository::new(db.connection()));

        let result = service.delete("ghost").await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
