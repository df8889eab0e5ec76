//! Repositories: typed access to each table.
//!
//! Deletes that touch dependent rows (authors, posts, groups) run inside a
//! transaction and apply the referential rules explicitly, so the outcome
//! does not depend on the backend's foreign-key enforcement.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use post::PostRepository;
pub use user::{AuthorDeletion, UserRepository};

use sea_orm::{DbErr, SqlErr};
use yatube_common::AppError;

/// Map an insert failure, surfacing unique-key collisions as conflicts.
pub(crate) fn insert_error(err: DbErr, what: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict(format!("{what} already exists"))
        }
        _ => AppError::Database(err.to_string()),
    }
}
