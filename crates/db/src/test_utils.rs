//! Test utilities for database operations.
//!
//! [`TestDatabase`] opens a private in-memory SQLite database with the full
//! schema applied, so repository and service tests exercise real SQL
//! without an external server.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;

use crate::entities::{follow, group, post, user};
use crate::migrations::Migrator;

/// A migrated in-memory database.
pub struct TestDatabase {
    conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Open a fresh in-memory SQLite database and run all migrations.
    ///
    /// The pool is pinned to a single connection: every SQLite `:memory:`
    /// connection is its own database.
    pub async fn sqlite() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}

/// A fixed instant, `minutes` after a base time, for deterministic ordering.
#[must_use]
pub fn at_minute(minutes: i64) -> DateTime<FixedOffset> {
    let base = Utc
        .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .unwrap_or_default();
    (base + Duration::minutes(minutes)).fixed_offset()
}

/// Active model for a user named `username`.
#[must_use]
pub fn user_model(username: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(format!("u-{username}")),
        username: Set(username.to_string()),
        name: Set(None),
        token: Set(Some(format!("token-{username}"))),
        created_at: Set(at_minute(0)),
    }
}

/// Active model for a group with the given slug.
#[must_use]
pub fn group_model(slug: &str) -> group::ActiveModel {
    group::ActiveModel {
        id: Set(format!("g-{slug}")),
        title: Set(format!("Group {slug}")),
        slug: Set(slug.to_string()),
        description: Set(format!("All about {slug}")),
        created_at: Set(at_minute(0)),
    }
}

/// Active model for a post created `minute` minutes after the base time.
#[must_use]
pub fn post_model(
    id: &str,
    author_id: &str,
    group_id: Option<&str>,
    minute: i64,
) -> post::ActiveModel {
    post::ActiveModel {
        id: Set(id.to_string()),
        text: Set(format!("text of {id}")),
        author_id: Set(author_id.to_string()),
        group_id: Set(group_id.map(str::to_string)),
        image: Set(None),
        created_at: Set(at_minute(minute)),
    }
}

/// Active model for a follow edge.
#[must_use]
pub fn follow_model(follower_id: &str, followee_id: &str) -> follow::ActiveModel {
    follow::ActiveModel {
        id: Set(format!("f-{follower_id}-{followee_id}")),
        follower_id: Set(follower_id.to_string()),
        followee_id: Set(followee_id.to_string()),
        created_at: Set(at_minute(0)),
    }
}
