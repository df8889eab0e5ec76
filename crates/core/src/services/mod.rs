//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod feed;
pub mod following;
pub mod group;
pub mod post;
pub mod user;
mod validation;

pub use comment::{CommentInput, CommentService, CommentWithAuthor};
pub use feed::FeedService;
pub use following::{FollowCounts, FollowOutcome, FollowingService};
pub use group::{CreateGroupInput, GroupService};
pub use post::{AuthorPosts, EditOutcome, PostInput, PostService, PostWithRelations};
pub use user::{CreateUserInput, UserService};
