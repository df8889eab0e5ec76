//! View payloads shared by the endpoints.

use serde::Serialize;
use yatube_common::FieldErrors;
use yatube_core::{CommentWithAuthor, PostInput, PostWithRelations};
use yatube_db::entities::{group, user};

/// Author as shown next to posts and on profiles.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub created_at: String,
}

impl From<user::Model> for AuthorResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            name: u.name,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Group summary.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<group::Model> for GroupResponse {
    fn from(g: group::Model) -> Self {
        Self {
            id: g.id,
            title: g.title,
            slug: g.slug,
            description: g.description,
        }
    }
}

/// Post with author and group.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub text: String,
    pub image: Option<String>,
    pub created_at: String,
    pub author: AuthorResponse,
    pub group: Option<GroupResponse>,
}

impl From<PostWithRelations> for PostResponse {
    fn from(p: PostWithRelations) -> Self {
        Self {
            id: p.post.id,
            text: p.post.text,
            image: p.post.image,
            created_at: p.post.created_at.to_rfc3339(),
            author: p.author.into(),
            group: p.group.map(Into::into),
        }
    }
}

/// Comment with its author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub author: AuthorResponse,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(c: CommentWithAuthor) -> Self {
        Self {
            id: c.comment.id,
            text: c.comment.text,
            created_at: c.comment.created_at.to_rfc3339(),
            author: c.author.into(),
        }
    }
}

/// Post create/edit form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFormView {
    pub form: PostInput,
    pub errors: FieldErrors,
    pub is_edit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    /// Choices for the group field.
    pub groups: Vec<GroupResponse>,
}
