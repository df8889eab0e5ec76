//! Post endpoints: global listing, detail, create, edit and comments.

use axum::{
    Form, Router,
    extract::{Path, State},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use yatube_common::{AppError, AppResult, FieldErrors, Page};
use yatube_core::{CommentInput, EditOutcome, PostInput};

use super::views::{CommentResponse, GroupResponse, PostFormView, PostResponse};
use crate::{
    extractors::{AuthUser, RequestContext},
    middleware::AppState,
    page_cache::cache_page,
    response::{ApiResponse, found},
};

/// Paginated post listing.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostListResponse {
    pub page: Page<PostResponse>,
}

/// Post detail page.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub author_post_count: u64,
    pub comments: Vec<CommentResponse>,
    pub form: CommentInput,
}

pub fn post_path(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

pub fn profile_path(username: &str) -> String {
    format!("/profile/{username}/")
}

/// Newest posts from everyone.
async fn index(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> AppResult<ApiResponse<PostListResponse>> {
    let posts = state
        .post_service
        .list_all(ctx.page(), state.page_size)
        .await?;
    let page = state.post_service.with_relations(posts).await?;

    Ok(ApiResponse::ok(PostListResponse {
        page: page.map(Into::into),
    }))
}

/// A single post with its comments.
async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<PostDetailResponse>> {
    let post = state.post_service.get(&post_id).await?;
    let author_post_count = state.post_service.count_by_author(&post.author_id).await?;
    let post = state.post_service.with_relations_one(post).await?;
    let comments = state.comment_service.list_for_post(&post_id).await?;

    Ok(ApiResponse::ok(PostDetailResponse {
        post: post.into(),
        author_post_count,
        comments: comments.into_iter().map(Into::into).collect(),
        form: CommentInput::default(),
    }))
}

async fn form_view(
    state: &AppState,
    form: PostInput,
    errors: FieldErrors,
    post_id: Option<String>,
) -> AppResult<PostFormView> {
    let groups = state.group_service.list().await?;
    Ok(PostFormView {
        form,
        errors,
        is_edit: post_id.is_some(),
        post_id,
        groups: groups.into_iter().map(GroupResponse::from).collect(),
    })
}

/// Empty form for a new post.
async fn post_create_form(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<PostFormView>> {
    let view = form_view(&state, PostInput::default(), FieldErrors::new(), None).await?;
    Ok(ApiResponse::ok(view))
}

/// Publish a post, then show the author's profile.
async fn post_create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    match state.post_service.create(&user, input.clone()).await {
        Ok(_) => Ok(found(&profile_path(&user.username))),
        Err(AppError::Validation(errors)) => {
            let view = form_view(&state, input, errors.clone(), None).await?;
            Ok(ApiResponse::invalid(view, &errors).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Pre-filled form for the post's author; everyone else goes back to the post.
async fn post_edit_form(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(found(&post_path(&post_id)));
    }

    let form = PostInput::from_post(&post);
    let view = form_view(&state, form, FieldErrors::new(), Some(post_id)).await?;
    Ok(ApiResponse::ok(view).into_response())
}

/// Save an edit made by the post's author.
async fn post_edit(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Form(input): Form<PostInput>,
) -> AppResult<Response> {
    match state.post_service.edit(&user, &post_id, input.clone()).await {
        Ok(EditOutcome::Updated(_) | EditOutcome::NotAuthor(_)) => Ok(found(&post_path(&post_id))),
        Err(AppError::Validation(errors)) => {
            let view = form_view(&state, input, errors.clone(), Some(post_id)).await?;
            Ok(ApiResponse::invalid(view, &errors).into_response())
        }
        Err(e) => Err(e),
    }
}

/// Plain visits to the comment URL just go back to the post.
async fn comment_redirect(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    Ok(found(&post_path(&post.id)))
}

/// Add a comment. Blank comments are dropped; either way the post is shown again.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Form(input): Form<CommentInput>,
) -> AppResult<Response> {
    match state.comment_service.add(&user, &post_id, input).await {
        Ok(_) => {}
        Err(AppError::Validation(errors)) => {
            tracing::debug!(post_id = %post_id, errors = %errors, "Invalid comment ignored");
        }
        Err(e) => return Err(e),
    }
    Ok(found(&post_path(&post_id)))
}

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(index).layer(middleware::from_fn_with_state(
                state.page_cache.clone(),
                cache_page,
            )),
        )
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
        .route(
            "/posts/{post_id}/comment/",
            get(comment_redirect).post(add_comment),
        )
}
