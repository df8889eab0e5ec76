//! Request extractors.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::Response,
};
use yatube_db::entities::user;

use crate::{middleware::AppState, response::login_redirect};

/// Authenticated user extractor.
///
/// Anonymous requests are redirected to the login page with the requested
/// path in `next`.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware
        if let Some(user) = parts.extensions.get::<user::Model>() {
            return Ok(Self(user.clone()));
        }

        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path(), |pq| pq.as_str());
        Err(login_redirect(&state.login_url, next))
    }
}

/// Who is asking, for which path, and which page of a listing.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub viewer: Option<user::Model>,
    pub path: String,
    /// Raw `?page=` value; clamped later by pagination.
    pub page: Option<String>,
}

impl RequestContext {
    /// The page parameter as passed to pagination.
    #[must_use]
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // A repeated `page` keeps its last value
        let page = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(pairs)| {
                pairs
                    .into_iter()
                    .rev()
                    .find_map(|(key, value)| (key == "page").then_some(value))
            });

        Ok(Self {
            viewer: parts.extensions.get::<user::Model>().cloned(),
            path: parts.uri.path().to_string(),
            page,
        })
    }
}
