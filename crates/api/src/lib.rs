//! HTTP layer for yatube-rs.
//!
//! - **Endpoints**: listings, post pages, forms, follows
//! - **Extractors**: authenticated user and per-request context
//! - **Middleware**: bearer-token authentication
//! - **Page cache**: TTL cache for the global listing
//!
//! Handlers return JSON view payloads wrapped in `{"data": ...}`; successful
//! form submissions answer with `302 Found`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod page_cache;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
pub use page_cache::PageCache;

use axum::Router;

/// Router with authentication applied and state attached.
pub fn app(state: AppState) -> Router {
    router(&state)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}
