//! Full-page response cache.
//!
//! Caches complete successful `GET` responses keyed by path and query string,
//! with time-to-live eviction. Writes never invalidate entries: a cached
//! listing may lag behind the database by up to the configured TTL.

use std::time::Duration;

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use moka::future::Cache;
use tracing::debug;
use yatube_common::config::CacheConfig;

/// A stored response.
#[derive(Clone, Debug)]
struct CachedPage {
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: Bytes,
}

impl IntoResponse for CachedPage {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(content_type) => {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, content_type);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

/// Route + query keyed response cache.
#[derive(Clone)]
pub struct PageCache {
    cache: Cache<String, CachedPage>,
}

impl PageCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Create a cache from configuration.
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            Duration::from_secs(config.index_ttl_secs),
            config.max_capacity,
        )
    }

    /// Drop every cached page.
    pub fn clear(&self) {
        self.cache.invalidate_all();
    }

    /// Number of cached pages.
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }

    /// Whether nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn get(&self, key: &str) -> Option<CachedPage> {
        self.cache.get(key).await
    }

    async fn insert(&self, key: String, page: CachedPage) {
        self.cache.insert(key, page).await;
    }
}

fn cache_key(request: &Request) -> String {
    let uri = request.uri();
    match uri.query() {
        Some(query) => format!("{}?{query}", uri.path()),
        None => uri.path().to_string(),
    }
}

/// Serve `GET` requests from the cache, storing successful responses.
pub async fn cache_page(State(cache): State<PageCache>, request: Request, next: Next) -> Response {
    if request.method() != Method::GET {
        return next.run(request).await;
    }

    let key = cache_key(&request);
    if let Some(page) = cache.get(&key).await {
        debug!(key = %key, "Page cache hit");
        return page.into_response();
    }

    let response = next.run(request).await;
    if response.status() != StatusCode::OK {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response for page cache");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    cache
        .insert(
            key.clone(),
            CachedPage {
                status: parts.status,
                content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
                body: body.clone(),
            },
        )
        .await;
    debug!(key = %key, "Page cached");

    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::get};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn counting_app(cache: PageCache, hits: Arc<AtomicUsize>) -> Router {
        let handler = move || {
            let hits = Arc::clone(&hits);
            async move {
                let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                format!("render {n}")
            }
        };
        Router::new()
            .route("/", get(handler))
            .layer(middleware::from_fn_with_state(cache, cache_page))
    }

    async fn body_of(app: Router, uri: &str) -> String {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let cache = PageCache::new(Duration::from_secs(60), 10);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), Arc::clone(&hits));

        assert_eq!(body_of(app.clone(), "/").await, "render 1");
        assert_eq!(body_of(app.clone(), "/").await, "render 1");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_string_is_part_of_key() {
        let cache = PageCache::new(Duration::from_secs(60), 10);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), Arc::clone(&hits));

        body_of(app.clone(), "/").await;
        assert_eq!(body_of(app.clone(), "/?page=2").await, "render 2");
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn test_clear_forces_rerender() {
        let cache = PageCache::new(Duration::from_secs(60), 10);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), Arc::clone(&hits));

        body_of(app.clone(), "/").await;
        cache.clear();
        assert_eq!(body_of(app.clone(), "/").await, "render 2");
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = PageCache::new(Duration::from_millis(50), 10);
        let hits = Arc::new(AtomicUsize::new(0));
        let app = counting_app(cache.clone(), Arc::clone(&hits));

        body_of(app.clone(), "/").await;
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(body_of(app.clone(), "/").await, "render 2");
    }
}
