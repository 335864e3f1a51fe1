//! Path-keyed response cache with a per-route strategy table.
//!
//! A request either hits (the stored response is replayed with
//! `X-From-Cache: 1` and no handler runs) or misses (the handler runs and
//! a successful response is stored). Keys are the request path alone, so
//! requests with a query string neither read nor write the cache.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes, HttpBody};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lru::LruCache;
use parking_lot::Mutex;

use crate::config::CacheConfig;
use crate::metrics::record_cache_result;

/// Header set on every response served from memory.
pub const FROM_CACHE_HEADER: HeaderName = HeaderName::from_static("x-from-cache");

/// Largest response body the cache will store. Bigger bodies pass through.
pub const MAX_CACHED_BODY: u64 = 16 * 1024 * 1024;

/// How a route takes part in caching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStrategy {
    /// Cached on first request, expired by TTL.
    LazyOnDemand,
    /// Materialized once at startup by its handler; never stored here.
    EagerStatic,
    /// Never cached.
    Bypass,
}

/// Strategy per route path; anything unlisted is [`CacheStrategy::LazyOnDemand`].
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<(&'static str, CacheStrategy)>,
}

impl RouteTable {
    pub fn new(routes: Vec<(&'static str, CacheStrategy)>) -> Self {
        RouteTable { routes }
    }

    /// The routes of the registry API.
    pub fn standard() -> Self {
        RouteTable::new(vec![
            ("/healthz", CacheStrategy::Bypass),
            ("/aws-lambda-layers", CacheStrategy::EagerStatic),
        ])
    }

    pub fn strategy_for(&self, path: &str) -> CacheStrategy {
        self.routes
            .iter()
            .find(|(route, _)| *route == path)
            .map(|(_, strategy)| *strategy)
            .unwrap_or(CacheStrategy::LazyOnDemand)
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    /// Replay as a response marked as served from cache.
    pub fn to_hit_response(&self) -> Response {
        let mut response = (self.status, self.body.clone()).into_response();
        *response.headers_mut() = self.headers.clone();
        response
            .headers_mut()
            .insert(FROM_CACHE_HEADER, HeaderValue::from_static("1"));
        response
    }
}

#[derive(Debug)]
struct CacheEntry {
    response: Arc<CachedResponse>,
    stored_at: Instant,
}

/// Bounded, expiring store of responses keyed by request path.
///
/// One mutex guards the LRU. Entries are `Arc`-shared and replaced whole,
/// so a reader sees either the old entry or the new one.
#[derive(Debug)]
pub struct ResponseCache {
    enabled: bool,
    ttl: Duration,
    routes: RouteTable,
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl ResponseCache {
    /// Create a cache from its settings, using the standard route table.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_routes(config, RouteTable::standard())
    }

    pub fn with_routes(config: &CacheConfig, routes: RouteTable) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        ResponseCache {
            enabled: config.enabled && config.max_entries > 0,
            ttl: config.ttl(),
            routes,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(&CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn strategy_for(&self, path: &str) -> CacheStrategy {
        self.routes.strategy_for(path)
    }

    /// Look up a stored response. Expired entries are dropped and count as a miss.
    pub fn lookup(&self, key: &str) -> Option<Arc<CachedResponse>> {
        let mut entries = self.entries.lock();
        let current = entries
            .get(key)
            .map(|entry| (entry.stored_at.elapsed() < self.ttl, entry.response.clone()));
        match current {
            Some((true, response)) => Some(response),
            Some((false, _)) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    /// Store a response, evicting the least recently used entry when full.
    pub fn store(&self, key: String, response: CachedResponse) {
        self.entries.lock().put(
            key,
            CacheEntry {
                response: Arc::new(response),
                stored_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included until next touched.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Middleware applying the cache to lazily cached routes.
pub async fn cache_layer(
    State(cache): State<Arc<ResponseCache>>,
    request: Request,
    next: Next,
) -> Response {
    if !cache.is_enabled()
        || *request.method() != Method::GET
        || request.uri().query().is_some()
        || cache.strategy_for(request.uri().path()) != CacheStrategy::LazyOnDemand
    {
        record_cache_result("bypass");
        return next.run(request).await;
    }

    let key = request.uri().path().to_string();
    if let Some(hit) = cache.lookup(&key) {
        record_cache_result("hit");
        return hit.to_hit_response();
    }
    record_cache_result("miss");

    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }
    let fits = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|upper| upper <= MAX_CACHED_BODY);
    if !fits {
        tracing::debug!(path = %key, "response too large to cache");
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(path = %key, error = %e, "response body could not be buffered");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    cache.store(
        key,
        CachedResponse {
            status: parts.status,
            headers: parts.headers.clone(),
            body: body.clone(),
        },
    );
    Response::from_parts(parts, Body::from(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(max_entries: usize, ttl_secs: u64) -> CacheConfig {
        CacheConfig {
            enabled: true,
            max_entries,
            ttl_secs,
        }
    }

    fn response(body: &'static str) -> CachedResponse {
        CachedResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body.as_bytes()),
        }
    }

    #[test]
    fn store_and_retrieve() {
        let cache = ResponseCache::new(&config(10, 60));
        assert!(cache.lookup("/sdks").is_none());
        cache.store("/sdks".into(), response("{}"));
        assert_eq!(cache.lookup("/sdks").unwrap().body, "{}");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn least_recently_used_is_evicted() {
        let cache = ResponseCache::new(&config(2, 60));
        cache.store("/a".into(), response("a"));
        cache.store("/b".into(), response("b"));
        assert!(cache.lookup("/a").is_some());
        cache.store("/c".into(), response("c"));

        assert!(cache.lookup("/b").is_none());
        assert!(cache.lookup("/a").is_some());
        assert!(cache.lookup("/c").is_some());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = ResponseCache::new(&config(10, 0));
        cache.store("/sdks".into(), response("{}"));
        assert!(cache.lookup("/sdks").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_readers_see_whole_entries() {
        const WRITERS: u8 = 4;
        const BODY_LEN: usize = 64 * 1024;

        let cache = ResponseCache::new(&config(10, 60));
        std::thread::scope(|scope| {
            for writer in 0..WRITERS {
                let cache = &cache;
                scope.spawn(move || {
                    for _ in 0..200 {
                        cache.store(
                            "/sdks".into(),
                            CachedResponse {
                                status: StatusCode::OK,
                                headers: HeaderMap::new(),
                                body: Bytes::from(vec![b'a' + writer; BODY_LEN]),
                            },
                        );
                        if let Some(seen) = cache.lookup("/sdks") {
                            assert_eq!(seen.body.len(), BODY_LEN);
                            let first = seen.body[0];
                            assert!((b'a'..b'a' + WRITERS).contains(&first));
                            assert!(seen.body.iter().all(|byte| *byte == first));
                        }
                    }
                });
            }
        });
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn route_strategies() {
        let routes = RouteTable::standard();
        assert_eq!(routes.strategy_for("/healthz"), CacheStrategy::Bypass);
        assert_eq!(
            routes.strategy_for("/aws-lambda-layers"),
            CacheStrategy::EagerStatic
        );
        assert_eq!(routes.strategy_for("/sdks"), CacheStrategy::LazyOnDemand);
    }

    #[test]
    fn hit_response_is_marked() {
        let hit = response("ok").to_hit_response();
        assert_eq!(hit.status(), StatusCode::OK);
        assert_eq!(hit.headers()[FROM_CACHE_HEADER], "1");
    }

    #[test]
    fn zero_capacity_disables() {
        assert!(!ResponseCache::new(&config(0, 60)).is_enabled());
        assert!(!ResponseCache::disabled().is_enabled());
    }
}
