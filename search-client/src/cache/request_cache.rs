//! In-memory response cache keyed by request identity.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::errors::SearchClientError;
use crate::interfaces::{ApiRequest, ApiResponse, ApiTransport, ResponseCache};

/// Default number of responses kept before the oldest is evicted.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

#[derive(Debug, Clone)]
struct CacheEntry {
    response: ApiResponse,
    stored_at: Instant,
}

/// Bounded in-memory cache of successful responses.
///
/// An entry is served while it is younger than the lifetime requested by the
/// current call. Stale entries are evicted on access and the oldest entry is
/// evicted when the cache is full. Failed requests are never stored.
///
/// The lock is not held while the network request is in flight, so two
/// concurrent misses for the same key may both hit the network.
pub struct RequestCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl RequestCache {
    /// Create a cache holding at most `max_entries` responses.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of stored responses, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    async fn lookup(&self, key: &str, ttl: Duration) -> Option<ApiResponse> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < ttl => Some(entry.response.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn store(&self, key: String, response: ApiResponse) {
        let mut entries = self.entries.lock().await;

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                response,
                stored_at: Instant::now(),
            },
        );
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl ResponseCache for RequestCache {
    async fn perform(
        &self,
        transport: &dyn ApiTransport,
        request: ApiRequest,
        ttl: Duration,
    ) -> Result<ApiResponse, SearchClientError> {
        if ttl.is_zero() {
            return transport.perform_request(request).await;
        }

        let key = request.cache_key();
        if let Some(response) = self.lookup(&key, ttl).await {
            debug!(key = %key, "Serving response from cache");
            return Ok(response);
        }

        let response = transport.perform_request(request).await?;
        self.store(key, response.clone()).await;
        Ok(response)
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl ResponseCache for NoCache {
    async fn perform(
        &self,
        transport: &dyn ApiTransport,
        request: ApiRequest,
        _ttl: Duration,
    ) -> Result<ApiResponse, SearchClientError> {
        transport.perform_request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Transport that answers every request with a call counter in the body.
    struct CountingTransport {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingTransport {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ApiTransport for CountingTransport {
        async fn perform_request(
            &self,
            _request: ApiRequest,
        ) -> Result<ApiResponse, SearchClientError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(SearchClientError::http(503, "unavailable"));
            }
            Ok(ApiResponse::new(200, format!(r#"{{"call": {}}}"#, call)))
        }
    }

    fn search(q: &str) -> ApiRequest {
        let mut query = search_client_shared::QueryParams::new();
        query.insert("q".to_string(), q.to_string());
        ApiRequest::get("/collections/books/documents/search").with_query(query)
    }

    #[tokio::test(start_paused = true)]
    async fn test_serves_fresh_entries_from_cache() {
        let transport = CountingTransport::new();
        let cache = RequestCache::default();
        let ttl = Duration::from_secs(60);

        let first = cache.perform(&transport, search("a"), ttl).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        let second = cache.perform(&transport, search("a"), ttl).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetches_after_expiry() {
        let transport = CountingTransport::new();
        let cache = RequestCache::default();
        let ttl = Duration::from_secs(60);

        let first = cache.perform(&transport, search("a"), ttl).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        let second = cache.perform(&transport, search("a"), ttl).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(transport.calls(), 2);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_bypasses_cache() {
        let transport = CountingTransport::new();
        let cache = RequestCache::default();

        cache
            .perform(&transport, search("a"), Duration::ZERO)
            .await
            .unwrap();
        cache
            .perform(&transport, search("a"), Duration::ZERO)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_distinct_requests_are_distinct_entries() {
        let transport = CountingTransport::new();
        let cache = RequestCache::default();
        let ttl = Duration::from_secs(60);

        cache.perform(&transport, search("a"), ttl).await.unwrap();
        cache.perform(&transport, search("b"), ttl).await.unwrap();
        cache.perform(&transport, search("a"), ttl).await.unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicts_oldest_when_full() {
        let transport = CountingTransport::new();
        let cache = RequestCache::new(2);
        let ttl = Duration::from_secs(60);

        cache.perform(&transport, search("a"), ttl).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.perform(&transport, search("b"), ttl).await.unwrap();
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.perform(&transport, search("c"), ttl).await.unwrap();
        assert_eq!(cache.len().await, 2);

        // "b" is still cached, "a" was evicted
        cache.perform(&transport, search("b"), ttl).await.unwrap();
        assert_eq!(transport.calls(), 3);
        cache.perform(&transport, search("a"), ttl).await.unwrap();
        assert_eq!(transport.calls(), 4);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let transport = CountingTransport::failing();
        let cache = RequestCache::default();
        let ttl = Duration::from_secs(60);

        assert!(cache.perform(&transport, search("a"), ttl).await.is_err());
        assert!(cache.perform(&transport, search("a"), ttl).await.is_err());

        assert_eq!(transport.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear() {
        let transport = CountingTransport::new();
        let cache = RequestCache::default();
        let ttl = Duration::from_secs(60);

        cache.perform(&transport, search("a"), ttl).await.unwrap();
        cache.clear().await;
        cache.perform(&transport, search("a"), ttl).await.unwrap();

        assert_eq!(transport.calls(), 2);
    }
}
