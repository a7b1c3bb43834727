//! Search client entry point.
//!
//! This module provides the client application code starts from. It owns the
//! shared transport and response cache and vends per-collection handles.

use std::sync::Arc;

use tracing::info;

use crate::cache::RequestCache;
use crate::config::ClientConfig;
use crate::documents::Documents;
use crate::errors::SearchClientError;
use crate::http::HttpTransport;
use crate::interfaces::{ApiTransport, ResponseCache};

/// The main client for talking to the search service.
///
/// Handles vended by the client share its transport and cache, so one client
/// should be created per process and cloned where needed.
///
/// # Example
///
/// ```ignore
/// let config = ClientConfig::new(vec![NodeConfig::parse("http://localhost:8108")?], "xyz")
///     .with_cache_search_results_for(Duration::from_secs(60));
/// let client = SearchClient::new(config)?;
///
/// let documents = client.collection("companies").documents();
/// let outcomes = documents.import_documents(&companies, &ImportOptions::new()).await?;
/// ```
#[derive(Clone)]
pub struct SearchClient {
    transport: Arc<dyn ApiTransport>,
    cache: Arc<dyn ResponseCache>,
    config: Arc<ClientConfig>,
}

impl SearchClient {
    /// Create a client with the HTTP transport and an in-memory response cache.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchClient)` - A client ready to use
    /// * `Err(SearchClientError::InvalidConfig)` - If the config has no nodes or no API key
    pub fn new(config: ClientConfig) -> Result<Self, SearchClientError> {
        let transport = HttpTransport::new(&config)?;
        let cache = RequestCache::new(config.cache_max_entries);

        info!(
            nodes = config.nodes.len(),
            cache_ttl_ms = config.cache_search_results_for.as_millis() as u64,
            server_side_cache = config.use_server_side_search_cache,
            "Created search client"
        );

        Ok(Self::with_collaborators(
            config,
            Arc::new(transport),
            Arc::new(cache),
        ))
    }

    /// Create a client with custom collaborators.
    pub fn with_collaborators(
        config: ClientConfig,
        transport: Arc<dyn ApiTransport>,
        cache: Arc<dyn ResponseCache>,
    ) -> Self {
        Self {
            transport,
            cache,
            config: Arc::new(config),
        }
    }

    /// Handle for the named collection.
    pub fn collection(&self, name: impl Into<String>) -> Collection {
        Collection {
            name: name.into(),
            client: self.clone(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Drop every cached search response.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

/// A named collection on the search service.
#[derive(Clone)]
pub struct Collection {
    name: String,
    client: SearchClient,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for this collection's documents.
    pub fn documents(&self) -> Documents {
        Documents::new(
            self.name.clone(),
            self.client.transport.clone(),
            self.client.cache.clone(),
            self.client.config.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::documents::SearchOptions;
    use crate::interfaces::{ApiRequest, ApiResponse};
    use async_trait::async_trait;
    use search_client_shared::{SearchQuery, SearchResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct RecordingTransport {
        paths: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self {
                paths: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ApiTransport for RecordingTransport {
        async fn perform_request(
            &self,
            request: ApiRequest,
        ) -> Result<ApiResponse, SearchClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().await.push(request.path);
            Ok(ApiResponse::new(
                200,
                r#"{"found": 0, "out_of": 0, "page": 1, "request_params": {}, "hits": []}"#,
            ))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::new(vec![NodeConfig::new("http", "localhost", 8108)], "xyz")
            .with_cache_search_results_for(Duration::from_secs(60))
    }

    #[test]
    fn test_new_rejects_missing_api_key() {
        let result = SearchClient::new(ClientConfig::default());

        assert!(matches!(result, Err(SearchClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_with_valid_config() {
        let client = SearchClient::new(config()).unwrap();

        assert_eq!(client.config().nodes.len(), 1);
        assert_eq!(client.collection("companies").name(), "companies");
    }

    #[tokio::test]
    async fn test_documents_route_to_collection() {
        let transport = Arc::new(RecordingTransport::new());
        let client = SearchClient::with_collaborators(
            config(),
            transport.clone(),
            Arc::new(RequestCache::default()),
        );

        let _: SearchResponse = client
            .collection("companies")
            .documents()
            .search(&SearchQuery::new("*"), SearchOptions::new())
            .await
            .unwrap();

        assert_eq!(
            transport.paths.lock().await.as_slice(),
            ["/collections/companies/documents/search".to_string()]
        );
    }

    #[tokio::test]
    async fn test_handles_share_the_cache() {
        let transport = Arc::new(RecordingTransport::new());
        let client = SearchClient::with_collaborators(
            config(),
            transport.clone(),
            Arc::new(RequestCache::default()),
        );
        let query = SearchQuery::new("*");

        let _: SearchResponse = client
            .collection("companies")
            .documents()
            .search(&query, SearchOptions::new())
            .await
            .unwrap();
        let _: SearchResponse = client
            .collection("companies")
            .documents()
            .search(&query, SearchOptions::new())
            .await
            .unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        client.clear_cache().await;
        let _: SearchResponse = client
            .collection("companies")
            .documents()
            .search(&query, SearchOptions::new())
            .await
            .unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }
}
