//! Configuration types for the SearchClient.

use std::time::Duration;

use url::Url;

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::errors::SearchClientError;

/// One server the client may send requests to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    /// Path prefix the API is mounted under, empty for the root.
    pub path: String,
}

impl NodeConfig {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
            port,
            path: String::new(),
        }
    }

    /// Parse a node from a URL such as `https://search.example.com:443/api`.
    pub fn parse(url: &str) -> Result<Self, SearchClientError> {
        let parsed = Url::parse(url)
            .map_err(|e| SearchClientError::invalid_config(format!("Invalid node URL {}: {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| SearchClientError::invalid_config(format!("Node URL {} has no host", url)))?;
        let port = parsed.port_or_known_default().ok_or_else(|| {
            SearchClientError::invalid_config(format!("Node URL {} has no port", url))
        })?;

        Ok(Self {
            protocol: parsed.scheme().to_string(),
            host: host.to_string(),
            port,
            path: parsed.path().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are resolved against, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}{}", self.protocol, self.host, self.port, self.path)
    }
}

/// Configuration for the SearchClient.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Nodes to send requests to, tried round-robin.
    pub nodes: Vec<NodeConfig>,
    pub api_key: String,
    /// Timeout for a single request attempt.
    pub connection_timeout: Duration,
    /// Retries after the first failed attempt.
    pub num_retries: u32,
    /// Delay before the first retry; doubled per retry.
    pub retry_interval: Duration,
    pub max_retry_interval: Duration,
    /// Default lifetime of cached search responses. Zero disables caching.
    pub cache_search_results_for: Duration,
    /// Ask the server to use its own search cache.
    pub use_server_side_search_cache: bool,
    /// Maximum number of responses kept by the in-memory cache.
    pub cache_max_entries: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            nodes: vec![NodeConfig::new("http", "localhost", 8108)],
            api_key: String::new(),
            connection_timeout: Duration::from_secs(5),
            num_retries: 3,
            retry_interval: Duration::from_millis(100),
            max_retry_interval: Duration::from_secs(5),
            cache_search_results_for: Duration::ZERO,
            use_server_side_search_cache: false,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given nodes and API key with default settings.
    pub fn new(nodes: Vec<NodeConfig>, api_key: impl Into<String>) -> Self {
        Self {
            nodes,
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn with_num_retries(mut self, num_retries: u32) -> Self {
        self.num_retries = num_retries;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_cache_search_results_for(mut self, ttl: Duration) -> Self {
        self.cache_search_results_for = ttl;
        self
    }

    pub fn with_server_side_search_cache(mut self, enabled: bool) -> Self {
        self.use_server_side_search_cache = enabled;
        self
    }

    pub fn with_cache_max_entries(mut self, max_entries: usize) -> Self {
        self.cache_max_entries = max_entries;
        self
    }

    /// Check the config is usable for sending requests.
    pub fn validate(&self) -> Result<(), SearchClientError> {
        if self.nodes.is_empty() {
            return Err(SearchClientError::invalid_config(
                "At least one node is required",
            ));
        }
        if self.api_key.is_empty() {
            return Err(SearchClientError::invalid_config("api_key is required"));
        }
        Ok(())
    }
}
