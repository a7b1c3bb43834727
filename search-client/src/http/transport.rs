//! reqwest-backed transport with node rotation and retries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ClientConfig;
use crate::errors::SearchClientError;
use crate::interfaces::{ApiRequest, ApiResponse, ApiTransport, Method, RequestBody};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// HTTP transport for the search service.
///
/// Requests go to the configured nodes round-robin. A failed attempt that is
/// worth retrying (connection error, timeout, 5xx, 408, 429) is retried on the
/// next node with exponential backoff, up to `num_retries` times. Any other
/// failure is returned immediately.
///
/// # Example
///
/// ```ignore
/// let config = ClientConfig::new(vec![NodeConfig::parse("http://localhost:8108")?], "xyz");
/// let transport = HttpTransport::new(&config)?;
/// let health = transport.get("/health", QueryParams::new()).await?;
/// ```
pub struct HttpTransport {
    client: reqwest::Client,
    base_urls: Vec<String>,
    api_key: String,
    num_retries: u32,
    retry_interval: Duration,
    max_retry_interval: Duration,
    next_node: AtomicUsize,
}

impl HttpTransport {
    /// Create a new transport for the configured nodes.
    ///
    /// # Returns
    ///
    /// * `Ok(HttpTransport)` - A transport ready to send requests
    /// * `Err(SearchClientError)` - If the config is invalid or the HTTP client cannot be built
    pub fn new(config: &ClientConfig) -> Result<Self, SearchClientError> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.connection_timeout)
            .build()
            .map_err(|e| SearchClientError::connection(e.to_string()))?;

        let base_urls: Vec<String> = config.nodes.iter().map(|node| node.base_url()).collect();

        info!(
            nodes = ?base_urls,
            num_retries = config.num_retries,
            "Created HTTP transport"
        );

        Ok(Self {
            client,
            base_urls,
            api_key: config.api_key.clone(),
            num_retries: config.num_retries,
            retry_interval: config.retry_interval,
            max_retry_interval: config.max_retry_interval,
            next_node: AtomicUsize::new(0),
        })
    }

    /// Pick the next node, round-robin.
    fn next_base_url(&self) -> &str {
        let index = self.next_node.fetch_add(1, Ordering::Relaxed) % self.base_urls.len();
        &self.base_urls[index]
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }

    fn map_send_error(err: reqwest::Error) -> SearchClientError {
        if err.is_timeout() {
            SearchClientError::timeout(err.to_string())
        } else {
            SearchClientError::connection(err.to_string())
        }
    }

    /// Send one attempt of `request` to the node at `base_url`.
    async fn send_once(
        &self,
        base_url: &str,
        request: &ApiRequest,
    ) -> Result<ApiResponse, SearchClientError> {
        let url = format!("{}{}", base_url, request.path);

        let mut builder = self
            .client
            .request(Self::method(request.method), &url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Text {
                content,
                content_type,
            } => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(content.clone()),
        };

        debug!(method = %request.method, url = %url, "Sending request");

        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let body = response.text().await.map_err(Self::map_send_error)?;

        if !status.is_success() {
            error!(status = %status, url = %url, body = %body, "Request failed");
            return Err(SearchClientError::http(status.as_u16(), &body));
        }

        Ok(ApiResponse::new(status.as_u16(), body))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse, SearchClientError> {
        let mut delay = self.retry_interval;
        let mut last_error: Option<SearchClientError> = None;

        for attempt in 0..=self.num_retries {
            let base_url = self.next_base_url();

            match self.send_once(base_url, &request).await {
                Ok(response) => {
                    if attempt > 0 {
                        info!(attempt = attempt, "Request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(e) => {
                    if !e.is_retryable() {
                        return Err(e);
                    }

                    // Don't wait after the last attempt
                    if attempt < self.num_retries {
                        warn!(
                            attempt = attempt + 1,
                            max_retries = self.num_retries,
                            delay_ms = delay.as_millis() as u64,
                            node = %base_url,
                            error = %e,
                            "Request failed, retrying on next node"
                        );

                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * 2, self.max_retry_interval);
                    }

                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SearchClientError::connection("Request failed after retries")
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use search_client_shared::QueryParams;

    fn config(nodes: Vec<NodeConfig>) -> ClientConfig {
        ClientConfig::new(nodes, "xyz")
            .with_num_retries(1)
            .with_retry_interval(Duration::from_millis(1))
            .with_connection_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = HttpTransport::new(&ClientConfig::new(vec![], "xyz"));
        assert!(matches!(result, Err(SearchClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_round_robin_node_selection() {
        let transport = HttpTransport::new(&config(vec![
            NodeConfig::new("http", "node-a", 8108),
            NodeConfig::new("http", "node-b", 8108),
        ]))
        .unwrap();

        assert_eq!(transport.next_base_url(), "http://node-a:8108");
        assert_eq!(transport.next_base_url(), "http://node-b:8108");
        assert_eq!(transport.next_base_url(), "http://node-a:8108");
    }

    #[tokio::test]
    async fn test_unreachable_node_is_connection_error() {
        // Port 1 on loopback refuses connections.
        let transport =
            HttpTransport::new(&config(vec![NodeConfig::new("http", "127.0.0.1", 1)])).unwrap();

        let result = transport.get("/health", QueryParams::new()).await;

        assert!(matches!(
            result,
            Err(SearchClientError::Connection(_)) | Err(SearchClientError::Timeout(_))
        ));
    }
}
