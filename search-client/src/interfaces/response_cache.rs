//! Response cache trait definition.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::SearchClientError;
use crate::interfaces::{ApiRequest, ApiResponse, ApiTransport};

/// Decides whether a read is served from a stored response or the network.
///
/// Callers hand over the transport, the fully assembled request and the
/// lifetime they want the response kept for. Implementations own keying,
/// freshness and eviction. The only contract is that a served response is
/// indistinguishable from a fresh one for the same request.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Serve `request` from the cache if a fresh entry exists, otherwise send
    /// it through `transport` and store the response for `ttl`.
    ///
    /// A zero `ttl` must bypass the cache entirely.
    async fn perform(
        &self,
        transport: &dyn ApiTransport,
        request: ApiRequest,
        ttl: Duration,
    ) -> Result<ApiResponse, SearchClientError>;

    /// Drop every stored response.
    async fn clear(&self) {}
}
