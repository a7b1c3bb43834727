//! Interface definitions for the client's collaborators.
//!
//! This module defines the abstract `ApiTransport` and `ResponseCache` traits
//! that allow for dependency injection and swappable implementations.

mod api_transport;
mod response_cache;

pub use api_transport::{ApiRequest, ApiResponse, ApiTransport, Method, RequestBody};
pub use response_cache::ResponseCache;
