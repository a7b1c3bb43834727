//! # Search Client
//!
//! Client-side handle for the documents of one collection in a remote search
//! service. It covers three concerns:
//!
//! 1. **Bulk exchange**: newline-delimited JSON import with per-document
//!    outcomes and an aggregate error on partial failure, plus export.
//! 2. **Cached search**: searches routed through a response cache with a
//!    per-call lifetime and cooperative cancellation.
//! 3. **CRUD**: create/upsert/update/delete of single documents and
//!    filter-driven deletes.
//!
//! The HTTP transport and the response cache sit behind traits so they can be
//! swapped out, most usefully for mocks in tests.

pub mod cache;
pub mod cancellation;
pub mod client;
pub mod config;
pub mod documents;
pub mod errors;
pub mod http;
pub mod interfaces;

pub use cache::{NoCache, RequestCache};
pub use cancellation::CancellationToken;
pub use client::{Collection, SearchClient};
pub use config::{ClientConfig, NodeConfig};
pub use documents::{Documents, SearchOptions};
pub use errors::{ImportError, SearchClientError};
pub use http::HttpTransport;
pub use interfaces::{ApiRequest, ApiResponse, ApiTransport, Method, RequestBody, ResponseCache};

pub use search_client_shared as types;
