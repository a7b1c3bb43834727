//! Response cache implementations.

mod request_cache;

pub use request_cache::{NoCache, RequestCache, DEFAULT_MAX_ENTRIES};
