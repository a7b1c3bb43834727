//! Error types for the search client.

mod import_error;
mod search_client_error;

pub use import_error::ImportError;
pub use search_client_error::SearchClientError;
