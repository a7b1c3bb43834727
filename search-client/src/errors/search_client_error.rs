//! Search client error types.
//!
//! This module defines the errors every client operation can return.

use serde_json::Value;
use thiserror::Error;

use super::ImportError;

/// Errors that can occur while talking to the search service.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchClientError {
    /// A write was called without a document. Raised before any request.
    #[error("Missing document: {0}")]
    MissingDocument(String),

    /// One or more documents of a structured import were rejected.
    #[error("Import error: {0}")]
    ImportFailed(#[from] ImportError),

    /// The caller's cancellation token fired before the call resolved.
    #[error("Request cancelled")]
    Cancelled,

    /// The service answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Failed to reach the service.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Failed to serialize a request body.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Failed to parse a response from the service.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SearchClientError {
    /// Create a missing document error.
    pub fn missing_document(msg: impl Into<String>) -> Self {
        Self::MissingDocument(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an HTTP error from a status and response body.
    ///
    /// The service reports errors as `{"message": "..."}`; anything else is
    /// kept as the raw body.
    pub fn http(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| body.to_string());
        Self::Http { status, message }
    }

    /// HTTP status of the failed request, if the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    /// The aggregate import error, if this is one.
    pub fn as_import_error(&self) -> Option<&ImportError> {
        match self {
            Self::ImportFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SearchClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_extracts_message() {
        let error = SearchClientError::http(404, r#"{"message": "Not Found"}"#);
        assert_eq!(
            error,
            SearchClientError::Http {
                status: 404,
                message: "Not Found".to_string()
            }
        );
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn test_http_error_keeps_raw_body() {
        let error = SearchClientError::http(502, "Bad Gateway");
        assert_eq!(error.to_string(), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SearchClientError::connection("refused").is_retryable());
        assert!(SearchClientError::timeout("slow").is_retryable());
        assert!(SearchClientError::http(503, "").is_retryable());
        assert!(SearchClientError::http(429, "").is_retryable());
        assert!(!SearchClientError::http(400, "").is_retryable());
        assert!(!SearchClientError::Cancelled.is_retryable());
        assert!(!SearchClientError::missing_document("create").is_retryable());
    }
}
