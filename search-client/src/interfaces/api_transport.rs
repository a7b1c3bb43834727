//! Transport trait definition.
//!
//! The transport turns an [`ApiRequest`] into an HTTP exchange with one of the
//! configured nodes. Node selection and retries live behind this trait.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::SearchClientError;
use search_client_shared::QueryParams;

/// HTTP method of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Body of an API request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Sent as `application/json`.
    Json(Value),
    /// Sent verbatim with the given content type.
    Text {
        content: String,
        content_type: String,
    },
}

/// A request against the service, relative to a node's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/collections/books/documents`.
    pub path: String,
    pub query: QueryParams,
    pub body: RequestBody,
    pub headers: BTreeMap<String, String>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: RequestBody::Empty,
            headers: BTreeMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_text(mut self, content: impl Into<String>, content_type: impl Into<String>) -> Self {
        self.body = RequestBody::Text {
            content: content.into(),
            content_type: content_type.into(),
        };
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Identity of this request for response caching.
    ///
    /// Two requests with the same method, path, parameters and body share a
    /// key. Parameters are already sorted, so their order does not matter.
    pub fn cache_key(&self) -> String {
        let query = self
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let body = match &self.body {
            RequestBody::Empty => String::new(),
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Text { content, .. } => content.clone(),
        };
        format!("{} {}?{}#{}", self.method, self.path, query, body)
    }
}

/// A successful response from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SearchClientError> {
        serde_json::from_str(&self.body).map_err(|e| {
            SearchClientError::parse(format!("Invalid JSON response: {}", e))
        })
    }
}

/// Abstract interface for issuing requests to the search service.
///
/// Implementations own node selection, timeouts and retries. They only return
/// `Ok` for successful (2xx) responses; any other status is surfaced as
/// [`SearchClientError::Http`].
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so one transport can be shared by
/// every handle and task.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Execute a request and return the raw response.
    ///
    /// This is the only required method. It must be able to send opaque text
    /// bodies with a caller-chosen content type, which bulk import relies on.
    async fn perform_request(&self, request: ApiRequest) -> Result<ApiResponse, SearchClientError>;

    /// `GET` a path and decode the JSON response.
    async fn get(&self, path: &str, query: QueryParams) -> Result<Value, SearchClientError> {
        self.perform_request(ApiRequest::get(path).with_query(query))
            .await?
            .json()
    }

    /// `POST` a JSON body and decode the JSON response.
    async fn post(
        &self,
        path: &str,
        body: Value,
        query: QueryParams,
    ) -> Result<Value, SearchClientError> {
        self.perform_request(ApiRequest::post(path).with_query(query).with_json(body))
            .await?
            .json()
    }

    /// `PATCH` a JSON body and decode the JSON response.
    async fn patch(
        &self,
        path: &str,
        body: Value,
        query: QueryParams,
    ) -> Result<Value, SearchClientError> {
        self.perform_request(ApiRequest::patch(path).with_query(query).with_json(body))
            .await?
            .json()
    }

    /// `DELETE` a path and decode the JSON response.
    async fn delete(&self, path: &str, query: QueryParams) -> Result<Value, SearchClientError> {
        self.perform_request(ApiRequest::delete(path).with_query(query))
            .await?
            .json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_ignores_insertion_order() {
        let mut a = QueryParams::new();
        a.insert("q".to_string(), "shoe".to_string());
        a.insert("query_by".to_string(), "title".to_string());

        let mut b = QueryParams::new();
        b.insert("query_by".to_string(), "title".to_string());
        b.insert("q".to_string(), "shoe".to_string());

        let first = ApiRequest::get("/collections/c/documents/search").with_query(a);
        let second = ApiRequest::get("/collections/c/documents/search").with_query(b);

        assert_eq!(first.cache_key(), second.cache_key());
    }

    #[test]
    fn test_cache_key_distinguishes_method_and_body() {
        let get = ApiRequest::get("/x");
        let post = ApiRequest::post("/x").with_json(json!({"a": 1}));
        let other_post = ApiRequest::post("/x").with_json(json!({"a": 2}));

        assert_ne!(get.cache_key(), post.cache_key());
        assert_ne!(post.cache_key(), other_post.cache_key());
    }

    #[test]
    fn test_response_json() {
        let response = ApiResponse::new(200, r#"{"num_deleted": 3}"#);
        let value: Value = response.json().unwrap();
        assert_eq!(value["num_deleted"], json!(3));

        let broken = ApiResponse::new(200, "not json");
        assert!(matches!(
            broken.json::<Value>(),
            Err(SearchClientError::Parse(_))
        ));
    }
}
