//! Document operations for one collection.
//!
//! This module provides the handle application code uses to import, export,
//! search, create, update and delete the documents of a collection.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::cancellation::CancellationToken;
use crate::config::ClientConfig;
use crate::errors::{ImportError, SearchClientError};
use crate::interfaces::{ApiRequest, ApiResponse, ApiTransport, ResponseCache};
use search_client_shared::{
    DeleteOutcome, DeleteQuery, DeleteResponse, DeleteTarget, Document, ExportOptions,
    ImportInput, ImportOptions, ImportOutcome, ImportResult, QueryParams, SearchQuery,
    SearchResponse, ToQueryParams, UpdateByFilterOptions, UpdateByFilterResponse, WriteAction,
    WriteOptions,
};

/// Root path of all collection endpoints.
pub const COLLECTIONS_PATH: &str = "/collections";

/// Content type of bulk import bodies.
const IMPORT_CONTENT_TYPE: &str = "text/plain";

/// Per-call options for [`Documents::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Cache lifetime for this call. `None` uses the configured default;
    /// zero skips the cache.
    pub cache_for: Option<Duration>,
    pub cancellation: Option<CancellationToken>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_for(mut self, ttl: Duration) -> Self {
        self.cache_for = Some(ttl);
        self
    }

    /// Do not serve this call from, or store it in, the cache.
    pub fn without_cache(self) -> Self {
        self.with_cache_for(Duration::ZERO)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}

/// Handle for the documents of one collection.
///
/// The handle holds no mutable state. Cloning it is cheap and concurrent
/// calls on the same handle are independent of each other.
#[derive(Clone)]
pub struct Documents {
    collection_name: String,
    transport: Arc<dyn ApiTransport>,
    cache: Arc<dyn ResponseCache>,
    config: Arc<ClientConfig>,
}

impl Documents {
    /// Create a handle for `collection_name` using the given collaborators.
    pub fn new(
        collection_name: impl Into<String>,
        transport: Arc<dyn ApiTransport>,
        cache: Arc<dyn ResponseCache>,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            collection_name: collection_name.into(),
            transport,
            cache,
            config,
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// `/collections/<name>/documents[/<operation>]`
    fn endpoint(&self, operation: Option<&str>) -> String {
        let base = format!(
            "{}/{}/documents",
            COLLECTIONS_PATH,
            urlencoding::encode(&self.collection_name)
        );
        match operation {
            Some(operation) => format!("{}/{}", base, operation),
            None => base,
        }
    }

    // ---------------------------------------------------------------------
    // Bulk exchange
    // ---------------------------------------------------------------------

    /// Import a batch of documents in one request.
    ///
    /// Each document is sent as one JSON line. The service answers with one
    /// outcome line per document, in the same order.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents to import; each must serialize to a JSON object
    /// * `options` - Import action, batch size and other import parameters
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ImportOutcome>)` - One outcome per document when none failed
    /// * `Err(SearchClientError::ImportFailed)` - If any document was rejected; the
    ///   error carries every outcome, successes included
    /// * `Err(SearchClientError)` - If the request itself fails
    #[instrument(skip(self, documents, options), fields(collection = %self.collection_name, count = documents.len()))]
    pub async fn import_documents<D: Serialize>(
        &self,
        documents: &[D],
        options: &ImportOptions,
    ) -> Result<Vec<ImportOutcome>, SearchClientError> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let body = to_jsonl(documents)?;
        let response = self.send_import(body, options).await?;
        let outcomes = parse_import_response(&response)?;

        if outcomes.len() != documents.len() {
            return Err(SearchClientError::parse(format!(
                "Import response has {} results for {} documents",
                outcomes.len(),
                documents.len()
            )));
        }

        if outcomes.iter().any(ImportOutcome::is_failure) {
            let error = ImportError::new(outcomes);
            warn!(
                succeeded = error.succeeded(),
                failed = error.failed(),
                "Import finished with failures"
            );
            return Err(error.into());
        }

        debug!(count = outcomes.len(), "Imported documents");
        Ok(outcomes)
    }

    /// Import either structured documents or pre-serialized JSONL.
    ///
    /// Structured input goes through [`Documents::import_documents`] and fails
    /// with the aggregate error on any rejected document. JSONL input goes
    /// through [`Documents::import_jsonl`] and always yields the raw response.
    pub async fn import<D: Serialize>(
        &self,
        input: ImportInput<'_, D>,
        options: &ImportOptions,
    ) -> Result<ImportResult, SearchClientError> {
        match input {
            ImportInput::Documents(documents) => self
                .import_documents(documents, options)
                .await
                .map(ImportResult::Outcomes),
            ImportInput::Jsonl(jsonl) => self
                .import_jsonl(jsonl, options)
                .await
                .map(ImportResult::Raw),
        }
    }

    /// Import documents that are already newline-delimited JSON.
    ///
    /// The body is sent unexamined and the service's response is returned
    /// as-is, even when some lines report failures.
    #[instrument(skip(self, jsonl, options), fields(collection = %self.collection_name))]
    pub async fn import_jsonl(
        &self,
        jsonl: impl Into<String>,
        options: &ImportOptions,
    ) -> Result<String, SearchClientError> {
        self.send_import(jsonl.into(), options).await
    }

    /// Deprecated alias of [`Documents::import_documents`].
    #[deprecated(note = "use `import_documents` instead")]
    pub async fn create_many<D: Serialize>(
        &self,
        documents: &[D],
        options: &ImportOptions,
    ) -> Result<Vec<ImportOutcome>, SearchClientError> {
        warn!(
            collection = %self.collection_name,
            "create_many is deprecated and will be removed in a future version. Use import_documents instead, which now takes the same parameters"
        );
        self.import_documents(documents, options).await
    }

    async fn send_import(
        &self,
        body: String,
        options: &ImportOptions,
    ) -> Result<String, SearchClientError> {
        let request = ApiRequest::post(self.endpoint(Some("import")))
            .with_query(options.to_query_params())
            .with_text(body, IMPORT_CONTENT_TYPE);

        Ok(self.transport.perform_request(request).await?.body)
    }

    /// Export documents as newline-delimited JSON.
    ///
    /// The service's response is returned exactly as received.
    #[instrument(skip(self, options), fields(collection = %self.collection_name))]
    pub async fn export(&self, options: &ExportOptions) -> Result<String, SearchClientError> {
        let request =
            ApiRequest::get(self.endpoint(Some("export"))).with_query(options.to_query_params());

        Ok(self.transport.perform_request(request).await?.body)
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Search the collection.
    ///
    /// The request goes through the response cache with the lifetime from
    /// `options` (or the configured default). When server-side caching is
    /// enabled, `use_cache=true` is added to the parameters before the cache
    /// sees them, so it is part of the cached request's identity.
    ///
    /// A cached response and a fresh one produce the same result.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchResponse<T>)` - The search results
    /// * `Err(SearchClientError::Cancelled)` - If the cancellation token fired first
    /// * `Err(SearchClientError)` - If the search fails
    ///
    /// # Example
    ///
    /// ```ignore
    /// let query = SearchQuery::new("stark").with_query_by(["company_name"]);
    /// let response: SearchResponse = documents.search(&query, SearchOptions::new()).await?;
    /// println!("Found {} results", response.found);
    /// ```
    #[instrument(skip(self, query, options), fields(collection = %self.collection_name))]
    pub async fn search<T: DeserializeOwned>(
        &self,
        query: &SearchQuery,
        options: SearchOptions,
    ) -> Result<SearchResponse<T>, SearchClientError> {
        let mut params = query.to_query_params();
        if self.config.use_server_side_search_cache {
            params.insert("use_cache".to_string(), "true".to_string());
        }

        let ttl = options
            .cache_for
            .unwrap_or(self.config.cache_search_results_for);
        let request = ApiRequest::get(self.endpoint(Some("search"))).with_query(params);

        let response = match options.cancellation {
            Some(token) => {
                if token.is_cancelled() {
                    return Err(SearchClientError::Cancelled);
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Search cancelled");
                        return Err(SearchClientError::Cancelled);
                    }
                    response = self.dispatch_search(request, ttl) => response?,
                }
            }
            None => self.dispatch_search(request, ttl).await?,
        };

        response.json()
    }

    async fn dispatch_search(
        &self,
        request: ApiRequest,
        ttl: Duration,
    ) -> Result<ApiResponse, SearchClientError> {
        if ttl.is_zero() {
            return self.transport.perform_request(request).await;
        }
        self.cache
            .perform(self.transport.as_ref(), request, ttl)
            .await
    }

    // ---------------------------------------------------------------------
    // Single-document writes
    // ---------------------------------------------------------------------

    /// Create a document. Fails if a document with the same id exists.
    ///
    /// # Returns
    ///
    /// * `Ok(Document)` - The created document as stored by the service
    /// * `Err(SearchClientError::MissingDocument)` - If `document` serializes to
    ///   `null` or a non-object; no request is sent
    pub async fn create<D: Serialize>(
        &self,
        document: &D,
        options: &WriteOptions,
    ) -> Result<Document, SearchClientError> {
        self.write(document, options, None).await
    }

    /// Create a document or replace the existing one with the same id.
    pub async fn upsert<D: Serialize>(
        &self,
        document: &D,
        options: &WriteOptions,
    ) -> Result<Document, SearchClientError> {
        self.write(document, options, Some(WriteAction::Upsert)).await
    }

    /// Partially update an existing document.
    pub async fn update<D: Serialize>(
        &self,
        document: &D,
        options: &WriteOptions,
    ) -> Result<Document, SearchClientError> {
        self.write(document, options, Some(WriteAction::Update)).await
    }

    async fn write<D: Serialize>(
        &self,
        document: &D,
        options: &WriteOptions,
        action: Option<WriteAction>,
    ) -> Result<Document, SearchClientError> {
        let operation = action.map_or("create".to_string(), |a| a.to_string());
        let body = to_document_body(document, &operation)?;

        // Caller options first, the action discriminator last.
        let mut params = options.to_query_params();
        if let Some(action) = action {
            params.insert("action".to_string(), action.to_string());
        }

        let value = self.transport.post(&self.endpoint(None), body, params).await?;
        serde_json::from_value(value).map_err(SearchClientError::from)
    }

    /// Partially update every document matching a filter.
    pub async fn update_by_filter<D: Serialize>(
        &self,
        partial: &D,
        options: &UpdateByFilterOptions,
    ) -> Result<UpdateByFilterResponse, SearchClientError> {
        let body = to_document_body(partial, "update_by_filter")?;
        let value = self
            .transport
            .patch(&self.endpoint(None), body, options.to_query_params())
            .await?;
        serde_json::from_value(value).map_err(SearchClientError::from)
    }

    // ---------------------------------------------------------------------
    // Deletes
    // ---------------------------------------------------------------------

    /// Delete one document by id, or every document matching a filter.
    ///
    /// `delete("doc123")` returns the deleted document;
    /// `delete(DeleteQuery::new("x:=1"))` returns only the deleted count.
    pub async fn delete(
        &self,
        target: impl Into<DeleteTarget>,
    ) -> Result<DeleteOutcome, SearchClientError> {
        match target.into() {
            DeleteTarget::Id(id) => self.delete_by_id(&id).await.map(DeleteOutcome::Document),
            DeleteTarget::Filter(query) => self
                .delete_by_filter(&query)
                .await
                .map(DeleteOutcome::Deleted),
        }
    }

    /// Delete exactly one document and return it.
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn delete_by_id(&self, id: &str) -> Result<Document, SearchClientError> {
        let encoded = urlencoding::encode(id);
        let path = self.endpoint(Some(encoded.as_ref()));
        let value = self.transport.delete(&path, QueryParams::new()).await?;
        serde_json::from_value(value).map_err(SearchClientError::from)
    }

    /// Delete every document matching `query.filter_by` and return the count.
    #[instrument(skip(self), fields(collection = %self.collection_name))]
    pub async fn delete_by_filter(
        &self,
        query: &DeleteQuery,
    ) -> Result<DeleteResponse, SearchClientError> {
        let value = self
            .transport
            .delete(&self.endpoint(None), query.to_query_params())
            .await?;
        serde_json::from_value(value).map_err(SearchClientError::from)
    }
}

/// Serialize a single-document write body, rejecting missing documents.
fn to_document_body<D: Serialize>(document: &D, operation: &str) -> Result<Value, SearchClientError> {
    let value = serde_json::to_value(document)
        .map_err(|e| SearchClientError::serialization(e.to_string()))?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Err(SearchClientError::missing_document(format!(
            "no document provided for {}",
            operation
        ))),
        other => Err(SearchClientError::missing_document(format!(
            "{} expects a JSON object, got {}",
            operation,
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Encode documents as one JSON line each, joined with `\n`.
fn to_jsonl<D: Serialize>(documents: &[D]) -> Result<String, SearchClientError> {
    let lines = documents
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| SearchClientError::serialization(e.to_string()))?;
    Ok(lines.join("\n"))
}

/// Parse an import response into outcomes, skipping empty lines.
fn parse_import_response(response: &str) -> Result<Vec<ImportOutcome>, SearchClientError> {
    response
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                SearchClientError::parse(format!("Invalid import result line {:?}: {}", line, e))
            })
        })
        .collect()
}
