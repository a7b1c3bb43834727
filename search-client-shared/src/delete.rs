//! Single-document and filter-driven delete shapes.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::params::{insert_opt, QueryParams, ToQueryParams};

/// A filter-driven batch delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteQuery {
    pub filter_by: String,
    /// Number of documents the server deletes per internal batch.
    pub batch_size: Option<usize>,
    /// Treat a filter matching nothing as success.
    pub ignore_not_found: Option<bool>,
}

impl DeleteQuery {
    pub fn new(filter_by: impl Into<String>) -> Self {
        Self {
            filter_by: filter_by.into(),
            ..Default::default()
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_ignore_not_found(mut self, ignore_not_found: bool) -> Self {
        self.ignore_not_found = Some(ignore_not_found);
        self
    }
}

impl ToQueryParams for DeleteQuery {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("filter_by".to_string(), self.filter_by.clone());
        insert_opt(&mut params, "batch_size", &self.batch_size);
        insert_opt(&mut params, "ignore_not_found", &self.ignore_not_found);
        params
    }
}

/// Response of a filter-driven delete: only the count, never the documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub num_deleted: u64,
}

/// What a single `delete` call removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// Exactly one document, by id.
    Id(String),
    /// Every document matched by a filter.
    Filter(DeleteQuery),
}

impl From<&str> for DeleteTarget {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for DeleteTarget {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<DeleteQuery> for DeleteTarget {
    fn from(query: DeleteQuery) -> Self {
        Self::Filter(query)
    }
}

/// Result of a `delete` call, shaped by its [`DeleteTarget`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The deleted document, for an id delete.
    Document(Document),
    /// The deleted count, for a filter delete.
    Deleted(DeleteResponse),
}

impl DeleteOutcome {
    /// Number of documents removed by this call.
    pub fn num_deleted(&self) -> u64 {
        match self {
            Self::Document(_) => 1,
            Self::Deleted(response) => response.num_deleted,
        }
    }
}
