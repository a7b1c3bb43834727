//! Bulk import parameters and per-document outcomes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{insert_opt, merge_extra, QueryParams, ToQueryParams};

/// How the service treats each imported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    /// Reject documents whose id already exists.
    Create,
    /// Replace existing documents, creating missing ones.
    Upsert,
    /// Partially update existing documents; missing ones fail.
    Update,
    /// Partially update existing documents, creating missing ones.
    Emplace,
}

impl ImportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Upsert => "upsert",
            Self::Update => "update",
            Self::Emplace => "emplace",
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How field values that do not match the collection schema are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirtyValues {
    CoerceOrReject,
    CoerceOrDrop,
    Drop,
    Reject,
}

impl DirtyValues {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoerceOrReject => "coerce_or_reject",
            Self::CoerceOrDrop => "coerce_or_drop",
            Self::Drop => "drop",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for DirtyValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query options for a bulk import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportOptions {
    pub action: Option<ImportAction>,
    /// Number of documents the server processes per internal batch.
    pub batch_size: Option<usize>,
    pub dirty_values: Option<DirtyValues>,
    /// Ask the server to echo the id of each imported document.
    pub return_id: Option<bool>,
    /// Ask the server to echo each imported document.
    pub return_doc: Option<bool>,
    pub remote_embedding_batch_size: Option<usize>,
    /// Additional parameters forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_action(mut self, action: ImportAction) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn with_dirty_values(mut self, dirty_values: DirtyValues) -> Self {
        self.dirty_values = Some(dirty_values);
        self
    }

    pub fn with_return_id(mut self, return_id: bool) -> Self {
        self.return_id = Some(return_id);
        self
    }

    pub fn with_return_doc(mut self, return_doc: bool) -> Self {
        self.return_doc = Some(return_doc);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl ToQueryParams for ImportOptions {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_opt(&mut params, "action", &self.action);
        insert_opt(&mut params, "batch_size", &self.batch_size);
        insert_opt(&mut params, "dirty_values", &self.dirty_values);
        insert_opt(&mut params, "return_id", &self.return_id);
        insert_opt(&mut params, "return_doc", &self.return_doc);
        insert_opt(
            &mut params,
            "remote_embedding_batch_size",
            &self.remote_embedding_batch_size,
        );
        merge_extra(&mut params, &self.extra);
        params
    }
}

/// The result of importing one document.
///
/// An import response holds one outcome per submitted line, in submission order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ImportLine", into = "ImportLine")]
pub enum ImportOutcome {
    Success {
        /// Present when the import was issued with `return_id`.
        id: Option<String>,
        /// Present when the import was issued with `return_doc`.
        document: Option<Value>,
    },
    Failure {
        error: String,
        code: u16,
        /// The submitted document as echoed by the server. Parsed when the
        /// echo is valid JSON, otherwise the raw echoed text.
        document: Value,
    },
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// The server's error message, for failures.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure { error, .. } => Some(error),
            Self::Success { .. } => None,
        }
    }

    /// The document attached to this outcome, if any.
    pub fn document(&self) -> Option<&Value> {
        match self {
            Self::Success { document, .. } => document.as_ref(),
            Self::Failure { document, .. } => Some(document),
        }
    }
}

/// What to import: structured documents or newline-delimited JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportInput<'a, D> {
    /// Serialized one document per line; the response is parsed into outcomes.
    Documents(&'a [D]),
    /// Sent unexamined; the response is returned unparsed.
    Jsonl(String),
}

/// Result of an import, shaped by its [`ImportInput`].
#[derive(Debug, Clone, PartialEq)]
pub enum ImportResult {
    /// One outcome per document, in submission order.
    Outcomes(Vec<ImportOutcome>),
    /// The service's response text as received.
    Raw(String),
}

/// Wire shape of one line of an import response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ImportLine {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    document: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl From<ImportLine> for ImportOutcome {
    fn from(line: ImportLine) -> Self {
        if line.success {
            return Self::Success {
                id: line.id,
                document: line.document.map(parse_echoed_document),
            };
        }

        Self::Failure {
            error: line.error.unwrap_or_default(),
            code: line.code.unwrap_or_default(),
            document: line
                .document
                .map(parse_echoed_document)
                .unwrap_or(Value::Null),
        }
    }
}

impl From<ImportOutcome> for ImportLine {
    fn from(outcome: ImportOutcome) -> Self {
        match outcome {
            ImportOutcome::Success { id, document } => Self {
                success: true,
                error: None,
                code: None,
                document,
                id,
            },
            ImportOutcome::Failure {
                error,
                code,
                document,
            } => Self {
                success: false,
                error: Some(error),
                code: Some(code),
                document: Some(document),
                id: None,
            },
        }
    }
}

/// The server echoes submitted documents as JSON-encoded strings.
fn parse_echoed_document(value: Value) -> Value {
    match value {
        Value::String(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
        other => other,
    }
}
