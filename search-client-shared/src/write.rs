//! Options for single-document writes and update-by-filter.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::import::DirtyValues;
use crate::params::{insert_opt, merge_extra, QueryParams, ToQueryParams};

/// The action discriminator the client attaches to a single-document write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteAction {
    Upsert,
    Update,
}

impl fmt::Display for WriteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upsert => f.write_str("upsert"),
            Self::Update => f.write_str("update"),
        }
    }
}

/// Caller options for create/upsert/update.
///
/// There is no `action` field. The client sets the action itself and an
/// `action` key in `extra` is overridden.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    pub dirty_values: Option<DirtyValues>,
    /// Additional parameters forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirty_values(mut self, dirty_values: DirtyValues) -> Self {
        self.dirty_values = Some(dirty_values);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl ToQueryParams for WriteOptions {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_opt(&mut params, "dirty_values", &self.dirty_values);
        merge_extra(&mut params, &self.extra);
        params
    }
}

/// Options for a partial update of every document matching a filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateByFilterOptions {
    pub filter_by: String,
    pub dirty_values: Option<DirtyValues>,
}

impl UpdateByFilterOptions {
    pub fn new(filter_by: impl Into<String>) -> Self {
        Self {
            filter_by: filter_by.into(),
            dirty_values: None,
        }
    }
}

impl ToQueryParams for UpdateByFilterOptions {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("filter_by".to_string(), self.filter_by.clone());
        insert_opt(&mut params, "dirty_values", &self.dirty_values);
        params
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateByFilterResponse {
    pub num_updated: u64,
}
