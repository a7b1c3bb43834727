//! Bulk export parameters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::{insert_list, insert_opt, merge_extra, QueryParams, ToQueryParams};

/// Query options for a bulk export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Only export documents matching this filter expression.
    pub filter_by: Option<String>,
    pub include_fields: Option<Vec<String>>,
    pub exclude_fields: Option<Vec<String>>,
    /// Additional parameters forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter_by(mut self, filter_by: impl Into<String>) -> Self {
        self.filter_by = Some(filter_by.into());
        self
    }

    pub fn with_include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }
}

impl ToQueryParams for ExportOptions {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_opt(&mut params, "filter_by", &self.filter_by);
        insert_list(&mut params, "include_fields", &self.include_fields);
        insert_list(&mut params, "exclude_fields", &self.exclude_fields);
        merge_extra(&mut params, &self.extra);
        params
    }
}
