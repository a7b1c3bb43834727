//! Search query parameters and response types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::params::{insert_list, insert_opt, merge_extra, QueryParams, ToQueryParams};

/// Parameters for a search against one collection.
///
/// The common parameters are typed; anything else the service understands can
/// be passed through `extra` and is forwarded verbatim.
///
/// # Example
///
/// ```ignore
/// let query = SearchQuery::new("stark")
///     .with_query_by(["company_name"])
///     .with_filter_by("num_employees:>100")
///     .with_per_page(20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub query_by: Option<Vec<String>>,
    pub query_by_weights: Option<Vec<String>>,
    pub prefix: Option<bool>,
    pub filter_by: Option<String>,
    pub sort_by: Option<String>,
    pub facet_by: Option<Vec<String>>,
    pub max_facet_values: Option<u32>,
    pub facet_query: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
    pub group_by: Option<Vec<String>>,
    pub group_limit: Option<u32>,
    pub include_fields: Option<Vec<String>>,
    pub exclude_fields: Option<Vec<String>>,
    pub highlight_fields: Option<Vec<String>>,
    pub highlight_full_fields: Option<Vec<String>>,
    pub highlight_start_tag: Option<String>,
    pub highlight_end_tag: Option<String>,
    pub snippet_threshold: Option<u32>,
    pub num_typos: Option<String>,
    pub drop_tokens_threshold: Option<u32>,
    pub typo_tokens_threshold: Option<u32>,
    pub pinned_hits: Option<Vec<String>>,
    pub hidden_hits: Option<Vec<String>>,
    /// Ask the server to serve this query from its own result cache.
    pub use_cache: Option<bool>,
    /// Server-side cache lifetime in seconds.
    pub cache_ttl: Option<u32>,
    /// Additional parameters forwarded verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl SearchQuery {
    /// Create a query for the given text. Use `"*"` to match everything.
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: Some(q.into()),
            ..Default::default()
        }
    }

    pub fn with_query_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.query_by = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filter_by(mut self, filter_by: impl Into<String>) -> Self {
        self.filter_by = Some(filter_by.into());
        self
    }

    pub fn with_sort_by(mut self, sort_by: impl Into<String>) -> Self {
        self.sort_by = Some(sort_by.into());
        self
    }

    pub fn with_facet_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.facet_by = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_group_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the response will carry grouped hits instead of flat hits.
    pub fn is_grouped(&self) -> bool {
        self.group_by.as_ref().is_some_and(|fields| !fields.is_empty())
    }
}

impl ToQueryParams for SearchQuery {
    fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        insert_opt(&mut params, "q", &self.q);
        insert_list(&mut params, "query_by", &self.query_by);
        insert_list(&mut params, "query_by_weights", &self.query_by_weights);
        insert_opt(&mut params, "prefix", &self.prefix);
        insert_opt(&mut params, "filter_by", &self.filter_by);
        insert_opt(&mut params, "sort_by", &self.sort_by);
        insert_list(&mut params, "facet_by", &self.facet_by);
        insert_opt(&mut params, "max_facet_values", &self.max_facet_values);
        insert_opt(&mut params, "facet_query", &self.facet_query);
        insert_opt(&mut params, "page", &self.page);
        insert_opt(&mut params, "per_page", &self.per_page);
        insert_opt(&mut params, "offset", &self.offset);
        insert_opt(&mut params, "limit", &self.limit);
        insert_list(&mut params, "group_by", &self.group_by);
        insert_opt(&mut params, "group_limit", &self.group_limit);
        insert_list(&mut params, "include_fields", &self.include_fields);
        insert_list(&mut params, "exclude_fields", &self.exclude_fields);
        insert_list(&mut params, "highlight_fields", &self.highlight_fields);
        insert_list(
            &mut params,
            "highlight_full_fields",
            &self.highlight_full_fields,
        );
        insert_opt(&mut params, "highlight_start_tag", &self.highlight_start_tag);
        insert_opt(&mut params, "highlight_end_tag", &self.highlight_end_tag);
        insert_opt(&mut params, "snippet_threshold", &self.snippet_threshold);
        insert_opt(&mut params, "num_typos", &self.num_typos);
        insert_opt(
            &mut params,
            "drop_tokens_threshold",
            &self.drop_tokens_threshold,
        );
        insert_opt(
            &mut params,
            "typo_tokens_threshold",
            &self.typo_tokens_threshold,
        );
        insert_list(&mut params, "pinned_hits", &self.pinned_hits);
        insert_list(&mut params, "hidden_hits", &self.hidden_hits);
        insert_opt(&mut params, "use_cache", &self.use_cache);
        insert_opt(&mut params, "cache_ttl", &self.cache_ttl);
        merge_extra(&mut params, &self.extra);
        params
    }
}

/// Count of one facet value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCount {
    pub count: u64,
    pub value: String,
    #[serde(default)]
    pub highlighted: Option<String>,
}

/// Facet counts for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub field_name: String,
    #[serde(default)]
    pub counts: Vec<FacetCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Value>,
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit<T = Document> {
    pub document: T,
    #[serde(default)]
    pub highlights: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_match: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_match_info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_distance_meters: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_distance: Option<f64>,
}

/// Hits sharing one group key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedHits<T = Document> {
    pub group_key: Vec<Value>,
    pub hits: Vec<SearchHit<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub found: Option<u64>,
}

/// Either flat hits or grouped hits, depending on whether the query grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchHits<T = Document> {
    Grouped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        found_docs: Option<u64>,
        grouped_hits: Vec<GroupedHits<T>>,
    },
    Flat {
        #[serde(default = "Vec::new")]
        hits: Vec<SearchHit<T>>,
    },
}

impl<T> SearchHits<T> {
    /// Every hit, flattening groups in order.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &SearchHit<T>> + '_> {
        match self {
            Self::Flat { hits } => Box::new(hits.iter()),
            Self::Grouped { grouped_hits, .. } => {
                Box::new(grouped_hits.iter().flat_map(|group| group.hits.iter()))
            }
        }
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped { .. })
    }
}

/// The response to a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse<T = Document> {
    #[serde(default)]
    pub facet_counts: Vec<FacetCounts>,
    #[serde(default)]
    pub found: u64,
    #[serde(default)]
    pub out_of: u64,
    #[serde(default)]
    pub page: u64,
    /// The request parameters as the server understood them.
    #[serde(default)]
    pub request_params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_time_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_cutoff: Option<bool>,
    #[serde(flatten)]
    pub hits: SearchHits<T>,
}
