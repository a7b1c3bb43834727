//! Query parameter encoding shared by every request type.

use std::collections::BTreeMap;

use serde_json::Value;

/// Query parameters as sent on the wire.
///
/// A `BTreeMap` keeps the parameters sorted, which makes the encoded request
/// stable and usable as part of a cache key.
pub type QueryParams = BTreeMap<String, String>;

/// Conversion of a typed parameter struct into wire query parameters.
pub trait ToQueryParams {
    /// Encode the set fields. Unset fields are omitted.
    fn to_query_params(&self) -> QueryParams;
}

/// Render a JSON value the way the service expects it in a query string.
///
/// Strings are sent verbatim, arrays are joined with `,`, everything else uses
/// its JSON text (`true`, `42`, ...).
pub fn param_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(param_value)
            .collect::<Vec<_>>()
            .join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Merge an auxiliary `extra` map into already-encoded parameters.
///
/// Typed fields win: an extra key never overrides a field that was set
/// explicitly on the struct.
pub fn merge_extra(params: &mut QueryParams, extra: &BTreeMap<String, Value>) {
    for (key, value) in extra {
        if value.is_null() {
            continue;
        }
        params
            .entry(key.clone())
            .or_insert_with(|| param_value(value));
    }
}

/// Insert `key` when `value` is set.
pub(crate) fn insert_opt<T: ToString>(params: &mut QueryParams, key: &str, value: &Option<T>) {
    if let Some(v) = value {
        params.insert(key.to_string(), v.to_string());
    }
}

/// Insert `key` as a comma-joined list when `values` is set.
pub(crate) fn insert_list(params: &mut QueryParams, key: &str, values: &Option<Vec<String>>) {
    if let Some(v) = values {
        params.insert(key.to_string(), v.join(","));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_value_rendering() {
        assert_eq!(param_value(&json!("title")), "title");
        assert_eq!(param_value(&json!(true)), "true");
        assert_eq!(param_value(&json!(25)), "25");
        assert_eq!(param_value(&json!(["a", "b", 3])), "a,b,3");
    }

    #[test]
    fn test_merge_extra_does_not_override_typed_fields() {
        let mut params = QueryParams::new();
        params.insert("q".to_string(), "shoes".to_string());

        let mut extra = BTreeMap::new();
        extra.insert("q".to_string(), json!("hats"));
        extra.insert("enable_overrides".to_string(), json!(false));
        extra.insert("ignored".to_string(), Value::Null);

        merge_extra(&mut params, &extra);

        assert_eq!(params.get("q").map(String::as_str), Some("shoes"));
        assert_eq!(
            params.get("enable_overrides").map(String::as_str),
            Some("false")
        );
        assert!(!params.contains_key("ignored"));
    }
}
