//! Request option sets: the built-in defaults and the caller's override set.
//!
//! Options are an open mapping from option name to JSON value (`headers`,
//! `credentials`, `mode`, `cache`, `redirect`, `referrer`, ...). The method and
//! the serialized body are held apart from the mapping because the builder
//! always injects them, whichever option set is active.

use serde_json::{json, Map, Value};

use crate::http::HttpMethod;

pub const DEFAULT_CONTENT_TYPE: &str = "application/json ; charset=utf-8";

/// The option set used when no override is active.
pub fn default_fields() -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "headers".to_string(),
        json!({
            "Access-Control-Allow-Origin": "*",
            "Content-Type": DEFAULT_CONTENT_TYPE,
        }),
    );
    fields.insert("credentials".to_string(), json!("include"));
    fields.insert("mode".to_string(), json!("cors"));
    fields
}

/// A caller-supplied option set that replaces the defaults wholesale.
///
/// Only a JSON object with at least one key is accepted. A `method` key is
/// kept and takes precedence over the method of each call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOptions(Map<String, Value>);

impl FetchOptions {
    /// Validate `value` as an override set, returning `None` for anything
    /// that is not a non-empty object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => {
                if map.is_empty() {
                    None
                } else {
                    Some(FetchOptions(map))
                }
            }
            _ => None,
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The `method` key, when the override carries one.
    pub fn method(&self) -> Option<&Value> {
        self.0.get("method")
    }
}

/// The full option set for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub fields: Map<String, Value>,
    /// JSON-serialized request body, when the call carried one.
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Header pairs from the `headers` option. Non-string values are rendered
    /// as JSON text.
    pub fn headers(&self) -> Vec<(String, String)> {
        match self.fields.get("headers") {
            Some(Value::Object(headers)) => headers
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (name.clone(), value)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Render as a single object: `{method, ...fields, body?}`.
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("method".to_string(), json!(self.method.as_str()));
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.clone());
        }
        if let Some(body) = &self.body {
            map.insert("body".to_string(), json!(body));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_table() {
        let fields = default_fields();
        assert_eq!(fields["credentials"], "include");
        assert_eq!(fields["mode"], "cors");
        assert_eq!(fields["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(fields["headers"]["Content-Type"], "application/json ; charset=utf-8");
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn override_rejects_non_objects() {
        assert!(FetchOptions::from_value(Value::Null).is_none());
        assert!(FetchOptions::from_value(json!("hello")).is_none());
        assert!(FetchOptions::from_value(json!(42)).is_none());
        assert!(FetchOptions::from_value(json!(["mode"])).is_none());
    }

    #[test]
    fn override_rejects_empty_object() {
        assert!(FetchOptions::from_value(json!({})).is_none());
    }

    #[test]
    fn override_keeps_method_key() {
        let opts = FetchOptions::from_value(json!({"method": "PUT", "mode": "cors"})).unwrap();
        assert_eq!(opts.method(), Some(&json!("PUT")));
        assert_eq!(opts.as_map()["mode"], "cors");

        let only_method = FetchOptions::from_value(json!({"method": "PUT"})).unwrap();
        assert_eq!(only_method.as_map().len(), 1);
    }

    #[test]
    fn headers_are_flattened_to_pairs() {
        let opts = RequestOptions {
            method: HttpMethod::Get,
            fields: default_fields(),
            body: None,
        };
        let mut headers = opts.headers();
        headers.sort();
        assert_eq!(
            headers,
            vec![
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
                ("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string()),
            ]
        );
    }

    #[test]
    fn to_value_includes_method_and_body() {
        let mut fields = Map::new();
        fields.insert("mode".to_string(), json!("cors"));
        let opts = RequestOptions {
            method: HttpMethod::Post,
            fields,
            body: Some(r#"{"a":1}"#.to_string()),
        };
        assert_eq!(
            opts.to_value(),
            json!({"method": "POST", "mode": "cors", "body": "{\"a\":1}"})
        );
    }
}
