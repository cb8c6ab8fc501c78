//! Derives the target URL and the option set for each call.
//!
//! # Design
//! `RequestBuilder` owns the URL prefix and the one piece of mutable client
//! state: the override option set. Every call reads the override under a
//! short read lock and copies what it needs into a fresh `RequestOptions`,
//! so a later `set_fetch_options` only affects calls built after it.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, RequestDescriptor};
use crate::options::{default_fields, FetchOptions, RequestOptions};

#[derive(Debug)]
pub struct RequestBuilder {
    url_prefix: String,
    overrides: RwLock<Option<FetchOptions>>,
}

impl RequestBuilder {
    /// The prefix is kept as given; no slash is added or removed.
    pub fn new(url_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            overrides: RwLock::new(None),
        }
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Concatenate the prefix with the trimmed endpoint. Callers supply any
    /// leading slash themselves.
    pub fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.url_prefix, endpoint.trim())
    }

    /// Build the option set for `method`.
    ///
    /// An active override replaces the defaults entirely, and a `method` it
    /// carries replaces `method`. A body that serializes to a falsy JSON
    /// value (`null`, `false`, `0`, `""`) counts as no body.
    pub fn build_options<B>(&self, method: HttpMethod, body: Option<&B>) -> Result<RequestOptions, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut fields = match &*self.overrides.read().unwrap_or_else(PoisonError::into_inner) {
            Some(overrides) => overrides.as_map().clone(),
            None => default_fields(),
        };
        let method = match fields.remove("method") {
            Some(Value::String(name)) => name.parse::<HttpMethod>()?,
            Some(other) => return Err(ApiError::InvalidMethod(other.to_string())),
            None => method,
        };
        let body = match body {
            Some(body) => serialize_body(body)?,
            None => None,
        };
        Ok(RequestOptions { method, fields, body })
    }

    pub fn build<B>(&self, method: HttpMethod, endpoint: &str, body: Option<&B>) -> Result<RequestDescriptor, ApiError>
    where
        B: Serialize + ?Sized,
    {
        Ok(RequestDescriptor {
            url: self.build_url(endpoint),
            options: self.build_options(method, body)?,
        })
    }

    /// Install an override set. Anything other than a non-empty JSON object
    /// is logged and ignored, leaving the previous state in place.
    pub fn set_fetch_options(&self, overrides: Value) {
        let kind = json_kind(&overrides);
        match FetchOptions::from_value(overrides) {
            Some(overrides) => {
                *self.overrides.write().unwrap_or_else(PoisonError::into_inner) = Some(overrides);
            }
            None => {
                tracing::warn!("fetch options must be a non-empty object, got {kind}; keeping current options");
            }
        }
    }

    pub fn fetch_options(&self) -> Option<FetchOptions> {
        self.overrides.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

fn serialize_body<B>(body: &B) -> Result<Option<String>, ApiError>
where
    B: Serialize + ?Sized,
{
    let value = serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
    if is_falsy(&value) {
        return Ok(None);
    }
    serde_json::to_string(&value)
        .map(Some)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

/// JavaScript truthiness over JSON. Objects and arrays are truthy even when
/// empty.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n == 0.0 || !n.is_finite()),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(map) if map.is_empty() => "an empty object",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    const PREFIX: &str = "http://hello.com/api";

    fn builder() -> RequestBuilder {
        RequestBuilder::new(PREFIX)
    }

    fn defaults_with(method: &str) -> Value {
        json!({
            "method": method,
            "headers": {
                "Access-Control-Allow-Origin": "*",
                "Content-Type": "application/json ; charset=utf-8",
            },
            "credentials": "include",
            "mode": "cors",
        })
    }

    #[test]
    fn url_defaults_to_prefix() {
        assert_eq!(builder().build_url(""), PREFIX);
    }

    #[test]
    fn url_appends_endpoint() {
        assert_eq!(builder().build_url("/todos"), "http://hello.com/api/todos");
    }

    #[test]
    fn url_trims_endpoint_without_inserting_separator() {
        assert_eq!(builder().build_url("  /todos/1 "), "http://hello.com/api/todos/1");
        assert_eq!(builder().build_url("todos"), "http://hello.com/apitodos");
    }

    #[test]
    fn trailing_slash_is_kept() {
        let b = RequestBuilder::new("http://h/api/");
        assert_eq!(b.build_url("/x"), "http://h/api//x");
    }

    #[test]
    fn override_is_unset_by_default() {
        assert!(builder().fetch_options().is_none());
    }

    #[test]
    fn default_options_carry_method() {
        let opts = builder().build_options::<Value>(HttpMethod::Get, None).unwrap();
        assert_eq!(opts.to_value(), defaults_with("GET"));
    }

    #[test]
    fn default_options_carry_serialized_body() {
        let body = json!({"clientId": "ABC"});
        let opts = builder().build_options(HttpMethod::Post, Some(&body)).unwrap();
        let mut expected = defaults_with("POST");
        expected["body"] = json!(r#"{"clientId":"ABC"}"#);
        assert_eq!(opts.to_value(), expected);
    }

    #[test]
    fn override_replaces_defaults() {
        let b = builder();
        b.set_fetch_options(json!({"mode": "cors", "referrer": "no-referrer"}));

        let del = b.build_options::<Value>(HttpMethod::Delete, None).unwrap();
        assert_eq!(
            del.to_value(),
            json!({"method": "DELETE", "mode": "cors", "referrer": "no-referrer"})
        );

        let post = b.build_options(HttpMethod::Post, Some(&json!({"a": 1}))).unwrap();
        assert_eq!(
            post.to_value(),
            json!({"method": "POST", "mode": "cors", "referrer": "no-referrer", "body": "{\"a\":1}"})
        );
    }

    #[test]
    fn last_override_wins() {
        let b = builder();
        b.set_fetch_options(json!({"mode": "cors"}));
        b.set_fetch_options(json!({"cache": "no-cache"}));
        let opts = b.build_options::<Value>(HttpMethod::Get, None).unwrap();
        assert_eq!(opts.to_value(), json!({"method": "GET", "cache": "no-cache"}));
    }

    #[test]
    fn invalid_override_keeps_previous_state() {
        let b = builder();
        b.set_fetch_options(Value::Null);
        b.set_fetch_options(json!("hello"));
        b.set_fetch_options(json!({}));
        assert!(b.fetch_options().is_none());
        let opts = b.build_options::<Value>(HttpMethod::Get, None).unwrap();
        assert_eq!(opts.to_value(), defaults_with("GET"));

        b.set_fetch_options(json!({"mode": "same-origin"}));
        b.set_fetch_options(json!(false));
        assert_eq!(b.fetch_options().unwrap().as_map()["mode"], "same-origin");
    }

    #[test]
    fn null_body_is_treated_as_absent() {
        let none: Option<u32> = None;
        let opts = builder().build_options(HttpMethod::Put, Some(&none)).unwrap();
        assert!(opts.body.is_none());
    }

    #[test]
    fn zero_body_is_treated_as_absent() {
        let b = builder();
        assert!(b.build_options(HttpMethod::Post, Some(&json!(0))).unwrap().body.is_none());
        assert!(b.build_options(HttpMethod::Post, Some(&0.0f64)).unwrap().body.is_none());
        assert!(b.build_options(HttpMethod::Post, Some(&-0.0f64)).unwrap().body.is_none());
    }

    #[test]
    fn false_body_is_treated_as_absent() {
        let opts = builder().build_options(HttpMethod::Post, Some(&false)).unwrap();
        assert!(opts.body.is_none());
    }

    #[test]
    fn empty_string_body_is_treated_as_absent() {
        let opts = builder().build_options(HttpMethod::Put, Some(&json!(""))).unwrap();
        assert!(opts.body.is_none());
        assert_eq!(opts.to_value(), defaults_with("PUT"));
    }

    #[test]
    fn non_finite_body_is_treated_as_absent() {
        // serde_json renders NaN and infinities as null
        assert!(builder().build_options(HttpMethod::Post, Some(&f64::NAN)).unwrap().body.is_none());
        assert!(builder().build_options(HttpMethod::Post, Some(&f64::INFINITY)).unwrap().body.is_none());
    }

    #[test]
    fn truthy_scalars_and_empty_containers_are_sent() {
        let b = builder();
        let cases = [
            (json!(1), "1"),
            (json!(-0.5), "-0.5"),
            (json!(true), "true"),
            (json!("0"), "\"0\""),
            (json!({}), "{}"),
            (json!([]), "[]"),
        ];
        for (body, expected) in cases {
            let opts = b.build_options(HttpMethod::Post, Some(&body)).unwrap();
            assert_eq!(opts.body.as_deref(), Some(expected), "body {body}");
        }
    }

    #[test]
    fn override_method_replaces_call_method() {
        let b = builder();
        b.set_fetch_options(json!({"method": "put", "mode": "cors"}));

        let opts = b.build_options::<Value>(HttpMethod::Get, None).unwrap();
        assert_eq!(opts.method, HttpMethod::Put);
        assert_eq!(opts.to_value(), json!({"method": "PUT", "mode": "cors"}));

        let req = b.build::<Value>(HttpMethod::Delete, "/1", None).unwrap();
        assert_eq!(req.method(), HttpMethod::Put);
    }

    #[test]
    fn unknown_override_method_fails_the_build() {
        let b = builder();
        b.set_fetch_options(json!({"method": "FETCH"}));
        let err = b.build_options::<Value>(HttpMethod::Get, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidMethod(ref m) if m == "FETCH"));

        b.set_fetch_options(json!({"method": 7}));
        let err = b.build_options::<Value>(HttpMethod::Get, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidMethod(ref m) if m == "7"));
    }

    #[test]
    fn non_string_map_keys_fail_to_serialize() {
        let mut body = BTreeMap::new();
        body.insert(vec![1u8], "x");
        let err = builder().build_options(HttpMethod::Post, Some(&body)).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn build_produces_descriptor() {
        let req = builder().build::<Value>(HttpMethod::Get, "/123", None).unwrap();
        assert_eq!(req.url, "http://hello.com/api/123");
        assert_eq!(req.method(), HttpMethod::Get);
        assert!(req.options.body.is_none());
    }
}
