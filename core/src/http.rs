//! HTTP data types exchanged with the transport.
//!
//! # Design
//! Requests and responses are plain data. The client builds a
//! `RequestDescriptor`, hands it to a `Transport`, and resolves the returned
//! `HttpResponse` without caring how the bytes travelled. Keeping these types
//! owned (`String`, `Vec`) lets test transports fabricate responses freely.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ApiError;
use crate::options::RequestOptions;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(ApiError::InvalidMethod(s.to_string())),
        }
    }
}

/// A request ready to hand to the transport: target URL plus options.
///
/// Built fresh for every call and never retained by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub url: String,
    pub options: RequestOptions,
}

impl RequestDescriptor {
    pub fn method(&self) -> HttpMethod {
        self.options.method
    }
}

/// An HTTP response described as plain data.
///
/// `status_text` is the reason phrase (`"No Content"` for a 204 from a
/// conforming transport). An empty `status_text` means the server sent none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A response with the given status and no reason phrase, headers or body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// True for 2xx statuses.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON. Fails on an empty body like any other invalid JSON.
    pub fn json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
