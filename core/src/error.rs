//! Error types for the fetcher pipeline.
//!
//! # Design
//! Classification failures carry the fully composed, human-readable message
//! (`"Forbidden - Not Allowed"`) so `Display` can surface it verbatim. Body
//! parse failures keep the underlying `serde_json::Error` as their source.
//! The canceled marker is a dedicated variant so callers can tell an advisory
//! cancellation apart from every real failure with `is_canceled()`.

use serde_json::Value;
use thiserror::Error;

/// Outcome of a request: `Ok(None)` when there is no content, `Ok(Some(Value::Null))`
/// when the body was empty, otherwise the parsed (or hook-shaped) payload.
pub type ApiResult = Result<Option<Value>, ApiError>;

/// Errors produced while building, sending, or resolving a request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The response was not ok. `message` is the label for the status,
    /// followed by ` - <status text>` when the server sent one.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A non-empty response body was not valid JSON.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// The request body could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before producing a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request was canceled before it settled.
    #[error("request canceled")]
    Canceled,

    /// A method name that does not map to a known HTTP method.
    #[error("invalid http method: {0}")]
    InvalidMethod(String),

    /// An error raised by a caller-supplied hook.
    #[error("{0}")]
    Hook(String),
}

impl ApiError {
    /// Build a hook error from any message.
    pub fn hook(message: impl Into<String>) -> Self {
        ApiError::Hook(message.into())
    }

    /// True only for the canceled marker.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ApiError::Canceled)
    }

    /// The HTTP status behind a classification failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
