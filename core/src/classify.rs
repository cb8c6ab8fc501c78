//! Status classification: decides whether a response passes on to body
//! parsing or becomes a labelled `ApiError::Status`.

use std::borrow::Cow;

use crate::error::ApiError;
use crate::http::HttpResponse;

/// Label for a failed status code.
pub fn status_label(status: u16) -> Cow<'static, str> {
    match status {
        401 => Cow::Borrowed("Unauthorized"),
        403 => Cow::Borrowed("Forbidden"),
        404 => Cow::Borrowed("Not Found"),
        500 => Cow::Borrowed("Internal Server Error"),
        other => Cow::Owned(format!("Http Status Code {other}")),
    }
}

/// Pass absent and ok responses through unchanged; reject everything else.
///
/// The body is never read here.
pub fn classify(response: Option<HttpResponse>) -> Result<Option<HttpResponse>, ApiError> {
    match response {
        Some(response) if !response.ok() => {
            let label = status_label(response.status);
            let message = if response.status_text.is_empty() {
                label.into_owned()
            } else {
                format!("{label} - {}", response.status_text)
            };
            tracing::debug!(status = response.status, "response classified as failure: {message}");
            Err(ApiError::Status {
                status: response.status,
                message,
            })
        }
        other => Ok(other),
    }
}
