//! The network boundary.
//!
//! The client never performs I/O itself: it hands a `RequestDescriptor` to a
//! `Transport` and resolves whatever comes back. `Ok(None)` stands for an
//! absent response and resolves as "no content".

use async_trait::async_trait;

use crate::error::ApiError;
use crate::http::{HttpResponse, RequestDescriptor};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Option<HttpResponse>, ApiError>;
}

#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod reqwest_transport {
    use super::*;

    /// Options a browser fetch understands but a native client has no use for.
    const BROWSER_ONLY: &[&str] = &["credentials", "mode", "cache", "redirect", "referrer", "referrerPolicy"];

    /// reqwest-backed transport.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestTransport {
        inner: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn from_client(client: reqwest::Client) -> Self {
            Self { inner: client }
        }
    }

    #[async_trait]
    impl Transport for ReqwestTransport {
        async fn fetch(&self, request: &RequestDescriptor) -> Result<Option<HttpResponse>, ApiError> {
            let options = &request.options;
            let method = reqwest::Method::from_bytes(options.method.as_str().as_bytes())
                .map_err(|e| ApiError::InvalidMethod(e.to_string()))?;

            let ignored: Vec<&str> = BROWSER_ONLY
                .iter()
                .copied()
                .filter(|key| options.get(key).is_some())
                .collect();
            if !ignored.is_empty() {
                tracing::trace!(?ignored, "options not applicable to native transport");
            }

            let mut builder = self.inner.request(method, &request.url);
            for (name, value) in options.headers() {
                builder = builder.header(name, value);
            }
            if let Some(body) = &options.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            // hyper only records the phrase when it differs from the canonical one
            let status_text = match response.extensions().get::<hyper::ext::ReasonPhrase>() {
                Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
                None => status.canonical_reason().unwrap_or_default().to_string(),
            };
            let body = response.text().await?;

            Ok(Some(HttpResponse {
                status: status.as_u16(),
                status_text,
                headers,
                body,
            }))
        }
    }
}
