//! Verb-named entry points over a single base URL.
//!
//! # Design
//! `ApiFetcher` is a cheap handle (`Arc` inside) composing three parts:
//! `RequestBuilder` turns a call into a `RequestDescriptor`, the `Transport`
//! performs the round-trip, and `ResponseResolver` classifies and shapes the
//! result. The request is built eagerly when an operation is called, so the
//! returned future owns everything it needs and is `'static`. Cancelable
//! variants are exactly `wrap(plain_operation())`.

use std::fmt;
use std::sync::Arc;

use futures::future::{ready, BoxFuture};
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::cancel::{wrap, Cancel, CancelableCall};
use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::HttpMethod;
use crate::options::{FetchOptions, RequestOptions};
use crate::request::RequestBuilder;
use crate::resolve::ResponseResolver;
use crate::transport::Transport;

/// Pass as the body of [`ApiFetcher::call`] when there is none.
pub const NO_BODY: Option<&Value> = None;

/// A pending request resolving to the pipeline payload.
pub type ApiFuture = BoxFuture<'static, ApiResult>;

#[derive(Clone)]
pub struct ApiFetcher {
    inner: Arc<Inner>,
}

struct Inner {
    request: RequestBuilder,
    resolver: ResponseResolver,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for ApiFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiFetcher")
            .field("url_prefix", &self.inner.request.url_prefix())
            .field("fetch_options", &self.inner.request.fetch_options())
            .field("config", self.inner.resolver.config())
            .finish_non_exhaustive()
    }
}

impl ApiFetcher {
    pub fn new<T>(url_prefix: impl Into<String>, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::with_config(url_prefix, transport, ClientConfig::default())
    }

    pub fn with_config<T>(url_prefix: impl Into<String>, transport: T, config: ClientConfig) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                request: RequestBuilder::new(url_prefix),
                resolver: ResponseResolver::new(config),
                transport: Arc::new(transport),
            }),
        }
    }

    /// A fetcher backed by a default `reqwest` client.
    #[cfg(feature = "reqwest")]
    pub fn with_reqwest(url_prefix: impl Into<String>, config: ClientConfig) -> Self {
        Self::with_config(url_prefix, crate::transport::ReqwestTransport::new(), config)
    }

    pub fn url_prefix(&self) -> &str {
        self.inner.request.url_prefix()
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.resolver.config()
    }

    /// Replace the default options for every later call. See
    /// [`RequestBuilder::set_fetch_options`].
    pub fn set_fetch_options(&self, overrides: Value) {
        self.inner.request.set_fetch_options(overrides);
    }

    /// The active override set, `None` while the defaults apply.
    pub fn fetch_options(&self) -> Option<FetchOptions> {
        self.inner.request.fetch_options()
    }

    pub fn request_url(&self, endpoint: &str) -> String {
        self.inner.request.build_url(endpoint)
    }

    pub fn request_options<B>(&self, method: HttpMethod, body: Option<&B>) -> Result<RequestOptions, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.inner.request.build_options(method, body)
    }

    /// Send `method` to `endpoint` with an optional JSON body.
    ///
    /// A body that fails to serialize yields an immediately failed future;
    /// it never reaches the transport or `on_catch`.
    pub fn call<B>(&self, method: HttpMethod, endpoint: &str, body: Option<&B>) -> ApiFuture
    where
        B: Serialize + ?Sized,
    {
        let request = match self.inner.request.build(method, endpoint, body) {
            Ok(request) => request,
            Err(err) => return ready(Err(err)).boxed(),
        };
        let inner = self.inner.clone();
        async move {
            tracing::debug!(method = %request.method(), url = %request.url, "sending request");
            match inner.transport.fetch(&request).await {
                Ok(response) => inner.resolver.resolve(response).await,
                Err(err) => {
                    tracing::debug!(url = %request.url, "transport failed: {err}");
                    inner.resolver.recover(Err(err)).await
                }
            }
        }
        .boxed()
    }

    pub fn get(&self, endpoint: &str) -> ApiFuture {
        self.call(HttpMethod::Get, endpoint, NO_BODY)
    }

    /// Pass [`NO_BODY`] to send the request without a body.
    pub fn post<B>(&self, endpoint: &str, body: Option<&B>) -> ApiFuture
    where
        B: Serialize + ?Sized,
    {
        self.call(HttpMethod::Post, endpoint, body)
    }

    pub fn put<B>(&self, endpoint: &str, body: Option<&B>) -> ApiFuture
    where
        B: Serialize + ?Sized,
    {
        self.call(HttpMethod::Put, endpoint, body)
    }

    pub fn patch<B>(&self, endpoint: &str, body: Option<&B>) -> ApiFuture
    where
        B: Serialize + ?Sized,
    {
        self.call(HttpMethod::Patch, endpoint, body)
    }

    pub fn del(&self, endpoint: &str) -> ApiFuture {
        self.call(HttpMethod::Delete, endpoint, NO_BODY)
    }

    pub fn cancelable_call<B>(&self, method: HttpMethod, endpoint: &str, body: Option<&B>) -> CancelableCall
    where
        B: Serialize + ?Sized,
    {
        wrap(self.call(method, endpoint, body))
    }

    pub fn cancelable_get(&self, endpoint: &str) -> CancelableCall {
        wrap(self.get(endpoint))
    }

    pub fn cancelable_post<B>(&self, endpoint: &str, body: Option<&B>) -> CancelableCall
    where
        B: Serialize + ?Sized,
    {
        wrap(self.post(endpoint, body))
    }

    pub fn cancelable_put<B>(&self, endpoint: &str, body: Option<&B>) -> CancelableCall
    where
        B: Serialize + ?Sized,
    {
        wrap(self.put(endpoint, body))
    }

    pub fn cancelable_patch<B>(&self, endpoint: &str, body: Option<&B>) -> CancelableCall
    where
        B: Serialize + ?Sized,
    {
        wrap(self.patch(endpoint, body))
    }

    pub fn cancelable_del(&self, endpoint: &str) -> CancelableCall {
        wrap(self.del(endpoint))
    }

    /// Cancel `handle` if there is one.
    pub fn revoke<H>(&self, handle: Option<&H>)
    where
        H: Cancel + ?Sized,
    {
        if let Some(handle) = handle {
            handle.cancel();
        }
    }
}

/// Deserialize a pipeline payload into `T`. No content stays `None`.
pub fn decode<T>(data: Option<Value>) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
{
    data.map(serde_json::from_value).transpose().map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Todo {
        id: String,
        done: bool,
    }

    #[test]
    fn decode_typed_payload() {
        let todo: Option<Todo> = decode(Some(json!({"id": "1", "done": true}))).unwrap();
        assert_eq!(
            todo,
            Some(Todo {
                id: "1".to_string(),
                done: true
            })
        );
    }

    #[test]
    fn decode_keeps_no_content() {
        let todo: Option<Todo> = decode(None).unwrap();
        assert!(todo.is_none());
    }

    #[test]
    fn decode_mismatch_is_parse_error() {
        let err = decode::<Todo>(Some(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
