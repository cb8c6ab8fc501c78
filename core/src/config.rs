//! Per-client configuration: the optional pipeline hooks.
//!
//! # Design
//! Each hook is an `Option` of a shared async closure, so presence is checked
//! once per call. Closures are stored type-erased (`BoxFuture`) which lets a
//! single `ApiFetcher` type carry any combination of hooks. The config is
//! immutable once built.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::HttpResponse;

/// Replaces classification and body parsing. Receives the raw response.
pub type ResponseHook = Arc<dyn Fn(Option<HttpResponse>) -> BoxFuture<'static, ApiResult> + Send + Sync>;

/// Shapes the response-stage output into the final result.
pub type DataHook = Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, ApiResult> + Send + Sync>;

/// Receives any error raised by the pipeline and decides the final result.
pub type CatchHook = Arc<dyn Fn(ApiError) -> BoxFuture<'static, ApiResult> + Send + Sync>;

#[derive(Clone, Default)]
pub struct ClientConfig {
    pub(crate) on_response: Option<ResponseHook>,
    pub(crate) on_data: Option<DataHook>,
    pub(crate) on_catch: Option<CatchHook>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn has_hooks(&self) -> bool {
        self.on_response.is_some() || self.on_data.is_some() || self.on_catch.is_some()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("on_response", &self.on_response.is_some())
            .field("on_data", &self.on_data.is_some())
            .field("on_catch", &self.on_catch.is_some())
            .finish()
    }
}

/// Builder for [`ClientConfig`]. Setting a hook twice keeps the last one.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn on_response<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<HttpResponse>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.config.on_response = Some(Arc::new(move |response| hook(response).boxed()));
        self
    }

    pub fn on_data<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.config.on_data = Some(Arc::new(move |data| hook(data).boxed()));
        self
    }

    pub fn on_catch<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ApiError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult> + Send + 'static,
    {
        self.config.on_catch = Some(Arc::new(move |err| hook(err).boxed()));
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
