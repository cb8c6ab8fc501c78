//! Lightweight JSON API client over a single base URL.
//!
//! # Overview
//! `ApiFetcher` exposes `get`/`post`/`put`/`patch`/`del`/`call` plus
//! cancelable variants. Every call goes through the same pipeline:
//! build the URL and options, send through a pluggable `Transport`, then
//! resolve the response into a payload or a classified `ApiError`.
//!
//! # Design
//! - Request options are an open JSON mapping. A caller override replaces
//!   the defaults wholesale; method and body are always injected.
//! - Resolution has a response stage (classify + parse, or `on_response`) and
//!   a data stage (`on_data`), with `on_catch` receiving any failure.
//! - Cancellation is advisory: the request still completes, its outcome is
//!   reported as `ApiError::Canceled`.
//! - I/O lives behind `Transport`; the `reqwest` feature provides the
//!   default implementation.
//!
//! ```no_run
//! # async fn run() -> Result<(), api_fetcher::ApiError> {
//! use api_fetcher::{ApiFetcher, ClientConfig};
//!
//! let fetcher = ApiFetcher::with_reqwest("http://localhost:3000", ClientConfig::default());
//! let todos = fetcher.get("/todos").await?;
//! println!("{todos:?}");
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod request;
pub mod resolve;
pub mod transport;

pub use cancel::{wrap, Cancel, CancelHandle, CancelableCall, CancelableRequest};
pub use classify::{classify, status_label};
pub use client::{decode, ApiFetcher, ApiFuture, NO_BODY};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ApiError, ApiResult};
pub use http::{HttpMethod, HttpResponse, RequestDescriptor};
pub use options::{FetchOptions, RequestOptions};
pub use request::RequestBuilder;
pub use resolve::{extract_data, ResponseResolver};
#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;
pub use transport::Transport;
