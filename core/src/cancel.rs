//! Advisory cancellation for in-flight requests.
//!
//! # Design
//! `wrap` puts a pending request behind a shared flag. Canceling never
//! aborts the underlying request: the wrapped future still runs to
//! completion when polled, and only its settlement is reinterpreted. Once
//! the flag is set, both success and failure settle as `ApiError::Canceled`.
//!
//! The flag is an `AtomicBool` so a `CancelHandle` can be moved to another
//! task or thread than the one awaiting the request.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::ApiError;

/// Anything that can be asked to cancel.
pub trait Cancel {
    fn cancel(&self);
}

/// Cloneable handle that cancels the request it was taken from.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    canceled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

impl Cancel for CancelHandle {
    /// Only the first call has an effect.
    fn cancel(&self) {
        if !self.canceled.swap(true, Ordering::AcqRel) {
            tracing::debug!("request canceled");
        }
    }
}

/// A pending request paired with its cancel switch. Await it for the result.
#[must_use = "futures do nothing unless polled"]
pub struct CancelableRequest<T = Option<serde_json::Value>> {
    inner: BoxFuture<'static, Result<T, ApiError>>,
    handle: CancelHandle,
}

impl<T> CancelableRequest<T> {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    pub fn is_canceled(&self) -> bool {
        self.handle.is_canceled()
    }
}

impl<T> Cancel for CancelableRequest<T> {
    fn cancel(&self) {
        self.handle.cancel();
    }
}

impl<T> std::fmt::Debug for CancelableRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelableRequest")
            .field("canceled", &self.handle.is_canceled())
            .finish_non_exhaustive()
    }
}

impl<T> Future for CancelableRequest<T> {
    type Output = Result<T, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let settled = match self.inner.poll_unpin(cx) {
            Poll::Ready(settled) => settled,
            Poll::Pending => return Poll::Pending,
        };
        let canceled = self.handle.is_canceled();
        Poll::Ready(match settled {
            Ok(_) if canceled => Err(ApiError::Canceled),
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!("cancelable request failed: {err}");
                if canceled {
                    Err(ApiError::Canceled)
                } else {
                    Err(err)
                }
            }
        })
    }
}

/// Wrap a pending request so it can be canceled.
pub fn wrap<F, T>(future: F) -> CancelableRequest<T>
where
    F: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    CancelableRequest {
        inner: future.boxed(),
        handle: CancelHandle {
            canceled: Arc::new(AtomicBool::new(false)),
        },
    }
}

/// A cancelable request resolving to a pipeline payload.
pub type CancelableCall = CancelableRequest<Option<serde_json::Value>>;
