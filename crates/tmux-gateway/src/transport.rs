//! Transport abstraction for the host's automation API.
//!
//! A transport performs one request/response round trip. How it encodes
//! messages and reaches the host is its own business.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use tmux_gateway_core::{Error, Result, RpcSettings, TmuxRequest, TmuxResponse};

/// One-shot RPC channel to the host application.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and wait for the matching response.
    ///
    /// # Errors
    ///
    /// Failures below the tmux protocol (connection lost, host exited) should
    /// be reported as [`Error::Transport`]. A response with a non-OK status is
    /// *not* an error at this layer.
    async fn send(&self, request: TmuxRequest) -> Result<TmuxResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: TmuxRequest) -> Result<TmuxResponse> {
        (**self).send(request).await
    }
}

/// Transport decorator that bounds every round trip with a deadline.
pub struct TimeoutTransport<T> {
    inner: T,
    timeout: Option<Duration>,
}

impl<T: Transport> TimeoutTransport<T> {
    /// Wrap `inner`; `None` disables the deadline.
    pub fn new(inner: T, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    /// Wrap `inner` using the configured request timeout.
    pub fn from_settings(inner: T, settings: &RpcSettings) -> Self {
        Self::new(inner, settings.request_timeout())
    }

    /// The wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for TimeoutTransport<T> {
    async fn send(&self, request: TmuxRequest) -> Result<TmuxResponse> {
        let Some(timeout) = self.timeout else {
            return self.inner.send(request).await;
        };

        let kind = request.kind();
        match tokio::time::timeout(timeout, self.inner.send(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("tmux {} request timed out after {:?}", kind, timeout);
                Err(Error::Timeout(timeout.as_millis() as u64))
            }
        }
    }
}
