//! Transport abstraction
//!
//! The executor talks to the network only through [`Transport`], so tests
//! can swap in a recording or canned implementation.

use super::request::PreparedRequest;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Raw HTTP response: status and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends prepared requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request and return its raw response.
    ///
    /// Non-2xx statuses are returned, not raised; only I/O failures are
    /// errors.
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

/// Transport wrapper that counts the requests passing through it
#[derive(Debug)]
pub struct CountingTransport<T> {
    inner: T,
    calls: AtomicUsize,
}

impl<T> CountingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of requests sent so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for CountingTransport<T> {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.send(request).await
    }
}
