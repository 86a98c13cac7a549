//! The request-issuing capability the adapter is built on.
//!
//! Callers provide their own [`Fetch`] implementation (backed by `reqwest`,
//! `ureq`, an in-memory table, ...) and the adapter operates against these
//! traits only. Any `Fn(Url, RequestInit) -> impl Future` closure is a
//! capability, so tests and small integrations can pass an async closure.

use std::convert::Infallible;
use std::future::Future;

use bytes::Bytes;
use url::Url;

use crate::http::{BufferedResponse, RequestInit};

/// A response returned by a [`Fetch`] capability.
///
/// Status and header accessors borrow the response; `body` consumes it.
/// Headers therefore cannot be read once the body has been taken.
pub trait FetchResponse: Send {
    /// The error produced while reading the body.
    type Error: std::error::Error + Send + Sync + 'static;

    fn status(&self) -> u16;

    fn status_text(&self) -> String;

    /// Every header as a `(name, value)` pair, in transport order. A name may
    /// repeat.
    fn headers(&self) -> Vec<(String, String)>;

    /// Consumes the response and reads its whole body.
    fn body(self) -> impl Future<Output = Result<Bytes, Self::Error>> + Send;
}

/// Issues one HTTP request.
///
/// Shared by every in-flight invocation of an adapter, so implementations
/// must tolerate concurrent calls.
pub trait Fetch: Send + Sync {
    type Response: FetchResponse;

    /// Failure to obtain a response at all (DNS, connect, TLS, ...).
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        url: Url,
        init: RequestInit,
    ) -> impl Future<Output = Result<Self::Response, Self::Error>> + Send;
}

impl<F, Fut, R, E> Fetch for F
where
    F: Fn(Url, RequestInit) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send,
    R: FetchResponse,
    E: std::error::Error + Send + Sync + 'static,
{
    type Response = R;
    type Error = E;

    fn fetch(&self, url: Url, init: RequestInit) -> impl Future<Output = Result<R, E>> + Send {
        self(url, init)
    }
}

impl FetchResponse for BufferedResponse {
    type Error = Infallible;

    fn status(&self) -> u16 {
        self.status
    }

    fn status_text(&self) -> String {
        self.status_text.clone()
    }

    fn headers(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    async fn body(self) -> Result<Bytes, Infallible> {
        Ok(self.body)
    }
}
