//! Adapter factory and invocation.
//!
//! # Design
//! `FetchAdapter` owns the caller's `Fetch` capability and nothing else; it
//! keeps no state between invocations. One invocation builds the wire
//! request, awaits the capability, captures status and headers, then
//! consumes the body and classifies the outcome. A single deadline covers
//! both awaits, so a body that stalls after the headers arrived times out
//! the same way as a request that never answers.
//!
//! On timeout the pending future is dropped. Whether the underlying I/O
//! stops at that point depends on the capability: one that hands the work to
//! a spawned task or thread keeps running after the caller has given up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use tokio::time::{timeout_at, Instant};

use crate::config::RequestConfig;
use crate::error::AdapterError;
use crate::fetch::{Fetch, FetchResponse};
use crate::http::Headers;
use crate::response::{decode_body, is_success, lossy_text, AdapterResponse, ResponseData};

/// Deadline applied when neither the adapter nor the request sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Performs one request/response cycle for a client.
pub trait Adapter: Send + Sync {
    fn call(
        &self,
        config: &RequestConfig,
    ) -> impl Future<Output = Result<AdapterResponse, AdapterError>> + Send;
}

impl<A: Adapter> Adapter for Arc<A> {
    fn call(
        &self,
        config: &RequestConfig,
    ) -> impl Future<Output = Result<AdapterResponse, AdapterError>> + Send {
        (**self).call(config)
    }
}

/// Builds an adapter around `fetch`. Performs no I/O.
pub fn fetch_adapter<F: Fetch>(fetch: F) -> FetchAdapter<F> {
    FetchAdapter::new(fetch)
}

/// Adapter backed by a caller-supplied [`Fetch`] capability.
#[derive(Debug, Clone)]
pub struct FetchAdapter<F> {
    fetch: F,
    timeout: Duration,
}

impl<F: Fetch> FetchAdapter<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Issues the request described by `config`.
    pub async fn request(&self, config: &RequestConfig) -> Result<AdapterResponse, AdapterError> {
        let request = config.wire_request()?;
        let deadline = config.timeout.unwrap_or(self.timeout);
        let expires = Instant::now() + deadline;
        debug!("{} {}", request.method(), request.url());

        let pending = self.fetch.fetch(request.url().clone(), request.init().clone());
        let response = match timeout_at(expires, pending).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("{} {} failed: {e}", request.method(), request.url());
                return Err(AdapterError::network(config, &request, Box::new(e)));
            }
            Err(_) => {
                warn!(
                    "{} {} timed out after {}ms",
                    request.method(),
                    request.url(),
                    deadline.as_millis()
                );
                return Err(AdapterError::timeout(config, &request, deadline));
            }
        };

        // `body` consumes the response, so status and headers go first.
        let status = response.status();
        let status_text = response.status_text();
        let headers = capture_headers(response.headers());

        let mut normalized = AdapterResponse {
            status,
            status_text,
            data: ResponseData::Empty,
            headers,
            config: config.clone(),
            request,
        };

        let body = match timeout_at(expires, response.body()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!("{} {} body read failed: {e}", normalized.request.method(), normalized.request.url());
                return Err(AdapterError::interrupted(normalized, Box::new(e)));
            }
            Err(_) => {
                warn!(
                    "{} {} body timed out after {}ms",
                    normalized.request.method(),
                    normalized.request.url(),
                    deadline.as_millis()
                );
                return Err(AdapterError::body_timeout(normalized, deadline));
            }
        };
        let decoded = decode_body(normalized.headers.get("content-type"), &body);
        debug!(
            "{} {} -> {} ({} bytes)",
            normalized.request.method(),
            normalized.request.url(),
            status,
            body.len()
        );

        if !is_success(status) {
            // A body that does not match its content type must not hide the
            // status failure.
            normalized.data = decoded.unwrap_or_else(|_| lossy_text(&body));
            return Err(AdapterError::bad_status(normalized));
        }

        match decoded {
            Ok(data) => {
                normalized.data = data;
                Ok(normalized)
            }
            Err(e) => {
                normalized.data = lossy_text(&body);
                Err(AdapterError::decode(normalized, e))
            }
        }
    }
}

impl<F: Fetch> Adapter for FetchAdapter<F> {
    fn call(
        &self,
        config: &RequestConfig,
    ) -> impl Future<Output = Result<AdapterResponse, AdapterError>> + Send {
        self.request(config)
    }
}

/// Lower-cases header names; repeated names are joined with `", "`.
fn capture_headers(pairs: Vec<(String, String)>) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in pairs {
        headers.append(name.to_ascii_lowercase(), value);
    }
    headers
}
