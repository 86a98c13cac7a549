//! Classified errors returned by an adapter invocation.
//!
//! # Design
//! Every failure path of an invocation ends in exactly one `AdapterError`
//! with one of five `ErrorKind`s. The error always carries the originating
//! `RequestConfig`; it carries the `WireRequest` once one was built, and the
//! normalized response whenever a response was actually received, so callers
//! can inspect status, headers and body of failed exchanges.

use std::time::Duration;

use crate::config::RequestConfig;
use crate::http::WireRequest;
use crate::response::AdapterResponse;

/// Boxed underlying cause (capability, URL parser or body decoder error).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No usable URL or method could be formed. Raised before any I/O.
    Configuration,
    /// The capability failed without producing a response, or the body
    /// stream broke while being read.
    Network,
    /// The deadline elapsed before the capability produced a response.
    Timeout,
    /// A response arrived with a status outside `200..300`.
    BadStatus,
    /// The body did not decode as its declared content type.
    Decode,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "ERR_INVALID_URL",
            ErrorKind::Network => "ERR_NETWORK",
            ErrorKind::Timeout => "ETIMEDOUT",
            ErrorKind::BadStatus => "ERR_BAD_RESPONSE",
            ErrorKind::Decode => "ERR_BAD_DECODE",
        }
    }
}

/// Error returned by `Adapter::call`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AdapterError {
    kind: ErrorKind,
    code: &'static str,
    message: String,
    config: Box<RequestConfig>,
    request: Option<Box<WireRequest>>,
    response: Option<Box<AdapterResponse>>,
    #[source]
    source: Option<BoxError>,
}

impl AdapterError {
    pub(crate) fn configuration(
        config: &RequestConfig,
        message: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            code: ErrorKind::Configuration.code(),
            message: message.into(),
            config: Box::new(config.clone()),
            request: None,
            response: None,
            source,
        }
    }

    pub(crate) fn invalid_method(config: &RequestConfig, source: BoxError) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            code: "ERR_BAD_OPTION_VALUE",
            message: format!("Invalid method: {}", config.method),
            config: Box::new(config.clone()),
            request: None,
            response: None,
            source: Some(source),
        }
    }

    pub(crate) fn network(config: &RequestConfig, request: &WireRequest, source: BoxError) -> Self {
        Self {
            kind: ErrorKind::Network,
            code: ErrorKind::Network.code(),
            message: format!("An error occurred while making the request. Error: {source}"),
            config: Box::new(config.clone()),
            request: Some(Box::new(request.clone())),
            response: None,
            source: Some(source),
        }
    }

    pub(crate) fn timeout(config: &RequestConfig, request: &WireRequest, deadline: Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            code: ErrorKind::Timeout.code(),
            message: format!("timeout of {}ms exceeded", deadline.as_millis()),
            config: Box::new(config.clone()),
            request: Some(Box::new(request.clone())),
            response: None,
            source: None,
        }
    }

    /// The headers arrived but the body did not before the deadline.
    pub(crate) fn body_timeout(response: AdapterResponse, deadline: Duration) -> Self {
        Self {
            kind: ErrorKind::Timeout,
            code: ErrorKind::Timeout.code(),
            message: format!("timeout of {}ms exceeded", deadline.as_millis()),
            config: Box::new(response.config.clone()),
            request: Some(Box::new(response.request.clone())),
            response: Some(Box::new(response)),
            source: None,
        }
    }

    /// The response arrived but its body could not be read.
    pub(crate) fn interrupted(response: AdapterResponse, source: BoxError) -> Self {
        Self {
            kind: ErrorKind::Network,
            code: ErrorKind::Network.code(),
            message: format!("An error occurred while reading the response body. Error: {source}"),
            config: Box::new(response.config.clone()),
            request: Some(Box::new(response.request.clone())),
            response: Some(Box::new(response)),
            source: Some(source),
        }
    }

    pub(crate) fn bad_status(response: AdapterResponse) -> Self {
        Self {
            kind: ErrorKind::BadStatus,
            code: ErrorKind::BadStatus.code(),
            message: format!("Request failed with status code {}", response.status),
            config: Box::new(response.config.clone()),
            request: Some(Box::new(response.request.clone())),
            response: Some(Box::new(response)),
            source: None,
        }
    }

    pub(crate) fn decode(response: AdapterResponse, source: BoxError) -> Self {
        Self {
            kind: ErrorKind::Decode,
            code: ErrorKind::Decode.code(),
            message: format!("Failed to decode response body: {source}"),
            config: Box::new(response.config.clone()),
            request: Some(Box::new(response.request.clone())),
            response: Some(Box::new(response)),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Machine-readable code. Usually the kind's code; a rejected method
    /// reports `ERR_BAD_OPTION_VALUE`.
    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// The request as issued. `None` only for configuration errors.
    pub fn request(&self) -> Option<&WireRequest> {
        self.request.as_deref()
    }

    /// The response received before failing, if any.
    pub fn response(&self) -> Option<&AdapterResponse> {
        self.response.as_deref()
    }

    pub fn into_response(self) -> Option<AdapterResponse> {
        self.response.map(|r| *r)
    }

    /// Status of the received response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    pub fn response_received(&self) -> bool {
        self.response.is_some()
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ErrorKind::Timeout
    }
}
