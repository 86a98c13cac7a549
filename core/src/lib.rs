//! Adapter that plugs any fetch-shaped request function into an HTTP client.
//!
//! # Overview
//! The caller supplies a [`Fetch`] capability (URL + options in, response
//! with status, headers and a body reader out). [`fetch_adapter`] wraps it
//! into an [`Adapter`]: given a client [`RequestConfig`] it performs one
//! request/response cycle and returns either a normalized
//! [`AdapterResponse`] or a classified [`AdapterError`].
//!
//! # Design
//! - The capability is injected at construction; there is no global client.
//! - Invocations share nothing except the capability itself.
//! - Response headers are captured before the body is consumed. The
//!   `FetchResponse` trait makes the reverse order impossible.
//! - Bodies are decoded eagerly, as JSON when the content type says so and as
//!   text otherwise, on both the success and the failure path.
//! - No retries, caching or pooling happen here; those belong to the
//!   capability or to the client.

pub mod adapter;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod response;

pub use adapter::{fetch_adapter, Adapter, FetchAdapter, DEFAULT_TIMEOUT};
pub use config::RequestConfig;
pub use error::{AdapterError, BoxError, ErrorKind};
pub use fetch::{Fetch, FetchResponse};
pub use http::{BufferedResponse, Credentials, Headers, HttpMethod, RequestInit, WireRequest};
pub use response::{AdapterResponse, ResponseData};
