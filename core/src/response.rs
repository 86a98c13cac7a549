//! Normalized response and body decoding.

use serde::de::DeserializeOwned;

use crate::config::RequestConfig;
use crate::error::BoxError;
use crate::http::{Headers, WireRequest};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    /// Body of a response whose content type contains `application/json`.
    Json(serde_json::Value),
    /// Body of any other response, as UTF-8 text.
    Text(String),
    /// Zero-length body.
    Empty,
}

impl ResponseData {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// The response handed back to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResponse {
    pub status: u16,
    pub status_text: String,
    pub data: ResponseData,
    /// Response headers; names are lower-cased.
    pub headers: Headers,
    pub config: RequestConfig,
    pub request: WireRequest,
}

impl AdapterResponse {
    pub fn is_success(&self) -> bool {
        is_success(self.status)
    }

    /// Deserializes the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.data {
            ResponseData::Json(value) => serde_json::from_value(value.clone()),
            ResponseData::Text(text) => serde_json::from_str(text),
            ResponseData::Empty => serde_json::from_str(""),
        }
    }
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub(crate) fn is_json(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
}

/// Decodes `body` according to the response content type.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<ResponseData, BoxError> {
    if body.is_empty() {
        return Ok(ResponseData::Empty);
    }
    if is_json(content_type) {
        Ok(ResponseData::Json(serde_json::from_slice(body)?))
    } else {
        Ok(ResponseData::Text(String::from_utf8(body.to_vec())?))
    }
}

/// Best-effort text view of a body that failed to decode.
pub(crate) fn lossy_text(body: &[u8]) -> ResponseData {
    if body.is_empty() {
        ResponseData::Empty
    } else {
        ResponseData::Text(String::from_utf8_lossy(body).into_owned())
    }
}
