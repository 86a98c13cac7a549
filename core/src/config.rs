//! Request configuration as supplied by the consuming client.
//!
//! # Design
//! `RequestConfig` mirrors the client's JSON config shape (`url`, `baseURL`,
//! `params`, `withCredentials`, ...) so it can be deserialized directly. It is
//! never mutated by the adapter; `wire_request` derives the read-only
//! `WireRequest` from it once per invocation.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AdapterError;
use crate::http::{Credentials, Headers, HttpMethod, RequestInit, WireRequest};

/// One request as described by the consuming client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Method token, case-insensitive. Empty means GET.
    pub method: String,
    /// Path relative to `base_url`, or an absolute URL.
    pub url: Option<String>,
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    /// Query parameters. A key may repeat; every pair is appended.
    #[serde(deserialize_with = "entries::params")]
    pub params: Vec<(String, String)>,
    /// Request headers. `None` values are never sent.
    #[serde(deserialize_with = "entries::headers")]
    pub headers: Vec<(String, Option<String>)>,
    /// Opaque body, passed through untouched.
    pub data: Option<Bytes>,
    #[serde(rename = "withCredentials")]
    pub with_credentials: bool,
    /// Overrides the adapter's deadline for this request.
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method.as_str().to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), Some(value.into())));
        self
    }

    /// Records `name` with an absent value, suppressing any earlier entry.
    pub fn unset_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push((name.into(), None));
        self
    }

    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.with_credentials = with_credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn http_method(&self) -> Result<HttpMethod, AdapterError> {
        if self.method.trim().is_empty() {
            return Ok(HttpMethod::Get);
        }
        self.method
            .trim()
            .parse()
            .map_err(|e| AdapterError::invalid_method(self, Box::new(e)))
    }

    /// Resolves `url` against `base_url` and appends `params` to the query.
    pub fn resolve_url(&self) -> Result<Url, AdapterError> {
        let path = self.url.as_deref().unwrap_or("").trim();
        let base = self.base_url.as_deref().unwrap_or("").trim();
        if path.is_empty() && base.is_empty() {
            return Err(AdapterError::configuration(
                self,
                "Invalid URL: neither url nor baseURL is set",
                None,
            ));
        }

        let mut url = if base.is_empty() {
            Url::parse(path).map_err(|e| {
                AdapterError::configuration(self, format!("Invalid URL: {path}"), Some(Box::new(e)))
            })?
        } else {
            let base_url = Url::parse(base).map_err(|e| {
                AdapterError::configuration(self, format!("Invalid base URL: {base}"), Some(Box::new(e)))
            })?;
            base_url.join(path).map_err(|e| {
                AdapterError::configuration(self, format!("Invalid URL: {path}"), Some(Box::new(e)))
            })?
        };

        if !self.params.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.params {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Headers as they go on the wire: absent values dropped, repeated names
    /// resolved last-write-wins.
    pub fn wire_headers(&self) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in &self.headers {
            match value {
                Some(value) => headers.insert(name.as_str(), value.as_str()),
                None => {
                    headers.remove(name);
                }
            }
        }
        headers
    }

    pub fn credentials(&self) -> Credentials {
        if self.with_credentials {
            Credentials::Include
        } else {
            Credentials::SameOrigin
        }
    }

    /// Builds the request to issue. Fails only with configuration errors.
    pub fn wire_request(&self) -> Result<WireRequest, AdapterError> {
        let url = self.resolve_url()?;
        let init = RequestInit {
            method: self.http_method()?,
            headers: self.wire_headers(),
            body: self.data.clone(),
            credentials: self.credentials(),
        };
        Ok(WireRequest::new(url, init))
    }
}

/// `params` and `headers` arrive either as a JSON object or as an array of
/// `[key, value]` pairs. The pairs form is the only way to repeat a key.
mod entries {
    use std::fmt;

    use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
    use serde_json::Value;

    pub fn params<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, String)>, D::Error> {
        let mut params = Vec::new();
        for (key, value) in deserializer.deserialize_any(EntriesVisitor)? {
            push_param(&mut params, key, value);
        }
        Ok(params)
    }

    pub fn headers<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<(String, Option<String>)>, D::Error> {
        let entries = deserializer.deserialize_any(EntriesVisitor)?;
        Ok(entries
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::Null => None,
                    Value::Array(items) => Some(items.iter().map(scalar).collect::<Vec<_>>().join(", ")),
                    other => Some(scalar(&other)),
                };
                (name, value)
            })
            .collect())
    }

    /// Arrays expand to one pair per element; nulls are skipped.
    fn push_param(params: &mut Vec<(String, String)>, key: String, value: Value) {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    push_param(params, key.clone(), item);
                }
            }
            other => params.push((key, scalar(&other))),
        }
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, Value)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object or an array of [key, value] pairs")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Value>()? {
                entries.push(entry);
            }
            Ok(entries)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(entry) = seq.next_element::<(String, Value)>()? {
                entries.push(entry);
            }
            Ok(entries)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn relative_path_joins_base() {
        let config = RequestConfig::new("/users/1").with_base_url("https://dummyjson.com");
        assert_eq!(config.resolve_url().unwrap().as_str(), "https://dummyjson.com/users/1");
    }

    #[test]
    fn absolute_url_replaces_base() {
        let config = RequestConfig::new("https://other.example/x").with_base_url("https://dummyjson.com");
        assert_eq!(config.resolve_url().unwrap().as_str(), "https://other.example/x");
    }

    #[test]
    fn base_alone_is_a_url() {
        let config = RequestConfig {
            base_url: Some("https://example.com/search".to_string()),
            ..RequestConfig::default()
        }
        .param("q", "John");
        assert_eq!(config.resolve_url().unwrap().as_str(), "https://example.com/search?q=John");
    }

    #[test]
    fn repeated_params_are_appended() {
        let config = RequestConfig::new("https://example.com/search")
            .param("tag", "a")
            .param("tag", "b");
        assert_eq!(
            config.resolve_url().unwrap().as_str(),
            "https://example.com/search?tag=a&tag=b"
        );
    }

    #[test]
    fn params_are_encoded() {
        let config = RequestConfig::new("https://example.com/search?page=2").param("q name", "a&b=c");
        assert_eq!(
            config.resolve_url().unwrap().as_str(),
            "https://example.com/search?page=2&q+name=a%26b%3Dc"
        );
    }

    #[test]
    fn empty_url_and_base_is_configuration_error() {
        let err = RequestConfig::default().resolve_url().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.request().is_none());
    }

    #[test]
    fn relative_path_without_base_is_configuration_error() {
        let err = RequestConfig::new("users/1").resolve_url().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn absent_header_values_are_dropped() {
        let config = RequestConfig::new("/")
            .unset_header("Authorization")
            .header("X-Id", "5");
        let headers = config.wire_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.iter().next(), Some(("X-Id", "5")));
    }

    #[test]
    fn later_header_wins() {
        let config = RequestConfig::new("/")
            .header("Accept", "text/plain")
            .header("accept", "application/json")
            .header("X-Trace", "1")
            .unset_header("x-trace");
        let headers = config.wire_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("ACCEPT"), Some("application/json"));
    }

    #[test]
    fn method_defaults_to_get_and_rejects_unknown() {
        assert_eq!(RequestConfig::new("/").http_method().unwrap(), HttpMethod::Get);
        let config = RequestConfig {
            method: "post".to_string(),
            ..RequestConfig::new("/")
        };
        assert_eq!(config.http_method().unwrap(), HttpMethod::Post);
        let config = RequestConfig {
            method: "BREW".to_string(),
            ..RequestConfig::new("/")
        };
        let err = config.http_method().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.code(), "ERR_BAD_OPTION_VALUE");
    }

    #[test]
    fn deserializes_client_shape() {
        let config: RequestConfig = serde_json::from_str(
            r#"{
                "method": "get",
                "url": "/users/1",
                "baseURL": "https://dummyjson.com",
                "params": {"q": "John"},
                "headers": {"Authorization": null, "X-Id": "5"},
                "withCredentials": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://dummyjson.com"));
        assert!(config.with_credentials);
        assert_eq!(config.credentials(), Credentials::Include);
        assert_eq!(config.params, vec![("q".to_string(), "John".to_string())]);
        assert_eq!(config.headers[0], ("Authorization".to_string(), None));
        let headers = config.wire_headers();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("x-id"), Some("5"));
        assert!(config.timeout.is_none());
        assert_eq!(
            config.resolve_url().unwrap().as_str(),
            "https://dummyjson.com/users/1?q=John"
        );
    }

    #[test]
    fn pairs_shape_keeps_repeated_keys() {
        let config: RequestConfig = serde_json::from_str(
            r#"{
                "url": "https://example.com/search",
                "params": [["tag", "a"], ["tag", "b"]],
                "headers": [["Accept", "text/plain"], ["accept", "application/json"]]
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.resolve_url().unwrap().as_str(),
            "https://example.com/search?tag=a&tag=b"
        );
        assert_eq!(config.wire_headers().get("Accept"), Some("application/json"));
    }

    #[test]
    fn param_values_are_stringified() {
        let config: RequestConfig = serde_json::from_str(
            r#"{
                "url": "https://example.com/search",
                "params": {"page": 2, "tag": ["a", "b"], "draft": false, "skip": null},
                "headers": {"X-Retry": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(
            config.resolve_url().unwrap().as_str(),
            "https://example.com/search?page=2&tag=a&tag=b&draft=false"
        );
        assert_eq!(config.wire_headers().get("x-retry"), Some("3"));
    }

    #[test]
    fn null_params_and_headers_are_empty() {
        let config: RequestConfig =
            serde_json::from_str(r#"{"url": "https://example.com/", "params": null, "headers": null}"#).unwrap();
        assert!(config.params.is_empty());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn scalar_params_are_rejected() {
        let result = serde_json::from_str::<RequestConfig>(r#"{"url": "/", "params": "q=John"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn wire_request_passes_body_through() {
        let config = RequestConfig::new("https://example.com/echo")
            .with_method(HttpMethod::Post)
            .with_data(&b"\x00raw"[..]);
        let request = config.wire_request().unwrap();
        assert_eq!(request.method(), HttpMethod::Post);
        assert_eq!(request.body().map(|b| b.as_ref()), Some(&b"\x00raw"[..]));
        assert_eq!(request.credentials(), Credentials::SameOrigin);
    }
}
