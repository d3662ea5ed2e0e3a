//! Transport backend abstraction
//!
//! The protocol client speaks to the wire exclusively through the
//! [`HttpBackend`] trait: one call, one response, transport failures
//! surfaced as [`ClientError::Transport`] and never swallowed. Two adapters
//! ship with the crate — [`ReqwestBackend`] wraps a blocking `reqwest`
//! client (single execute-style call) and [`CurlBackend`] drives a
//! `curl::easy::Easy` handle in its stateful configure-then-send style. The
//! orchestrator never branches on which adapter is in use.

mod curl;
mod reqwest;

use std::time::Duration;

use bytes::Bytes;
use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};

use crate::{ClientError, Result};

pub use self::curl::CurlBackend;
pub use self::reqwest::ReqwestBackend;

/// Shared adapter configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("sparql-protocol-client/{}", crate::VERSION),
        }
    }
}

/// A fully shaped HTTP request, backend-neutral.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl BackendRequest {
    pub fn get(uri: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            uri: uri.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(uri: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: Method::POST,
            uri: uri.into(),
            headers: HeaderMap::new(),
            body: Some(body.into()),
        }
    }

    /// Set a header, consuming and returning the request.
    pub fn header(mut self, name: HeaderName, value: &str) -> Result<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Transport(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// The response as reported by a transport backend.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BackendResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The `Location` header, when present and valid UTF-8.
    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION).and_then(|v| v.to_str().ok())
    }

    /// The raw `Content-Type` header value, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// The body as text, lossily decoded.
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Capability contract every transport adapter satisfies.
///
/// Implementations must fail with [`ClientError::Transport`] on
/// network-level failure (DNS, connection refused, timeout) and must not
/// follow redirects themselves — redirect policy belongs to the
/// orchestrator.
pub trait HttpBackend {
    fn execute(&self, request: &BackendRequest) -> Result<BackendResponse>;
}

/// Construct a boxed adapter by name. Unknown names fail with
/// [`ClientError::UnsupportedBackend`].
pub fn backend_for(name: &str) -> Result<Box<dyn HttpBackend>> {
    match name {
        "reqwest" => Ok(Box::new(ReqwestBackend::new(BackendConfig::default())?)),
        "curl" => Ok(Box::new(CurlBackend::new(BackendConfig::default()))),
        other => Err(ClientError::UnsupportedBackend(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_for_known_names() {
        assert!(backend_for("reqwest").is_ok());
        assert!(backend_for("curl").is_ok());
    }

    #[test]
    fn test_backend_for_unknown_name() {
        let result = backend_for("gopher");
        assert!(matches!(
            result,
            Err(ClientError::UnsupportedBackend(name)) if name == "gopher"
        ));
    }

    #[test]
    fn test_response_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("http://elsewhere/"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/turtle; charset=utf-8"),
        );
        let response = BackendResponse {
            status: StatusCode::SEE_OTHER,
            headers,
            body: Bytes::from_static(b"moved"),
        };
        assert!(!response.is_success());
        assert_eq!(response.location(), Some("http://elsewhere/"));
        assert_eq!(response.content_type(), Some("text/turtle; charset=utf-8"));
        assert_eq!(response.body_text(), "moved");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("location"),
            HeaderValue::from_static("http://x/"),
        );
        let response = BackendResponse {
            status: StatusCode::FOUND,
            headers,
            body: Bytes::new(),
        };
        // HeaderMap normalizes names, so `Location` and `location` agree.
        assert_eq!(response.location(), Some("http://x/"));
    }
}
