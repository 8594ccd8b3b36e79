//! HTTP Transport Abstraction
//!
//! A single-exchange transport seam: one request in, one response (or
//! transport failure) out. Retry, timeout ownership, and response
//! classification live above this trait in `core-api`; implementations only
//! move bytes.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::Result;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// A fully-resolved HTTP exchange: final URL, final headers, raw body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    /// Transport-level ceiling for the exchange. Callers that own their own
    /// cancellation signal (the request engine) leave this unset.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }
}

/// An HTTP response as the transport saw it: status, headers, raw bytes.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    /// Look up a response header, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Response body as UTF-8 text, lossily decoded.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP transport trait
///
/// Platform implementations (desktop: reqwest; mobile hosts: native stacks)
/// perform exactly one exchange per call. They must:
/// - Send the request verbatim (no header injection, no redirect to auth)
/// - Report failures without a response as
///   [`crate::error::BridgeError::Timeout`] or
///   [`crate::error::BridgeError::Connection`] so callers can classify them
/// - Never retry; the request engine owns the retry schedule
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute a single HTTP exchange.
    ///
    /// # Errors
    ///
    /// Returns an error only when no HTTP response was obtained (connection
    /// failure, TLS failure, transport-level timeout). A non-2xx status is
    /// NOT an error at this layer.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_headers_and_timeout() {
        let request = HttpRequest::new(HttpMethod::Get, "https://example.com")
            .header("User-Agent", "test")
            .timeout(Duration::from_secs(30));

        assert_eq!(request.url, "https://example.com");
        assert_eq!(request.headers.get("User-Agent"), Some(&"test".to_string()));
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Retry-After".to_string(), "2".to_string());
        let response = HttpResponse {
            status: 429,
            headers,
            body: Bytes::new(),
        };

        assert_eq!(response.header("retry-after"), Some("2"));
        assert_eq!(response.header("RETRY-AFTER"), Some("2"));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn response_status_checks() {
        let response = HttpResponse {
            status: 204,
            headers: HashMap::new(),
            body: Bytes::new(),
        };

        assert!(response.is_success());
    }
}
