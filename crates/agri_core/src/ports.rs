//! crates/agri_core/src/ports.rs
//!
//! Defines the contracts the core consumes from the outside world.
//! The HTTP transport is the only one: request signing, base URL resolution,
//! timeouts and the wire itself all live behind [`HttpTransport`].

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::query_key::QueryParams;

//=========================================================================================
// Port Error Types
//=========================================================================================

/// A network or HTTP failure reported by the transport.
///
/// Cloneable so one failed request can be reported to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Network failure: {0}")]
    Network(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Response body is not JSON: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Network(_) | TransportError::Timeout => true,
            TransportError::Status { status, .. } => *status >= 500 || *status == 429,
            TransportError::Unauthorized | TransportError::Decode(_) => false,
        }
    }
}

/// Misuse of a context or cache handle. Always a wiring bug, never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("{0} was read outside of its provider")]
    MissingProvider(&'static str),
    #[error("cache entry {key} holds a value of a different type")]
    TypeMismatch { key: String },
    #[error("query {0} is disabled")]
    Disabled(String),
}

/// A convenience type alias for transport results.
pub type TransportResult<T> = Result<T, TransportError>;

//=========================================================================================
// HTTP Transport Port
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        })
    }
}

/// One request against the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub params: QueryParams,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: QueryParams::new(),
            body: None,
        }
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends JSON requests and returns the decoded JSON body of 2xx responses.
///
/// Non-2xx statuses and network failures come back as [`TransportError`]. The
/// transport never interprets the body beyond decoding it.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn request(&self, request: HttpRequest) -> TransportResult<Value>;

    async fn get(&self, path: &str, params: QueryParams) -> TransportResult<Value> {
        self.request(HttpRequest::new(Method::Get, path).with_params(params))
            .await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> TransportResult<Value> {
        let mut request = HttpRequest::new(Method::Post, path);
        request.body = body;
        self.request(request).await
    }

    async fn patch(&self, path: &str, body: Value) -> TransportResult<Value> {
        self.request(HttpRequest::new(Method::Patch, path).with_body(body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable_client_errors_are_not() {
        let status = |status| TransportError::Status {
            status,
            body: String::new(),
        };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!TransportError::Unauthorized.is_retryable());
        assert!(TransportError::Timeout.is_retryable());
    }
}
