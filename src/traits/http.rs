//! HTTP client trait abstraction.
//!
//! Provides a trait-based abstraction for HTTP operations, enabling
//! dependency injection and mocking in tests. Responses keep their body as a
//! byte stream so the same type serves both JSON and SSE endpoints.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;

use crate::error::ClientResult;

/// HTTP headers represented as a key-value map.
pub type Headers = HashMap<String, String>;

/// Incrementally readable response body.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, HttpError>> + Send>>;

/// HTTP method used by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully resolved HTTP request, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request without headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }
}

/// HTTP response wrapper.
///
/// The body is optional: a transport may legitimately hand back a response
/// with nothing to read, which the stream consumer treats as a terminal error.
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lowercase names)
    pub headers: Headers,
    body: Option<ByteStream>,
}

impl Response {
    /// Create a response whose body is a single chunk.
    pub fn new(status: u16, body: Bytes) -> Self {
        Self::from_chunks(status, vec![body])
    }

    /// Create a response whose body is delivered as the given chunks, in order.
    pub fn from_chunks(status: u16, chunks: Vec<Bytes>) -> Self {
        let stream = futures::stream::iter(chunks.into_iter().map(Ok));
        Self::from_stream(status, Headers::new(), Box::pin(stream))
    }

    /// Create a response backed by an arbitrary byte stream.
    pub fn from_stream(status: u16, headers: Headers, body: ByteStream) -> Self {
        Self {
            status,
            headers,
            body: Some(body),
        }
    }

    /// Create a response that has no readable body.
    pub fn without_body(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Replace the response headers.
    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Check if the response indicates success (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check for a 4xx status.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check for a 5xx status.
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Take the body stream out of the response, leaving it body-less.
    pub fn take_body(&mut self) -> Option<ByteStream> {
        self.body.take()
    }

    /// Read the whole body into memory. A missing body reads as empty.
    pub async fn bytes(mut self) -> Result<Bytes, HttpError> {
        let Some(mut body) = self.body.take() else {
            return Ok(Bytes::new());
        };
        let mut buf = BytesMut::new();
        while let Some(chunk) = body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Get the response body as a string, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String, HttpError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Parse the response body as JSON.
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> ClientResult<T> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// HTTP client errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpError {
    /// Connection failed
    ConnectionFailed(String),
    /// Request timeout
    Timeout(String),
    /// Request was cancelled
    Cancelled,
    /// IO error while reading or writing the body
    Io(String),
    /// Invalid URL
    InvalidUrl(String),
    /// Other error
    Other(String),
}

impl HttpError {
    /// Transport failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HttpError::ConnectionFailed(_)
                | HttpError::Timeout(_)
                | HttpError::Io(_)
                | HttpError::Other(_)
        )
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::ConnectionFailed(_) => "E_NET_CONN",
            HttpError::Timeout(_) => "E_NET_TIMEOUT",
            HttpError::Cancelled => "E_NET_CANCEL",
            HttpError::Io(_) => "E_NET_IO",
            HttpError::InvalidUrl(_) => "E_NET_URL",
            HttpError::Other(_) => "E_NET_OTHER",
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            HttpError::Timeout(msg) => write!(f, "Request timeout: {}", msg),
            HttpError::Cancelled => write!(f, "Request cancelled"),
            HttpError::Io(msg) => write!(f, "IO error: {}", msg),
            HttpError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            HttpError::Other(msg) => write!(f, "HTTP error: {}", msg),
        }
    }
}

impl std::error::Error for HttpError {}

/// Trait for HTTP transports.
///
/// Implementations perform exactly one network exchange per call; retrying is
/// the caller's concern. Non-2xx statuses are returned as `Ok(Response)`.
///
/// # Example
///
/// ```ignore
/// use sandbox_client::traits::{HttpClient, Headers, HttpError};
///
/// async fn fetch<C: HttpClient>(client: &C) -> Result<String, HttpError> {
///     client.get("http://localhost:8000/health", &Headers::new()).await?.text().await
/// }
/// ```
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a single request.
    async fn execute(&self, request: HttpRequest) -> Result<Response, HttpError>;

    /// Perform a GET request.
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        let mut request = HttpRequest::new(Method::Get, url);
        request.headers = headers.clone();
        self.execute(request).await
    }

    /// Perform a POST request.
    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        let mut request = HttpRequest::new(Method::Post, url);
        request.headers = headers.clone();
        request.body = Some(body.to_string());
        self.execute(request).await
    }
}
