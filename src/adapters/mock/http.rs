//! Mock HTTP client for testing.
//!
//! Provides a scriptable transport that replays queued responses per URL and
//! records every request it receives, including when it arrived.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::traits::{Headers, HttpClient, HttpError, HttpRequest, Method, Response};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<String>,
    /// When the transport saw the request
    pub at: Instant,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Status plus a single-chunk body
    Body(u16, Bytes),
    /// Status plus a body delivered in the given chunks
    Chunks(u16, Vec<Bytes>),
    /// Status with no readable body
    NoBody(u16),
    /// Status, some chunks, then a read failure
    BrokenStream(u16, Vec<Bytes>, HttpError),
    /// Transport failure before any response
    Error(HttpError),
}

impl MockResponse {
    /// JSON body with the given status.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Body(status, Bytes::from(value.to_string()))
    }

    /// Plain status with an empty body.
    pub fn status(status: u16) -> Self {
        MockResponse::Body(status, Bytes::new())
    }

    fn into_result(self) -> Result<Response, HttpError> {
        match self {
            MockResponse::Body(status, body) => Ok(Response::new(status, body)),
            MockResponse::Chunks(status, chunks) => Ok(Response::from_chunks(status, chunks)),
            MockResponse::NoBody(status) => Ok(Response::without_body(status)),
            MockResponse::BrokenStream(status, chunks, err) => {
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(err)))
                    .collect::<Vec<_>>();
                Ok(Response::from_stream(
                    status,
                    Headers::new(),
                    Box::pin(futures::stream::iter(items)),
                ))
            }
            MockResponse::Error(err) => Err(err),
        }
    }
}

/// Mock HTTP client for testing.
///
/// Resolution order for a URL: the next queued response for that exact URL,
/// then a fixed response (exact match, then prefix match), then the default.
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.push_response("http://x/api", MockResponse::status(503));
/// client.push_response("http://x/api", MockResponse::json(200, json!({"ok": true})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// One-shot responses consumed in order
    queued: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Responses returned every time
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a one-shot response for a specific URL.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a response returned for every request to a URL (or URL prefix).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *self.default_response.lock().unwrap() = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests made to an exact URL.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url == url)
            .count()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn record_request(&self, request: &HttpRequest) {
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            at: Instant::now(),
        });
    }

    fn next_response(&self, url: &str) -> Option<MockResponse> {
        if let Some(queue) = self.queued.lock().unwrap().get_mut(url) {
            if let Some(response) = queue.pop_front() {
                return Some(response);
            }
        }

        let responses = self.responses.lock().unwrap();
        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }
        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        self.default_response.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<Response, HttpError> {
        self.record_request(&request);

        match self.next_response(&request.url) {
            Some(response) => response.into_result(),
            None => Err(HttpError::Other(format!(
                "No mock response for URL: {}",
                request.url
            ))),
        }
    }
}
