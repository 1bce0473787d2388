//! Common test utilities for integration tests.
//!
//! Builders for clients pointed at a [`MockHttpClient`] or a live wiremock
//! server, plus SSE body helpers.
//!
//! # Example
//!
//! ```ignore
//! let server = MockServer::start().await;
//! let api = wiremock_api(&server);
//! ```

#![allow(dead_code, unused_imports)]

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use wiremock::MockServer;

pub use sandbox_client::adapters::mock::{MockHttpClient, MockResponse, RecordedRequest};

use sandbox_client::api::SandboxApi;
use sandbox_client::client::StreamingClient;
use sandbox_client::config::ClientConfig;
use sandbox_client::retry::RetryPolicy;

/// Base URL used with the mock transport.
pub const MOCK_BASE: &str = "http://sandbox.test";

/// Retry policy with short delays so tests stay fast.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries, Duration::from_millis(10), 2.0)
}

/// Client over a fresh mock transport.
pub fn mock_client(retry: RetryPolicy) -> StreamingClient<MockHttpClient> {
    let config = ClientConfig::default()
        .with_base_url(MOCK_BASE)
        .with_retry(retry);
    StreamingClient::with_transport(config, MockHttpClient::new())
}

/// Full URL for a path on the mock base.
pub fn mock_url(path: &str) -> String {
    format!("{}{}", MOCK_BASE, path)
}

/// Production client pointed at a wiremock server.
pub fn wiremock_client(server: &MockServer, retry: RetryPolicy) -> StreamingClient {
    let config = ClientConfig::default()
        .with_base_url(server.uri())
        .with_retry(retry);
    StreamingClient::new(config).expect("wiremock uri is a valid base url")
}

/// Sandbox API over a wiremock server with retries disabled.
pub fn wiremock_api(server: &MockServer) -> SandboxApi {
    SandboxApi::new(wiremock_client(server, RetryPolicy::no_retry()))
}

/// Encode events as an SSE body, one `data:` line plus a blank line each.
pub fn sse_body(events: &[Value]) -> String {
    events
        .iter()
        .map(|event| format!("data: {}\n\n", event))
        .collect()
}

/// Split a body into chunks of at most `size` bytes.
pub fn chunked(body: &str, size: usize) -> Vec<Bytes> {
    body.as_bytes()
        .chunks(size)
        .map(Bytes::copy_from_slice)
        .collect()
}
