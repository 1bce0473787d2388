//! Streaming request client.
//!
//! [`StreamingClient`] sends a [`RequestDescriptor`] to the configured backend,
//! retrying transport failures and 5xx responses with exponential backoff, and
//! decodes SSE bodies into events for a [`StreamHandler`].

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::request::RequestDescriptor;
use crate::retry::AttemptOutcome;
use crate::stream::{event_stream, EventStream, StreamConsumer, StreamHandler, StreamState};
use crate::traits::{HttpClient, Response};

/// Client for the sandbox backend.
///
/// Holds only immutable configuration and a shared transport, so one instance
/// can serve any number of concurrent requests. Every call gets its own
/// attempt counter and line buffer.
///
/// ```ignore
/// let client = StreamingClient::new(ClientConfig::from_env()?)?;
/// let response = client.send(&RequestDescriptor::get("/health")).await?;
/// ```
pub struct StreamingClient<C: HttpClient = ReqwestHttpClient> {
    config: Arc<ClientConfig>,
    transport: Arc<C>,
}

impl<C: HttpClient> Clone for StreamingClient<C> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<C: HttpClient> std::fmt::Debug for StreamingClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl StreamingClient<ReqwestHttpClient> {
    /// Create a client over the production reqwest transport.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        Ok(Self::with_transport(config, ReqwestHttpClient::new()))
    }

    /// Create a client configured from `SANDBOX_*` environment variables.
    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<C: HttpClient> StreamingClient<C> {
    /// Create a client over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: C) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    pub fn with_shared_transport(config: ClientConfig, transport: Arc<C>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// Send a request, retrying per the configured policy.
    ///
    /// 4xx responses come back on the first attempt. When retries run out on a
    /// 5xx the last response is returned as `Ok`; when they run out on a
    /// transport failure the error carries the number of attempts made.
    pub async fn send(&self, descriptor: &RequestDescriptor) -> ClientResult<Response> {
        self.send_with_cancel(descriptor, &CancellationToken::new())
            .await
    }

    /// [`send`](Self::send), abandoning the in-flight attempt or backoff
    /// sleep as soon as `cancel` fires.
    pub async fn send_with_cancel(
        &self,
        descriptor: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ClientResult<Response> {
        let request = descriptor.into_http_request(&self.config.base_url)?;
        let span = tracing::debug_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method,
            url = %request.url,
        );

        async move {
            let policy = &self.config.retry;
            let max_attempts = policy.max_attempts();
            let mut attempt: u32 = 0;

            loop {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Request cancelled during attempt {}", attempt + 1);
                        return Err(ClientError::Cancelled);
                    }
                    result = self.transport.execute(request.clone()) => result,
                };

                let outcome = AttemptOutcome::of(&result);
                match &result {
                    Ok(response) => tracing::debug!(
                        "Attempt {}/{}: HTTP {}",
                        attempt + 1,
                        max_attempts,
                        response.status
                    ),
                    Err(err) => tracing::warn!(
                        "Attempt {}/{} failed: {}",
                        attempt + 1,
                        max_attempts,
                        err
                    ),
                }

                if outcome == AttemptOutcome::Cancelled {
                    return Err(ClientError::Cancelled);
                }

                if !policy.should_retry(attempt, outcome) {
                    return result.map_err(|error| ClientError::Http {
                        error,
                        attempts: attempt + 1,
                    });
                }

                // Release the failed response before sleeping
                drop(result);

                let delay = policy.delay_for(attempt);
                tracing::info!(
                    "Retrying in {:?} (attempt {} of {})",
                    delay,
                    attempt + 2,
                    max_attempts
                );
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Request cancelled during backoff");
                        return Err(ClientError::Cancelled);
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
        .instrument(span)
        .await
    }

    /// A fresh decoder honouring the configured malformed-line limit.
    pub fn stream_consumer(&self) -> StreamConsumer {
        StreamConsumer::new(self.config.max_malformed_lines)
    }

    /// Decode `response` as an SSE body, feeding events to `handler`.
    ///
    /// Does not call `on_complete`.
    pub async fn consume_stream<H>(&self, response: Response, handler: &mut H) -> StreamState
    where
        H: StreamHandler + ?Sized,
    {
        self.consume_stream_with_cancel(response, handler, &CancellationToken::new())
            .await
    }

    pub async fn consume_stream_with_cancel<H>(
        &self,
        response: Response,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> StreamState
    where
        H: StreamHandler + ?Sized,
    {
        self.stream_consumer().run(response, handler, cancel).await
    }

    /// Pull-based alternative to [`consume_stream`](Self::consume_stream).
    pub fn event_stream(&self, response: Response) -> EventStream {
        event_stream(response, self.config.max_malformed_lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::retry::RetryPolicy;
    use crate::stream::CollectingHandler;
    use crate::traits::HttpError;
    use bytes::Bytes;
    use serde_json::json;
    use std::time::Duration;

    const BASE: &str = "http://sandbox.test";

    fn client_with(retry: RetryPolicy) -> StreamingClient<MockHttpClient> {
        let config = ClientConfig::default()
            .with_base_url(BASE)
            .with_retry(retry);
        StreamingClient::with_transport(config, MockHttpClient::new())
    }

    fn fast_retry(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1), 2.0)
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let client = client_with(fast_retry(3));
        let url = format!("{}/health", BASE);
        client
            .transport()
            .push_response(&url, MockResponse::json(200, json!({"status": "ok"})));

        let response = client.send(&RequestDescriptor::get("/health")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.transport().request_count(&url), 1);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let client = client_with(fast_retry(3));
        let url = format!("{}/api/sandbox-status", BASE);
        client.transport().set_response(&url, MockResponse::status(404));

        let response = client
            .send(&RequestDescriptor::get("/api/sandbox-status"))
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(client.transport().request_count(&url), 1);
    }

    #[tokio::test]
    async fn test_server_error_retried_until_success() {
        let client = client_with(fast_retry(3));
        let url = format!("{}/health", BASE);
        client.transport().push_response(&url, MockResponse::status(503));
        client.transport().push_response(&url, MockResponse::status(502));
        client.transport().push_response(&url, MockResponse::status(200));

        let response = client.send(&RequestDescriptor::get("/health")).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(client.transport().request_count(&url), 3);
    }

    #[tokio::test]
    async fn test_exhausted_server_error_returns_last_response() {
        let client = client_with(fast_retry(2));
        let url = format!("{}/health", BASE);
        client
            .transport()
            .set_response(&url, MockResponse::Body(500, Bytes::from("boom")));

        let response = client.send(&RequestDescriptor::get("/health")).await.unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.text().await.unwrap(), "boom");
        assert_eq!(client.transport().request_count(&url), 3);
    }

    #[tokio::test]
    async fn test_exhausted_transport_error_reports_attempts() {
        let client = client_with(fast_retry(2));
        let url = format!("{}/health", BASE);
        client.transport().set_response(
            &url,
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );

        let err = client
            .send(&RequestDescriptor::get("/health"))
            .await
            .unwrap_err();
        match err {
            ClientError::Http { error, attempts } => {
                assert_eq!(attempts, 3);
                assert_eq!(error, HttpError::ConnectionFailed("refused".to_string()));
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_url_not_retried() {
        let client = client_with(fast_retry(3));
        let url = format!("{}/health", BASE);
        client.transport().set_response(
            &url,
            MockResponse::Error(HttpError::InvalidUrl("bad".to_string())),
        );

        let err = client
            .send(&RequestDescriptor::get("/health"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Http { attempts: 1, .. }));
        assert_eq!(client.transport().request_count(&url), 1);
    }

    #[tokio::test]
    async fn test_relative_path_rejected_before_sending() {
        let client = client_with(fast_retry(3));
        let err = client
            .send(&RequestDescriptor::get("health"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
        assert!(client.transport().get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_backoff_stops_retries() {
        let client = client_with(RetryPolicy::new(5, Duration::from_secs(60), 2.0));
        let url = format!("{}/health", BASE);
        client.transport().set_response(&url, MockResponse::status(503));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client
            .send_with_cancel(&RequestDescriptor::get("/health"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert_eq!(client.transport().request_count(&url), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_makes_no_attempt() {
        let client = client_with(fast_retry(3));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .send_with_cancel(&RequestDescriptor::get("/health"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
        assert!(client.transport().get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_sends_are_independent() {
        let client = client_with(fast_retry(2));
        let flaky = format!("{}/api/sandbox-logs", BASE);
        let healthy = format!("{}/health", BASE);
        client.transport().set_response(&flaky, MockResponse::status(503));
        client.transport().set_response(&healthy, MockResponse::status(200));

        let mut tasks = Vec::new();
        for i in 0..8 {
            let client = client.clone();
            let path = if i % 2 == 0 { "/api/sandbox-logs" } else { "/health" };
            tasks.push(tokio::spawn(async move {
                client.send(&RequestDescriptor::get(path)).await.unwrap().status
            }));
        }

        let mut statuses = Vec::new();
        for task in tasks {
            statuses.push(task.await.unwrap());
        }
        assert_eq!(statuses.iter().filter(|s| **s == 503).count(), 4);
        assert_eq!(statuses.iter().filter(|s| **s == 200).count(), 4);
        // Each flaky call made its own three attempts
        assert_eq!(client.transport().request_count(&flaky), 12);
        assert_eq!(client.transport().request_count(&healthy), 4);
    }

    #[tokio::test]
    async fn test_consume_stream_uses_configured_limit() {
        let config = ClientConfig::default()
            .with_base_url(BASE)
            .with_max_malformed_lines(Some(0));
        let client = StreamingClient::with_transport(config, MockHttpClient::new());

        let response = Response::new(200, Bytes::from("data: oops\ndata: {\"x\":1}\n"));
        let mut handler = CollectingHandler::new();
        let state = client.consume_stream(response, &mut handler).await;

        assert_eq!(state, StreamState::Errored);
        assert_eq!(handler.errors.len(), 1);
        assert!(handler.events.is_empty());
    }
}
