//! Drives a response body through the SSE decoder.

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::error::StreamError;
use crate::sse::{EventDecoder, LineBuffer, LineOutcome};
use crate::stream::StreamHandler;
use crate::traits::{ByteStream, HttpError, Response};

/// Longest slice of a malformed line that makes it into the logs.
const LOGGED_LINE_LIMIT: usize = 200;

/// Lifecycle of one stream consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    #[default]
    NotStarted,
    Reading,
    /// Body exhausted normally
    Ended,
    /// Missing body, transport failure or too many malformed lines
    Errored,
    /// Caller cancelled; the reader was dropped
    Cancelled,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamState::Ended | StreamState::Errored | StreamState::Cancelled
        )
    }
}

/// Per-invocation decoding state. Never shared between streams.
#[derive(Debug, Default)]
pub struct StreamConsumer {
    buffer: LineBuffer,
    decoder: EventDecoder,
    state: StreamState,
    last_error: Option<StreamError>,
}

impl StreamConsumer {
    pub fn new(max_malformed: Option<u32>) -> Self {
        Self {
            buffer: LineBuffer::new(),
            decoder: EventDecoder::new().with_max_malformed(max_malformed),
            state: StreamState::NotStarted,
            last_error: None,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn events_decoded(&self) -> u64 {
        self.decoder.events_decoded()
    }

    pub fn malformed_lines(&self) -> u64 {
        self.decoder.malformed_lines()
    }

    /// The terminal error handed to the handler, if the stream errored.
    pub fn last_error(&self) -> Option<&StreamError> {
        self.last_error.as_ref()
    }

    /// Read `response` to the end, feeding events to `handler`.
    ///
    /// Terminal failures reach `handler.on_error` exactly once. Cancellation
    /// drops the body reader and reports nothing to the handler.
    pub async fn run<H>(
        &mut self,
        mut response: Response,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> StreamState
    where
        H: StreamHandler + ?Sized,
    {
        let Some(mut body) = response.take_body() else {
            tracing::warn!("Stream response (HTTP {}) has no body", response.status);
            return self.fail(handler, StreamError::MissingBody);
        };

        self.state = StreamState::Reading;
        tracing::debug!("Reading stream body (HTTP {})", response.status);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(
                        "Stream cancelled after {} events",
                        self.decoder.events_decoded()
                    );
                    self.state = StreamState::Cancelled;
                    return self.state;
                }
                chunk = body.next() => chunk,
            };

            match next {
                Some(Ok(chunk)) => {
                    for line in self.buffer.push(&chunk) {
                        if let Err(err) = self.handle_line(&line, handler) {
                            return self.fail(handler, err);
                        }
                    }
                }
                Some(Err(HttpError::Cancelled)) => {
                    tracing::debug!("Stream cancelled by transport");
                    self.state = StreamState::Cancelled;
                    return self.state;
                }
                Some(Err(err)) => {
                    tracing::warn!("Stream read failed: {}", err);
                    return self.fail(handler, StreamError::Transport(err));
                }
                None => {
                    if let Some(line) = self.buffer.finish() {
                        if let Err(err) = self.handle_line(&line, handler) {
                            return self.fail(handler, err);
                        }
                    }
                    tracing::debug!(
                        "Stream ended: {} events, {} malformed lines",
                        self.decoder.events_decoded(),
                        self.decoder.malformed_lines()
                    );
                    self.state = StreamState::Ended;
                    return self.state;
                }
            }
        }
    }

    fn handle_line<H>(&mut self, line: &str, handler: &mut H) -> Result<(), StreamError>
    where
        H: StreamHandler + ?Sized,
    {
        match self.decoder.decode_line(line)? {
            LineOutcome::Event(event) => handler.on_progress(event),
            LineOutcome::Malformed(reason) => log_malformed(line, &reason),
            LineOutcome::Skipped => {}
        }
        Ok(())
    }

    fn fail<H>(&mut self, handler: &mut H, error: StreamError) -> StreamState
    where
        H: StreamHandler + ?Sized,
    {
        handler.on_error(error.clone());
        self.last_error = Some(error);
        self.state = StreamState::Errored;
        self.state
    }
}

fn log_malformed(line: &str, reason: &str) {
    let shown: String = line.chars().take(LOGGED_LINE_LIMIT).collect();
    tracing::warn!("Skipping malformed stream line ({}): {}", reason, shown);
}

/// Consume `response` into `handler` with a fresh [`StreamConsumer`].
pub async fn consume_stream<H>(
    response: Response,
    handler: &mut H,
    max_malformed: Option<u32>,
    cancel: &CancellationToken,
) -> StreamState
where
    H: StreamHandler + ?Sized,
{
    StreamConsumer::new(max_malformed)
        .run(response, handler, cancel)
        .await
}

/// Pull-based stream of decoded events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<Value, StreamError>> + Send>>;

struct PullState {
    body: Option<ByteStream>,
    buffer: LineBuffer,
    decoder: EventDecoder,
    lines: VecDeque<String>,
    finished: bool,
}

/// Expose the same decoding as a `Stream`. Malformed lines are logged and
/// skipped; a terminal error is yielded once and then the stream ends.
pub fn event_stream(mut response: Response, max_malformed: Option<u32>) -> EventStream {
    let state = PullState {
        body: response.take_body(),
        buffer: LineBuffer::new(),
        decoder: EventDecoder::new().with_max_malformed(max_malformed),
        lines: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            // First, drain complete lines already split off the body
            while let Some(line) = state.lines.pop_front() {
                match state.decoder.decode_line(&line) {
                    Ok(LineOutcome::Event(event)) => return Some((Ok(event), state)),
                    Ok(LineOutcome::Malformed(reason)) => log_malformed(&line, &reason),
                    Ok(LineOutcome::Skipped) => {}
                    Err(err) => {
                        state.lines.clear();
                        state.body = None;
                        state.finished = true;
                        return Some((Err(err), state));
                    }
                }
            }

            if state.finished {
                return None;
            }

            let Some(body) = state.body.as_mut() else {
                state.finished = true;
                return Some((Err(StreamError::MissingBody), state));
            };

            let next = body.next().await;
            match next {
                Some(Ok(chunk)) => {
                    let lines = state.buffer.push(&chunk);
                    state.lines.extend(lines);
                }
                Some(Err(HttpError::Cancelled)) => {
                    state.body = None;
                    state.finished = true;
                }
                Some(Err(err)) => {
                    state.body = None;
                    state.finished = true;
                    return Some((Err(StreamError::Transport(err)), state));
                }
                None => {
                    state.body = None;
                    state.finished = true;
                    state.lines.extend(state.buffer.finish());
                }
            }
        }
    }))
}
