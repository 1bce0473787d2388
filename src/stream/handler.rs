//! Receivers for decoded stream events.

use serde_json::Value;
use tokio::sync::mpsc;

use crate::error::StreamError;

/// Caller-supplied sink for a streamed response.
///
/// `on_progress` is called once per decoded event, in wire order.
/// `on_error` is called at most once, for a terminal failure.
/// `on_complete` is not called by the stream consumer itself; callers that
/// wrap a whole request (see `SandboxApi::stream_request`) signal it once the
/// stream has ended cleanly.
pub trait StreamHandler: Send {
    fn on_progress(&mut self, event: Value);

    fn on_error(&mut self, error: StreamError);

    fn on_complete(&mut self) {}
}

type ProgressFn = Box<dyn FnMut(Value) + Send>;
type ErrorFn = Box<dyn FnMut(StreamError) + Send>;
type CompleteFn = Box<dyn FnMut() + Send>;

/// Handler built from closures.
///
/// ```ignore
/// let handler = CallbackHandler::new(
///     |event| println!("{}", event),
///     |err| eprintln!("stream failed: {}", err),
/// )
/// .with_complete(|| println!("done"));
/// ```
pub struct CallbackHandler {
    progress: ProgressFn,
    error: ErrorFn,
    complete: Option<CompleteFn>,
}

impl CallbackHandler {
    pub fn new<P, E>(progress: P, error: E) -> Self
    where
        P: FnMut(Value) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
    {
        Self {
            progress: Box::new(progress),
            error: Box::new(error),
            complete: None,
        }
    }

    pub fn with_complete<C>(mut self, complete: C) -> Self
    where
        C: FnMut() + Send + 'static,
    {
        self.complete = Some(Box::new(complete));
        self
    }
}

impl std::fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackHandler")
            .field("has_complete", &self.complete.is_some())
            .finish()
    }
}

impl StreamHandler for CallbackHandler {
    fn on_progress(&mut self, event: Value) {
        (self.progress)(event)
    }

    fn on_error(&mut self, error: StreamError) {
        (self.error)(error)
    }

    fn on_complete(&mut self) {
        if let Some(complete) = self.complete.as_mut() {
            complete()
        }
    }
}

/// Update forwarded by [`ChannelHandler`].
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Progress(Value),
    Error(StreamError),
    Complete,
}

/// Forwards every callback over an unbounded channel, so a stream can be
/// consumed on one task and observed on another.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
    tx: mpsc::UnboundedSender<StreamUpdate>,
}

impl ChannelHandler {
    pub fn new(tx: mpsc::UnboundedSender<StreamUpdate>) -> Self {
        Self { tx }
    }

    /// Create a handler together with its receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn forward(&self, update: StreamUpdate) {
        // Receiver gone means nobody is listening any more
        if self.tx.send(update).is_err() {
            tracing::debug!("Stream update dropped: receiver closed");
        }
    }
}

impl StreamHandler for ChannelHandler {
    fn on_progress(&mut self, event: Value) {
        self.forward(StreamUpdate::Progress(event));
    }

    fn on_error(&mut self, error: StreamError) {
        self.forward(StreamUpdate::Error(error));
    }

    fn on_complete(&mut self) {
        self.forward(StreamUpdate::Complete);
    }
}

/// Accumulates everything it is given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectingHandler {
    pub events: Vec<Value>,
    pub errors: Vec<StreamError>,
    pub completions: u32,
}

impl CollectingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.completions > 0
    }
}

impl StreamHandler for CollectingHandler {
    fn on_progress(&mut self, event: Value) {
        self.events.push(event);
    }

    fn on_error(&mut self, error: StreamError) {
        self.errors.push(error);
    }

    fn on_complete(&mut self) {
        self.completions += 1;
    }
}
