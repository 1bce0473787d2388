//! Streamed response consumption
//!
//! - `handler` - the [`StreamHandler`] seam and its stock implementations
//! - `consumer` - [`StreamConsumer`] push-based decoding and the pull-based
//!   [`event_stream`]

mod consumer;
mod handler;

pub use consumer::{consume_stream, event_stream, EventStream, StreamConsumer, StreamState};
pub use handler::{CallbackHandler, ChannelHandler, CollectingHandler, StreamHandler, StreamUpdate};
