//! SSE (Server-Sent Events) stream decoding
//!
//! The backend streams newline-delimited text where each event line looks like
//! `data: {json}`. Decoding happens in three layers:
//! - `line_buffer` - splits raw body bytes into complete lines, holding at most
//!   one partial line between reads
//! - `parser` - classifies lines (`SseLine`) and turns `data: ` lines into JSON
//!   values (`EventDecoder`)
//! - `events` - optional typed view (`BackendEvent`) over a decoded value

mod events;
mod line_buffer;
mod parser;

pub use events::BackendEvent;
pub use line_buffer::LineBuffer;
pub use parser::{parse_sse_line, EventDecoder, LineOutcome, SseLine, DATA_PREFIX};
