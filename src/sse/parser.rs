//! Line classification and event decoding.

use serde_json::Value;

use crate::error::StreamError;

/// Exact prefix that marks an event line.
pub const DATA_PREFIX: &str = "data: ";

/// A single classified line from an SSE body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// `data: <payload>`
    Data(String),
    /// `event: <name>`
    Event(String),
    /// `:<text>` keep-alive or comment
    Comment(String),
    /// Blank separator line
    Empty,
    /// Anything else, including `data:` without the space
    Other(String),
}

/// Parse a single SSE line into its component type
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(payload) = line.strip_prefix(DATA_PREFIX) {
        return SseLine::Data(payload.to_string());
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    if let Some(rest) = line.strip_prefix("event:") {
        return SseLine::Event(rest.trim().to_string());
    }

    SseLine::Other(line.to_string())
}

/// What one line contributed to the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// A `data: ` line whose payload decoded as JSON
    Event(Value),
    /// Not an event line
    Skipped,
    /// A `data: ` line whose payload is not JSON; carries the parse error
    Malformed(String),
}

/// Turns lines into events and tracks malformed input.
///
/// With no limit set, malformed lines are reported and decoding carries on
/// forever. With `Some(n)`, the `n + 1`th consecutive malformed line is a
/// terminal [`StreamError::TooManyMalformed`]. Any successfully decoded event
/// resets the run.
#[derive(Debug, Default)]
pub struct EventDecoder {
    max_malformed: Option<u32>,
    consecutive_malformed: u32,
    malformed_total: u64,
    events_total: u64,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_malformed(mut self, limit: Option<u32>) -> Self {
        self.max_malformed = limit;
        self
    }

    /// Decode one complete line.
    pub fn decode_line(&mut self, line: &str) -> Result<LineOutcome, StreamError> {
        let SseLine::Data(payload) = parse_sse_line(line) else {
            return Ok(LineOutcome::Skipped);
        };

        match serde_json::from_str::<Value>(&payload) {
            Ok(value) => {
                self.consecutive_malformed = 0;
                self.events_total += 1;
                Ok(LineOutcome::Event(value))
            }
            Err(e) => {
                self.consecutive_malformed = self.consecutive_malformed.saturating_add(1);
                self.malformed_total += 1;
                let reason = e.to_string();
                match self.max_malformed {
                    Some(limit) if self.consecutive_malformed > limit => {
                        Err(StreamError::TooManyMalformed {
                            count: self.consecutive_malformed,
                            last_error: reason,
                        })
                    }
                    _ => Ok(LineOutcome::Malformed(reason)),
                }
            }
        }
    }

    /// Events decoded so far.
    pub fn events_decoded(&self) -> u64 {
        self.events_total
    }

    /// Malformed `data: ` lines seen so far.
    pub fn malformed_lines(&self) -> u64 {
        self.malformed_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_empty_line() {
        assert_eq!(parse_sse_line(""), SseLine::Empty);
    }

    #[test]
    fn test_parse_data_line_requires_space() {
        assert_eq!(
            parse_sse_line("data: {\"text\": \"hello\"}"),
            SseLine::Data("{\"text\": \"hello\"}".to_string())
        );
        assert_eq!(
            parse_sse_line("data:{\"x\":1}"),
            SseLine::Other("data:{\"x\":1}".to_string())
        );
    }

    #[test]
    fn test_parse_comment_and_event_lines() {
        assert_eq!(
            parse_sse_line(": keep-alive"),
            SseLine::Comment("keep-alive".to_string())
        );
        assert_eq!(
            parse_sse_line("event:   status  "),
            SseLine::Event("status".to_string())
        );
        assert_eq!(
            parse_sse_line("retry: 1000"),
            SseLine::Other("retry: 1000".to_string())
        );
    }

    #[test]
    fn test_decode_valid_event() {
        let mut decoder = EventDecoder::new();
        assert_eq!(
            decoder.decode_line(r#"data: {"x":1}"#).unwrap(),
            LineOutcome::Event(json!({"x": 1}))
        );
        assert_eq!(decoder.events_decoded(), 1);
    }

    #[test]
    fn test_decode_malformed_is_reported_not_fatal() {
        let mut decoder = EventDecoder::new();
        for _ in 0..100 {
            assert!(matches!(
                decoder.decode_line("data: {bad}").unwrap(),
                LineOutcome::Malformed(_)
            ));
        }
        assert_eq!(decoder.malformed_lines(), 100);
        assert_eq!(decoder.events_decoded(), 0);
    }

    #[test]
    fn test_decode_non_data_lines_skipped() {
        let mut decoder = EventDecoder::new();
        for line in ["", ": ping", "event: status", "data:{\"x\":1}", "garbage"] {
            assert_eq!(decoder.decode_line(line).unwrap(), LineOutcome::Skipped);
        }
        assert_eq!(decoder.malformed_lines(), 0);
    }

    #[test]
    fn test_malformed_limit_counts_consecutive_lines() {
        let mut decoder = EventDecoder::new().with_max_malformed(Some(2));
        assert!(decoder.decode_line("data: nope").is_ok());
        assert!(decoder.decode_line("data: nope").is_ok());
        // A good event resets the run
        assert!(decoder.decode_line(r#"data: {"ok":true}"#).is_ok());
        assert!(decoder.decode_line("data: nope").is_ok());
        assert!(decoder.decode_line("data: nope").is_ok());

        match decoder.decode_line("data: nope") {
            Err(StreamError::TooManyMalformed { count, .. }) => assert_eq!(count, 3),
            other => panic!("Expected TooManyMalformed, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_limit_aborts_on_first_malformed() {
        let mut decoder = EventDecoder::new().with_max_malformed(Some(0));
        assert!(decoder.decode_line("data: {bad}").is_err());
    }
}
