//! Incremental line splitting over a chunked byte body.

use std::borrow::Cow;

/// Accumulates body bytes and hands back complete lines.
///
/// Bytes are held rather than text, so a multi-byte UTF-8 sequence split
/// across two reads decodes exactly as if it had arrived in one. After every
/// [`push`](LineBuffer::push) the buffer holds at most one partial line.
///
/// That partial line is unbounded: a body that never sends a newline grows
/// the buffer until the stream ends. Invalid UTF-8 is replaced with U+FFFD.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed, without terminators.
    /// Both `\n` and `\r\n` end a line.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let scan_from = self.pending.len();
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        for (offset, byte) in self.pending[scan_from..].iter().enumerate() {
            if *byte == b'\n' {
                let end = scan_from + offset;
                lines.push(decode_line(&self.pending[start..end]));
                start = end + 1;
            }
        }

        if start > 0 {
            self.pending.drain(..start);
        }
        lines
    }

    /// Flush the trailing unterminated line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let line = decode_line(&self.pending);
        self.pending.clear();
        Some(line)
    }

    /// Number of bytes waiting for a line terminator.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    match String::from_utf8_lossy(raw) {
        Cow::Borrowed(line) => line.to_string(),
        Cow::Owned(line) => {
            tracing::debug!("Replaced invalid UTF-8 in a {} byte stream line", raw.len());
            line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_all(input: &[u8], at: usize) -> Vec<String> {
        let mut buffer = LineBuffer::new();
        let mut lines = buffer.push(&input[..at]);
        lines.extend(buffer.push(&input[at..]));
        lines.extend(buffer.finish());
        lines
    }

    #[test]
    fn test_single_chunk() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"data: {\"x\":1}\n\ndata: {\"y\":2}\n");
        assert_eq!(lines, vec!["data: {\"x\":1}", "", "data: {\"y\":2}"]);
        assert_eq!(buffer.pending_len(), 0);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn test_partial_line_held_until_terminated() {
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(b"data: {\"x\"").is_empty());
        assert_eq!(buffer.pending_len(), 10);
        assert_eq!(buffer.push(b":1}\ndata"), vec!["data: {\"x\":1}"]);
        assert_eq!(buffer.pending_len(), 4);
        assert_eq!(buffer.finish(), Some("data".to_string()));
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buffer = LineBuffer::new();
        let lines = buffer.push(b"data: {\"x\":\"\xff\"}\nok\n");
        assert_eq!(lines, vec!["data: {\"x\":\"\u{FFFD}\"}", "ok"]);
    }

    #[test]
    fn test_crlf_terminators() {
        let mut buffer = LineBuffer::new();
        assert_eq!(buffer.push(b"a\r\nb\r"), vec!["a"]);
        assert_eq!(buffer.push(b"\nc"), vec!["b"]);
        assert_eq!(buffer.finish(), Some("c".to_string()));
    }

    #[test]
    fn test_every_split_point_gives_same_lines() {
        let input = "data: {\"text\":\"héllo ✓\"}\r\n: keepalive\n\ndata: {\"n\":2}\ntail".as_bytes();
        let expected = split_all(input, input.len());
        assert_eq!(expected.len(), 5);
        for at in 0..=input.len() {
            assert_eq!(split_all(input, at), expected, "split at byte {}", at);
        }
    }

    #[test]
    fn test_utf8_sequence_split_across_reads() {
        let input = "data: \"✓\"\n".as_bytes();
        // The check mark is three bytes starting right after `data: "`
        let mid = "data: \"".len() + 1;
        let mut buffer = LineBuffer::new();
        assert!(buffer.push(&input[..mid]).is_empty());
        assert_eq!(buffer.push(&input[mid..]), vec!["data: \"✓\""]);
    }

    #[test]
    fn test_byte_at_a_time() {
        let input = b"one\ntwo\n";
        let mut buffer = LineBuffer::new();
        let mut lines = Vec::new();
        for byte in input.iter() {
            lines.extend(buffer.push(std::slice::from_ref(byte)));
            assert!(buffer.pending_len() <= 3);
        }
        assert_eq!(lines, vec!["one", "two"]);
    }
}
