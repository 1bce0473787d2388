//! Streaming-related error types.
//!
//! Errors raised while reading an SSE response body. Malformed lines are not
//! errors (they are logged and skipped); only terminal conditions live here.

use std::fmt;

use crate::traits::HttpError;

/// Terminal stream failures delivered to `StreamHandler::on_error`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamError {
    /// The response had no readable body.
    MissingBody,

    /// The transport failed while reading the body.
    Transport(HttpError),

    /// Too many consecutive lines failed to decode as JSON.
    TooManyMalformed {
        count: u32,
        last_error: String,
    },

    /// The backend answered a streaming request with a non-2xx status.
    Rejected {
        status: u16,
        message: String,
    },
    /// The request could not be built or sent; nothing was streamed.
    Request(String),
}

impl StreamError {
    /// Check if retrying the whole request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            StreamError::Transport(err) => err.is_retryable(),
            StreamError::Rejected { status, .. } => *status >= 500,
            StreamError::MissingBody
            | StreamError::TooManyMalformed { .. }
            | StreamError::Request(_) => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            StreamError::MissingBody => "The server response contained no data stream.".to_string(),
            StreamError::Transport(_) => {
                "Connection to the server was lost while streaming.".to_string()
            }
            StreamError::TooManyMalformed { count, .. } => {
                format!("Received {} unreadable messages in a row from the server.", count)
            }
            StreamError::Rejected { status, message } => {
                format!("The server rejected the request (HTTP {}): {}", status, message)
            }
            StreamError::Request(message) => message.clone(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            StreamError::MissingBody => "E_STREAM_NOBODY",
            StreamError::Transport(_) => "E_STREAM_CONN",
            StreamError::TooManyMalformed { .. } => "E_STREAM_JSON",
            StreamError::Rejected { .. } => "E_STREAM_STATUS",
            StreamError::Request(_) => "E_STREAM_REQUEST",
        }
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::MissingBody => write!(f, "No response body"),
            StreamError::Transport(err) => write!(f, "Stream read failed: {}", err),
            StreamError::TooManyMalformed { count, last_error } => {
                write!(f, "{} consecutive malformed lines (last: {})", count, last_error)
            }
            StreamError::Rejected { status, message } => {
                write!(f, "Stream rejected with HTTP {}: {}", status, message)
            }
            StreamError::Request(message) => write!(f, "Stream request failed: {}", message),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Transport(err) => Some(err),
            _ => None,
        }
    }
}
