//! Structured results handed across the client boundary.

use serde::Serialize;

use crate::error::ClientResult;
use crate::stream::StreamState;

/// Success flag, optional payload, optional human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiOutcome<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiOutcome<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn with_data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

impl<T> From<ClientResult<T>> for ApiOutcome<T> {
    fn from(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => ApiOutcome::ok(data),
            Err(err) => ApiOutcome::failed(err.user_message()),
        }
    }
}

/// What a streamed request produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamSummary {
    pub state: StreamState,
    pub events: u64,
    pub malformed_lines: u64,
}

impl StreamSummary {
    /// Summary of a stream that never got as far as reading a body.
    pub fn not_started() -> Self {
        Self {
            state: StreamState::NotStarted,
            events: 0,
            malformed_lines: 0,
        }
    }
}
