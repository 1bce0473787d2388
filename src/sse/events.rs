//! Typed view over backend progress events.
//!
//! The backend tags every event with a `type` field. Decoding stays
//! value-based (`serde_json::Value`) so unknown shapes never break a stream;
//! this enum is a convenience for callers that want to match on known kinds.

use serde::Deserialize;
use serde_json::Value;

/// Known backend event kinds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BackendEvent {
    Start {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        packages: Vec<String>,
    },
    Status {
        #[serde(default)]
        message: String,
    },
    Step {
        #[serde(default)]
        step: Option<f64>,
        #[serde(default)]
        message: Option<String>,
    },
    /// Raw generated text
    Stream {
        #[serde(default)]
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    FileProgress {
        #[serde(default)]
        current: u64,
        #[serde(default)]
        total: u64,
        #[serde(default)]
        file_name: String,
        #[serde(default)]
        action: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    FileComplete {
        #[serde(default)]
        file_name: String,
        #[serde(default)]
        action: Option<String>,
    },
    Info {
        #[serde(default)]
        message: String,
    },
    Output {
        #[serde(default)]
        message: String,
    },
    Success {
        #[serde(default)]
        message: String,
    },
    Warning {
        #[serde(default)]
        message: String,
    },
    Error {
        #[serde(default)]
        message: String,
    },
    Cleanup {
        #[serde(default)]
        message: Option<String>,
    },
    /// Terminal event; the rest of the payload varies by endpoint
    Complete {
        #[serde(default)]
        message: Option<String>,
    },
    /// Missing, unknown or ill-shaped `type`
    #[serde(skip)]
    Other { kind: Option<String> },
}

impl BackendEvent {
    /// Interpret a decoded event. Never fails.
    pub fn from_value(value: &Value) -> Self {
        BackendEvent::deserialize(value).unwrap_or_else(|_| BackendEvent::Other {
            kind: value
                .get("type")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    /// The `type` tag as sent on the wire.
    pub fn kind(&self) -> Option<&str> {
        Some(match self {
            BackendEvent::Start { .. } => "start",
            BackendEvent::Status { .. } => "status",
            BackendEvent::Step { .. } => "step",
            BackendEvent::Stream { .. } => "stream",
            BackendEvent::FileProgress { .. } => "file-progress",
            BackendEvent::FileComplete { .. } => "file-complete",
            BackendEvent::Info { .. } => "info",
            BackendEvent::Output { .. } => "output",
            BackendEvent::Success { .. } => "success",
            BackendEvent::Warning { .. } => "warning",
            BackendEvent::Error { .. } => "error",
            BackendEvent::Cleanup { .. } => "cleanup",
            BackendEvent::Complete { .. } => "complete",
            BackendEvent::Other { kind } => return kind.as_deref(),
        })
    }

    /// Human-readable message carried by the event, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            BackendEvent::Status { message }
            | BackendEvent::Info { message }
            | BackendEvent::Output { message }
            | BackendEvent::Success { message }
            | BackendEvent::Warning { message }
            | BackendEvent::Error { message } => Some(message.as_str()),
            BackendEvent::Start { message, .. }
            | BackendEvent::Step { message, .. }
            | BackendEvent::Cleanup { message }
            | BackendEvent::Complete { message } => message.as_deref(),
            BackendEvent::Stream { text } => Some(text.as_str()),
            BackendEvent::FileProgress { file_name, .. }
            | BackendEvent::FileComplete { file_name, .. } => Some(file_name.as_str()),
            BackendEvent::Other { .. } => None,
        }
    }

    /// `complete` or `error`: the backend will send nothing useful after this.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BackendEvent::Complete { .. } | BackendEvent::Error { .. }
        )
    }
}
