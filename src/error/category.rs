//! Error category classification for unified error handling.
//!
//! Categories give callers one place to decide on retries and messaging
//! without matching on every concrete error variant.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Transport failures (connection refused, DNS, read errors).
    /// Retried by the client up to the configured limit.
    Network,

    /// Backend returned a 5xx status or reported a failure in its body.
    Server,

    /// Request rejected by the backend (4xx) or built incorrectly.
    /// Never retried.
    Client,

    /// Problems decoding or reading an event stream.
    Stream,

    /// Invalid or missing configuration values.
    Configuration,

    /// The caller cancelled the operation.
    Cancelled,
}

impl ErrorCategory {
    /// Returns true if errors in this category are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Stream => "stream",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Cancelled => "cancelled",
        }
    }

    /// Returns suggested recovery actions for this category.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Check that the backend is reachable and try again",
            ErrorCategory::Server => "The backend may be experiencing issues. Please try again later",
            ErrorCategory::Client => "Check the request parameters and try again",
            ErrorCategory::Stream => "The event stream was interrupted. Please retry the operation",
            ErrorCategory::Configuration => "Check the SANDBOX_* environment variables",
            ErrorCategory::Cancelled => "The operation was cancelled",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::Stream.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
        assert!(!ErrorCategory::Cancelled.is_retryable());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
        assert_eq!(format!("{}", ErrorCategory::Configuration), "configuration");
    }

    #[test]
    fn test_category_recovery_hint() {
        assert!(ErrorCategory::Configuration.recovery_hint().contains("SANDBOX_"));
        assert!(ErrorCategory::Server.recovery_hint().contains("try again"));
    }
}
