//! Unified error type for the sandbox client.
//!
//! `ClientError` consolidates transport, status, stream and configuration
//! failures so callers can categorize and report them uniformly.

use std::fmt;

use super::category::ErrorCategory;
use super::stream::StreamError;
use crate::config::ConfigError;
use crate::traits::HttpError;

/// Unified error type for client operations.
#[derive(Debug)]
pub enum ClientError {
    /// Transport failure that survived every retry attempt.
    Http { error: HttpError, attempts: u32 },

    /// Backend answered with a non-success HTTP status.
    Status { status: u16, message: String },

    /// Backend answered 2xx but reported `"success": false` in the body.
    Backend { message: String },

    /// Stream processing failed.
    Stream(StreamError),

    /// Response body could not be decoded.
    Json(serde_json::Error),

    /// The request descriptor could not be turned into a valid request.
    InvalidRequest(String),

    /// Configuration could not be loaded.
    Config(ConfigError),

    /// The caller cancelled the operation.
    Cancelled,
}

impl ClientError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Http { error, .. } => match error {
                HttpError::Cancelled => ErrorCategory::Cancelled,
                HttpError::InvalidUrl(_) => ErrorCategory::Client,
                _ => ErrorCategory::Network,
            },
            ClientError::Status { status, .. } if *status >= 500 => ErrorCategory::Server,
            ClientError::Status { .. } => ErrorCategory::Client,
            ClientError::Backend { .. } => ErrorCategory::Server,
            ClientError::Stream(_) | ClientError::Json(_) => ErrorCategory::Stream,
            ClientError::InvalidRequest(_) => ErrorCategory::Client,
            ClientError::Config(_) => ErrorCategory::Configuration,
            ClientError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Check if the failed operation could succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Http { error, .. } => error.is_retryable(),
            ClientError::Status { status, .. } => *status >= 500,
            ClientError::Stream(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Http { error, attempts } => {
                let base = match error {
                    HttpError::ConnectionFailed(_) => {
                        "Unable to connect to the backend.".to_string()
                    }
                    HttpError::Timeout(_) => "The request to the backend timed out.".to_string(),
                    HttpError::Cancelled => "The request was cancelled.".to_string(),
                    HttpError::InvalidUrl(url) => format!("Invalid backend URL: {}", url),
                    other => format!("Network error: {}", other),
                };
                if *attempts > 1 {
                    format!("{} (gave up after {} attempts)", base, attempts)
                } else {
                    base
                }
            }
            ClientError::Status { status, message } => match *status {
                400 => format!("The request was invalid: {}", message),
                404 => format!("Not found: {}", message),
                429 => "Too many requests. Please wait a moment and try again.".to_string(),
                500..=599 => format!("The backend is experiencing issues: {}", message),
                _ => format!("The backend returned HTTP {}: {}", status, message),
            },
            ClientError::Backend { message } => message.clone(),
            ClientError::Stream(err) => err.user_message(),
            ClientError::Json(_) => "Received an invalid response from the backend.".to_string(),
            ClientError::InvalidRequest(msg) => format!("Invalid request: {}", msg),
            ClientError::Config(err) => format!("Configuration error: {}", err),
            ClientError::Cancelled => "The operation was cancelled.".to_string(),
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Http { error, .. } => error.error_code(),
            ClientError::Status { .. } => "E_HTTP_STATUS",
            ClientError::Backend { .. } => "E_BACKEND",
            ClientError::Stream(err) => err.error_code(),
            ClientError::Json(_) => "E_JSON",
            ClientError::InvalidRequest(_) => "E_REQUEST",
            ClientError::Config(_) => "E_CONFIG",
            ClientError::Cancelled => "E_CANCELLED",
        }
    }

    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Stream(StreamError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http { error, attempts } => {
                write!(f, "{} (after {} attempt(s))", error, attempts)
            }
            ClientError::Status { status, message } => {
                write!(f, "Server error ({}): {}", status, message)
            }
            ClientError::Backend { message } => write!(f, "Backend error: {}", message),
            ClientError::Stream(err) => write!(f, "Stream error: {}", err),
            ClientError::Json(err) => write!(f, "JSON error: {}", err),
            ClientError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ClientError::Config(err) => write!(f, "Configuration error: {}", err),
            ClientError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Http { error, .. } => Some(error),
            ClientError::Stream(err) => Some(err),
            ClientError::Json(err) => Some(err),
            ClientError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HttpError> for ClientError {
    fn from(error: HttpError) -> Self {
        match error {
            HttpError::Cancelled => ClientError::Cancelled,
            error => ClientError::Http { error, attempts: 1 },
        }
    }
}

impl From<StreamError> for ClientError {
    fn from(err: StreamError) -> Self {
        ClientError::Stream(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err)
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        ClientError::Config(err)
    }
}
