//! Client configuration.
//!
//! Everything the client needs to know about its environment: where the
//! backend lives, how long callers should wait for each class of request, and
//! how aggressively to retry. Values come from `SANDBOX_*` environment
//! variables or the `with_*` builder methods.

use std::time::Duration;
use thiserror::Error;

use crate::retry::RetryPolicy;

/// Backend URL used when `SANDBOX_API_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

pub const ENV_BASE_URL: &str = "SANDBOX_API_URL";
pub const ENV_TIMEOUT_MS: &str = "SANDBOX_API_TIMEOUT_MS";
pub const ENV_STREAM_TIMEOUT_MS: &str = "SANDBOX_STREAM_TIMEOUT_MS";
pub const ENV_OPERATION_TIMEOUT_MS: &str = "SANDBOX_OPERATION_TIMEOUT_MS";
pub const ENV_RETRIES: &str = "SANDBOX_API_RETRIES";
pub const ENV_RETRY_DELAY_MS: &str = "SANDBOX_API_RETRY_DELAY_MS";
pub const ENV_RETRY_BACKOFF: &str = "SANDBOX_API_RETRY_BACKOFF";
pub const ENV_MAX_MALFORMED: &str = "SANDBOX_MAX_MALFORMED_LINES";

/// Error raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value of the wrong shape
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// The base URL is not an absolute http(s) URL
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Class of request, used to pick an advisory timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Ordinary JSON request/response
    Default,
    /// Long-lived SSE body
    Streaming,
    /// Sandbox lifecycle operations (create, kill, restart)
    Sandbox,
}

/// Advisory per-class timeouts. The client never enforces these itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeouts {
    pub default: Duration,
    pub streaming: Duration,
    pub sandbox: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(30),
            streaming: Duration::from_secs(5 * 60),
            sandbox: Duration::from_secs(60),
        }
    }
}

/// Configuration for [`crate::client::StreamingClient`].
///
/// ```ignore
/// use sandbox_client::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://localhost:9000")
///     .with_max_malformed_lines(Some(10));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash
    pub base_url: String,
    pub timeouts: Timeouts,
    pub retry: RetryPolicy,
    /// Abort a stream after this many consecutive malformed `data:` lines.
    /// `None` never aborts.
    pub max_malformed_lines: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            retry: RetryPolicy::default(),
            max_malformed_lines: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend base URL. A trailing `/` is dropped.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_max_malformed_lines(mut self, limit: Option<u32>) -> Self {
        self.max_malformed_lines = limit;
        self
    }

    /// Advisory timeout for a request class.
    pub fn timeout_for(&self, class: RequestClass) -> Duration {
        match class {
            RequestClass::Default => self.timeouts.default,
            RequestClass::Streaming => self.timeouts.streaming,
            RequestClass::Sandbox => self.timeouts.sandbox,
        }
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }

    /// Load configuration from `SANDBOX_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Unset keys keep their
    /// defaults; set-but-invalid keys are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(url.trim());
        }

        let defaults = Timeouts::default();
        config.timeouts = Timeouts {
            default: parse_millis(&lookup, ENV_TIMEOUT_MS)?.unwrap_or(defaults.default),
            streaming: parse_millis(&lookup, ENV_STREAM_TIMEOUT_MS)?.unwrap_or(defaults.streaming),
            sandbox: parse_millis(&lookup, ENV_OPERATION_TIMEOUT_MS)?.unwrap_or(defaults.sandbox),
        };

        let mut retry = RetryPolicy::default();
        if let Some(retries) = parse_value::<u32, _>(&lookup, ENV_RETRIES)? {
            retry = retry.with_max_retries(retries);
        }
        if let Some(delay) = parse_millis(&lookup, ENV_RETRY_DELAY_MS)? {
            retry = retry.with_base_delay(delay);
        }
        if let Some(backoff) = parse_value::<f64, _>(&lookup, ENV_RETRY_BACKOFF)? {
            if !backoff.is_finite() || backoff < 1.0 {
                return Err(ConfigError::InvalidValue {
                    key: ENV_RETRY_BACKOFF.to_string(),
                    value: backoff.to_string(),
                    reason: "backoff multiplier must be at least 1.0".to_string(),
                });
            }
            retry = retry.with_backoff_multiplier(backoff);
        }
        config.retry = retry;

        config.max_malformed_lines = parse_value::<u32, _>(&lookup, ENV_MAX_MALFORMED)?;

        config.validate()?;
        Ok(config)
    }
}

fn parse_value<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string(),
            }),
    }
}

fn parse_millis<F>(lookup: &F, key: &str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_value::<u64, _>(lookup, key)?.map(Duration::from_millis))
}
