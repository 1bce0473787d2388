//! Retry policy with exponential backoff.
//!
//! Only transport failures and 5xx responses are retried. A 4xx response is
//! the backend's final word and goes straight back to the caller.

use std::time::Duration;

use crate::traits::{HttpError, Response};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);
/// Default growth factor between consecutive delays.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
/// Upper bound on any single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// What happened on one attempt, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 1xx/2xx/3xx: done
    Success,
    /// 4xx: done, not retried
    ClientError,
    /// 5xx: retried while budget remains
    ServerError,
    /// Transport failed before a response arrived
    TransportError,
    /// Transport reported cancellation
    Cancelled,
}

impl AttemptOutcome {
    pub fn from_status(status: u16) -> Self {
        match status {
            400..=499 => AttemptOutcome::ClientError,
            500..=599 => AttemptOutcome::ServerError,
            _ => AttemptOutcome::Success,
        }
    }

    pub fn of(result: &Result<Response, HttpError>) -> Self {
        match result {
            Ok(response) => Self::from_status(response.status),
            Err(HttpError::Cancelled) => AttemptOutcome::Cancelled,
            Err(err) if err.is_retryable() => AttemptOutcome::TransportError,
            // InvalidUrl and friends will fail identically next time
            Err(_) => AttemptOutcome::ClientError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptOutcome::ServerError | AttemptOutcome::TransportError
        )
    }
}

/// Retry budget and backoff schedule.
///
/// Total attempts are `max_retries + 1`. The delay after failed attempt `n`
/// (0-based) is `base_delay * backoff_multiplier^n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, backoff_multiplier: f64) -> Self {
        Self::default()
            .with_max_retries(max_retries)
            .with_base_delay(base_delay)
            .with_backoff_multiplier(backoff_multiplier)
    }

    /// Single attempt, no retries.
    pub fn no_retry() -> Self {
        Self::default().with_max_retries(0)
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Set the backoff multiplier. Values below 1.0 (and NaN) become 1.0 so
    /// the schedule never shrinks.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = if multiplier.is_finite() && multiplier >= 1.0 {
            multiplier
        } else {
            1.0
        };
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    /// Total number of attempts this policy allows.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.powi(exponent);
        let nanos = self.base_delay.as_nanos() as f64 * factor;
        if !nanos.is_finite() || nanos >= self.max_delay.as_nanos() as f64 {
            self.max_delay
        } else {
            Duration::from_nanos(nanos.round() as u64)
        }
    }

    /// Whether another attempt should follow `attempt` (0-based) given its outcome.
    pub fn should_retry(&self, attempt: u32, outcome: AttemptOutcome) -> bool {
        outcome.is_retryable() && attempt < self.max_retries
    }
}
