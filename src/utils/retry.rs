//! Retry utilities with exponential backoff for E-utilities calls.
//!
//! Requests are single-attempt unless a caller opts into more attempts; only
//! transient failures (network errors, rate limiting, service unavailable) are
//! ever retried.

use std::time::Duration;
use tokio::time::sleep;

use crate::sources::SourceError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::single_attempt()
    }
}

impl RetryConfig {
    /// No retries at all
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }

    /// Set total attempts (values below 1 are treated as 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay before the first retry
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Backoff delay after the given failed attempt (1-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempt.saturating_sub(1) as f64);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Network connectivity issues or timeouts
    Network,
    /// HTTP 429
    RateLimit,
    /// HTTP 502/503/504
    ServiceUnavailable,
}

impl TransientError {
    /// Classify a SourceError as transient, if it is
    pub fn from_source_error(err: &SourceError) -> Option<Self> {
        match err {
            SourceError::Network(_) => Some(TransientError::Network),
            SourceError::RateLimit => Some(TransientError::RateLimit),
            SourceError::Api {
                status: 502..=504, ..
            } => Some(TransientError::ServiceUnavailable),
            _ => None,
        }
    }

    /// Minimum delay before retrying this kind of failure
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit => Duration::from_secs(1),
            TransientError::ServiceUnavailable => Duration::from_secs(2),
            TransientError::Network => Duration::from_millis(500),
        }
    }
}

/// Execute an async operation, retrying transient failures
///
/// Permanent errors are returned immediately. After `max_attempts` the last
/// transient error is returned.
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, SourceError>>,
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        let error = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempt, "Request succeeded after retry");
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        let Some(transient) = TransientError::from_source_error(&error) else {
            return Err(error);
        };

        if attempt >= config.max_attempts {
            if config.max_attempts > 1 {
                tracing::warn!(attempts = attempt, "Giving up after transient failures: {}", error);
            }
            return Err(error);
        }

        let delay = config.backoff(attempt).max(transient.recommended_delay());
        tracing::debug!(attempt, ?transient, ?delay, "Transient error, retrying: {}", error);
        sleep(delay).await;
    }
}
