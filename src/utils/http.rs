//! HTTP client utilities.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::sources::SourceError;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared HTTP client with an optional request-rate ceiling
///
/// Clones share both the connection pool and the rate limiter, so every task
/// holding a clone draws from the same request budget.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("client", &self.client)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

impl HttpClient {
    /// Create a new HTTP client with default settings and no rate limit
    pub fn new() -> Result<Self, SourceError> {
        Self::with_settings(DEFAULT_USER_AGENT, DEFAULT_TIMEOUT, None)
    }

    /// Create a client with a custom user agent, timeout and request-rate ceiling
    pub fn with_settings(
        user_agent: &str,
        timeout: Duration,
        requests_per_second: Option<f32>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let limiter = requests_per_second
            .filter(|rps| rps.is_finite() && *rps > 0.0)
            .and_then(|rps| Duration::try_from_secs_f32(1.0 / rps).ok())
            .and_then(Quota::with_period)
            .map(|quota| Arc::new(RateLimiter::direct(quota.allow_burst(nonzero!(1u32)))));

        Ok(Self { client, limiter })
    }

    /// Whether requests are paced by a rate limiter
    pub fn is_rate_limited(&self) -> bool {
        self.limiter.is_some()
    }

    /// Send a GET request, waiting for the rate limiter first
    pub async fn get(&self, url: &str) -> Result<Response, SourceError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Request to {} failed: {}", url, e)))
    }
}
