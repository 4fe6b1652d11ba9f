//! Utility modules supporting E-utilities access.
//!
//! - [`HttpClient`]: HTTP client with a shared request-rate ceiling
//! - [`RetryConfig`]: Configuration for retry logic with exponential backoff
//! - [`with_retry`]: Execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use get_papers_list::sources::SourceError;
//! use get_papers_list::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let config = RetryConfig::default().max_attempts(3);
//! let data = with_retry(config, fetch_data).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::{HttpClient, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
pub use retry::{with_retry, RetryConfig, TransientError};
