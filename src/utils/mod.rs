//! Utility modules supporting provider access.
//!
//! - [`HttpClient`]: shared reqwest client with a per-request timeout
//! - [`RetryConfig`]: configuration for retry logic with exponential backoff
//! - [`with_retry`]: execute an operation with automatic retry on transient errors
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use pubmed_industry::sources::SourceError;
//! use pubmed_industry::utils::{with_retry, RetryConfig};
//!
//! # async fn fetch_data() -> Result<String, SourceError> { Ok("data".to_string()) }
//! # #[tokio::main]
//! # async fn main() -> Result<(), SourceError> {
//! let data = with_retry(RetryConfig::default(), || fetch_data()).await?;
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;

pub use http::{HttpClient, DEFAULT_REQUEST_TIMEOUT};
pub use retry::{with_retry, with_retry_detailed, RetryConfig, RetryResult, TransientError};
