//! Retry Module
//!
//! Retries fallible async operations with exponential back-off and jitter,
//! retrying only errors classified as transient.

mod classify;
mod handler;
mod stats;

pub use classify::{is_transient_network_message, DEFAULT_RETRYABLE_STATUS_CODES};
pub use handler::{OnRetry, RetryConfig, RetryHandler};
pub use stats::RetryStats;
