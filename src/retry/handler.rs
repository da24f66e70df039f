//! Retry handler with exponential back-off.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::classify::{is_retryable, DEFAULT_RETRYABLE_STATUS_CODES};
use super::stats::{RetryCounters, RetryStats};
use crate::error::{ResilienceError, Result};

/// Observer invoked before each back-off sleep with
/// `(attempt, delay, error)`; `attempt` counts failures so far, from 1.
pub type OnRetry = Arc<dyn Fn(u32, Duration, &ResilienceError) + Send + Sync>;

/// Share of the clamped delay added as random jitter, at most.
const JITTER_FACTOR: f64 = 0.25;

// == Retry Config ==
/// Retry configuration
#[derive(Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap applied to the exponential term (jitter may exceed it)
    pub max_delay: Duration,
    /// Growth factor between consecutive delays
    pub exponential_base: f64,
    /// Add up to +25% random jitter to each delay
    pub jitter: bool,
    /// HTTP status codes worth retrying
    pub retryable_status_codes: Vec<u16>,
    /// Optional observer called before each retry
    pub on_retry: Option<OnRetry>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            exponential_base: 2.0,
            jitter: true,
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
            on_retry: None,
        }
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("exponential_base", &self.exponential_base)
            .field("jitter", &self.jitter)
            .field("retryable_status_codes", &self.retryable_status_codes)
            .field("on_retry", &self.on_retry.is_some())
            .finish()
    }
}

// == Retry Handler ==
/// Retries an operation with exponential back-off, keeping per-handler stats.
#[derive(Debug, Default)]
pub struct RetryHandler {
    config: RetryConfig,
    counters: RetryCounters,
}

impl RetryHandler {
    /// Create a new retry handler with the given configuration
    #[must_use]
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            counters: RetryCounters::default(),
        }
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    // == Back-off ==
    /// Exponential delay before retry number `attempt` (1-based), clamped to
    /// `max_delay`, without jitter.
    #[must_use]
    pub fn base_delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let delay_ms = self.config.base_delay.as_millis() as f64
            * self.config.exponential_base.powi(exponent);
        let delay_ms = delay_ms.min(self.config.max_delay.as_millis() as f64);

        Duration::from_millis(delay_ms.max(0.0) as u64)
    }

    /// Delay actually slept before retry number `attempt`.
    ///
    /// Jitter is added after the clamp, so a jittered delay can land up to
    /// 25% above `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_for_attempt(attempt);
        if !self.config.jitter {
            return delay;
        }

        let fraction: f64 = rand::thread_rng().gen();
        delay + delay.mul_f64(JITTER_FACTOR * fraction)
    }

    /// Check if an error is worth another attempt
    #[must_use]
    pub fn is_retryable(&self, error: &ResilienceError) -> bool {
        is_retryable(error, &self.config.retryable_status_codes)
    }

    // == Execute ==
    /// Execute an operation with retry logic
    ///
    /// # Errors
    /// - non-retryable errors are returned unchanged after the failing attempt
    /// - [`ResilienceError::RetryExhausted`] wraps the last error once
    ///   `max_retries + 1` attempts have failed
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.counters.record_request();
        let mut attempt: u32 = 0;

        loop {
            self.counters.record_attempt();

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        self.counters.record_successful_retry();
                        debug!(attempt, "Retry succeeded");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            attempt += 1;

            if !self.is_retryable(&error) {
                self.counters.record_failed_retry();
                debug!(attempt, error = %error, "Non-retryable error, giving up");
                return Err(error);
            }

            if attempt > self.config.max_retries {
                self.counters.record_failed_retry();
                warn!(
                    attempts = attempt,
                    max_retries = self.config.max_retries,
                    error = %error,
                    "Retries exhausted"
                );
                return Err(ResilienceError::RetryExhausted {
                    attempts: attempt,
                    max_retries: self.config.max_retries,
                    source: Box::new(error),
                });
            }

            let delay = self.delay_for_attempt(attempt);
            if let Some(on_retry) = &self.config.on_retry {
                on_retry(attempt, delay, &error);
            }

            warn!(
                attempt,
                max_retries = self.config.max_retries,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying after error"
            );

            tokio::time::sleep(delay).await;
        }
    }

    // == Statistics ==
    /// Get current statistics
    #[must_use]
    pub fn stats(&self) -> RetryStats {
        self.counters.snapshot()
    }

    pub fn reset_stats(&self) {
        self.counters.reset();
    }
}
