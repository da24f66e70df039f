//! Retry statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters accumulated across every call made through one handler.
#[derive(Debug, Default)]
pub(crate) struct RetryCounters {
    total_requests: AtomicU64,
    total_attempts: AtomicU64,
    successful_retries: AtomicU64,
    failed_retries: AtomicU64,
}

impl RetryCounters {
    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_attempt(&self) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_successful_retry(&self) {
        self.successful_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_retry(&self) {
        self.failed_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.total_attempts.store(0, Ordering::Relaxed);
        self.successful_retries.store(0, Ordering::Relaxed);
        self.failed_retries.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RetryStats {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_attempts = self.total_attempts.load(Ordering::Relaxed);
        RetryStats {
            total_attempts,
            successful_retries: self.successful_retries.load(Ordering::Relaxed),
            failed_retries: self.failed_retries.load(Ordering::Relaxed),
            total_requests,
            average_attempts: if total_requests == 0 {
                0.0
            } else {
                total_attempts as f64 / total_requests as f64
            },
        }
    }
}

/// Retry statistics reported to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryStats {
    /// Invocations of the wrapped operation, first tries included
    pub total_attempts: u64,
    /// Calls that succeeded after at least one retry
    pub successful_retries: u64,
    /// Calls that failed for good (non-retryable or exhausted)
    pub failed_retries: u64,
    /// Calls to `execute`
    pub total_requests: u64,
    /// `total_attempts / total_requests`, or 0 before any call
    pub average_attempts: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_attempts() {
        let counters = RetryCounters::default();
        assert_eq!(counters.snapshot().average_attempts, 0.0);

        counters.record_request();
        counters.record_attempt();
        counters.record_request();
        counters.record_attempt();
        counters.record_attempt();
        counters.record_attempt();

        let stats = counters.snapshot();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.average_attempts, 2.0);

        counters.reset();
        assert_eq!(counters.snapshot().total_attempts, 0);
    }
}
