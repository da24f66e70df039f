//! Circuit breaker state machine.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::stats::{success_rate_percent, CircuitBreakerStats};
use crate::cache::current_timestamp_ms;
use crate::error::{ResilienceError, Result};

// == Circuit State ==
/// Circuit breaker states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Circuit is closed, requests flow normally
    #[default]
    Closed,
    /// Circuit is open, requests are rejected
    Open,
    /// Circuit is half-open, testing if the dependency recovered
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        })
    }
}

// == Configuration ==
/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit
    pub failure_threshold: u32,
    /// Consecutive HALF_OPEN successes that close the circuit
    pub success_threshold: u32,
    /// Cool-down between opening and letting a probe through
    pub timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Mutable breaker state, always updated under one lock.
///
/// Invariants: `state == Open` implies `next_attempt_time.is_some()`;
/// `state != HalfOpen` implies `half_open_successes == 0`.
#[derive(Debug, Default)]
struct BreakerState {
    state: CircuitState,
    failure_count: u64,
    success_count: u64,
    total_requests: u64,
    last_failure_time: Option<u64>,
    next_attempt_time: Option<u64>,
    half_open_successes: u32,
}

// == Circuit Breaker ==
/// Circuit breaker guarding one upstream dependency
pub struct CircuitBreaker {
    /// Name used in log fields
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState::default()),
        }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    // == Execute ==
    /// Execute an operation through the circuit breaker.
    ///
    /// Each call counts once, whatever the operation does internally.
    ///
    /// # Errors
    /// Returns [`ResilienceError::CircuitOpen`] without running `operation`
    /// while the circuit is OPEN and its cool-down has not elapsed; otherwise
    /// the operation's own error, unchanged.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.admit()?;

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(error) => {
                self.record_failure();
                Err(error)
            }
        }
    }

    /// Counts the request and decides whether it may proceed, moving an
    /// expired OPEN circuit to HALF_OPEN.
    fn admit(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.total_requests += 1;

        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let now = current_timestamp_ms();
        match inner.next_attempt_time {
            Some(next_attempt_at) if now < next_attempt_at => {
                debug!(circuit = %self.name, next_attempt_at, "Circuit open, rejecting call");
                Err(ResilienceError::CircuitOpen { next_attempt_at })
            }
            _ => {
                inner.state = CircuitState::HalfOpen;
                inner.half_open_successes = 0;
                info!(circuit = %self.name, "Circuit breaker half-open, probing");
                Ok(())
            }
        }
    }

    // == State Transitions ==
    fn record_success(&self) {
        let mut inner = self.inner.lock();
        inner.success_count += 1;
        inner.failure_count = 0;

        if inner.state == CircuitState::HalfOpen {
            inner.half_open_successes += 1;
            debug!(
                circuit = %self.name,
                successes = inner.half_open_successes,
                threshold = self.config.success_threshold,
                "Circuit breaker half-open success"
            );

            if inner.half_open_successes >= self.config.success_threshold {
                inner.state = CircuitState::Closed;
                inner.half_open_successes = 0;
                inner.next_attempt_time = None;
                info!(circuit = %self.name, "Circuit breaker closed");
            }
        }
    }

    fn record_failure(&self) {
        let mut inner = self.inner.lock();
        let now = current_timestamp_ms();
        inner.failure_count += 1;
        inner.last_failure_time = Some(now);

        match inner.state {
            CircuitState::HalfOpen => {
                self.trip(&mut inner, now);
                warn!(circuit = %self.name, "Circuit breaker probe failed, reopening");
            }
            CircuitState::Closed
                if inner.failure_count >= u64::from(self.config.failure_threshold) =>
            {
                self.trip(&mut inner, now);
                warn!(
                    circuit = %self.name,
                    failures = inner.failure_count,
                    threshold = self.config.failure_threshold,
                    "Circuit breaker opened"
                );
            }
            _ => {}
        }
    }

    fn trip(&self, inner: &mut BreakerState, now: u64) {
        inner.state = CircuitState::Open;
        inner.next_attempt_time = Some(now.saturating_add(self.config.timeout.as_millis() as u64));
        inner.half_open_successes = 0;
    }

    // == Manual Overrides ==
    /// Force CLOSED and zero every counter (manual intervention)
    pub fn reset(&self) {
        *self.inner.lock() = BreakerState::default();
        info!(circuit = %self.name, "Circuit breaker reset");
    }

    /// Force OPEN with a fresh cool-down (maintenance mode)
    pub fn force_open(&self) {
        let mut inner = self.inner.lock();
        self.trip(&mut inner, current_timestamp_ms());
        warn!(circuit = %self.name, "Circuit breaker forced open");
    }

    /// Success rate in percent, 100 before any request
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let inner = self.inner.lock();
        success_rate_percent(inner.success_count, inner.total_requests)
    }

    /// Get current statistics
    #[must_use]
    pub fn stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock();
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            total_requests: inner.total_requests,
            success_rate: success_rate_percent(inner.success_count, inner.total_requests),
            half_open_successes: inner.half_open_successes,
            last_failure_time: inner.last_failure_time,
            next_attempt_time: inner.next_attempt_time,
        }
    }
}
