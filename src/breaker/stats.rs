//! Circuit breaker statistics.

use serde::Serialize;

use super::CircuitState;

/// Circuit breaker statistics reported to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreakerStats {
    /// Current state
    pub state: CircuitState,
    /// Failures since the last success
    pub failure_count: u64,
    /// Successful calls
    pub success_count: u64,
    /// Calls to `execute`, rejected ones included
    pub total_requests: u64,
    /// `success_count / total_requests * 100`, or 100 before any call
    pub success_rate: f64,
    /// Consecutive successes in the current HALF_OPEN period
    pub half_open_successes: u32,
    /// Unix milliseconds of the last recorded failure
    pub last_failure_time: Option<u64>,
    /// Unix milliseconds after which an OPEN circuit lets a probe through
    pub next_attempt_time: Option<u64>,
}

/// Success rate as a percentage, defined as 100 before any request.
pub(crate) fn success_rate_percent(success_count: u64, total_requests: u64) -> f64 {
    if total_requests == 0 {
        100.0
    } else {
        success_count as f64 / total_requests as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        assert_eq!(success_rate_percent(0, 0), 100.0);
        assert_eq!(success_rate_percent(1, 4), 25.0);
        assert_eq!(success_rate_percent(4, 4), 100.0);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = CircuitBreakerStats {
            state: CircuitState::HalfOpen,
            failure_count: 0,
            success_count: 1,
            total_requests: 1,
            success_rate: 100.0,
            half_open_successes: 1,
            last_failure_time: None,
            next_attempt_time: Some(42),
        };

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["state"], "HALF_OPEN");
        assert_eq!(json["successRate"], 100.0);
        assert_eq!(json["nextAttemptTime"], 42);
        assert!(json["lastFailureTime"].is_null());
    }
}
