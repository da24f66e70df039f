//! Aggregated statistics for the monitoring dashboard.

use serde::Serialize;

use crate::breaker::CircuitBreakerStats;
use crate::cache::CacheStats;
use crate::retry::RetryStats;

/// Union of breaker, cache and retry statistics, polled by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub circuit_breaker: CircuitBreakerStats,
    pub cache: CacheStats,
    pub retry: RetryStats,
}
