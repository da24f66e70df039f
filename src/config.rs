//! Configuration Module
//!
//! Loads server, upstream and resilience settings from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::breaker::CircuitBreakerConfig;
use crate::cache::CacheConfig;
use crate::client::UpstreamConfig;
use crate::retry::RetryConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Dashboard HTTP server port
    pub server_port: u16,
    /// Upstream REST API
    pub upstream: UpstreamConfig,
    /// Response cache
    pub cache: CacheConfig,
    /// Retry back-off
    pub retry: RetryConfig,
    /// Circuit breaker thresholds
    pub breaker: CircuitBreakerConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Dashboard port (default: 3000)
    /// - `UPSTREAM_BASE_URL` - Upstream API base URL (default: `http://localhost:4000/api/v1`)
    /// - `UPSTREAM_TIMEOUT_MS` - Per-request timeout (default: 30000)
    /// - `CACHE_TTL_MS` - Default cache TTL (default: 5000)
    /// - `CACHE_MAX_SIZE` - Maximum cached responses (default: 1000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Expiry sweep interval (default: 60000)
    /// - `RETRY_MAX_RETRIES` - Retries after the first attempt (default: 3)
    /// - `RETRY_BASE_DELAY_MS` - First back-off delay (default: 1000)
    /// - `RETRY_MAX_DELAY_MS` - Back-off cap (default: 30000)
    /// - `RETRY_EXPONENTIAL_BASE` - Back-off growth factor (default: 2.0)
    /// - `RETRY_JITTER` - Add up to 25% jitter (default: true)
    /// - `CB_FAILURE_THRESHOLD` - Failures that open the circuit (default: 5)
    /// - `CB_SUCCESS_THRESHOLD` - Half-open successes that close it (default: 2)
    /// - `CB_TIMEOUT_MS` - Open-state cool-down (default: 60000)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            upstream: UpstreamConfig {
                base_url: env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream.base_url),
                timeout: env_ms_or("UPSTREAM_TIMEOUT_MS", defaults.upstream.timeout),
            },
            cache: CacheConfig {
                ttl: env_ms_or("CACHE_TTL_MS", defaults.cache.ttl),
                max_size: env_or("CACHE_MAX_SIZE", defaults.cache.max_size),
                cleanup_interval: env_ms_or(
                    "CACHE_SWEEP_INTERVAL_MS",
                    defaults.cache.cleanup_interval,
                ),
            },
            retry: RetryConfig {
                max_retries: env_or("RETRY_MAX_RETRIES", defaults.retry.max_retries),
                base_delay: env_ms_or("RETRY_BASE_DELAY_MS", defaults.retry.base_delay),
                max_delay: env_ms_or("RETRY_MAX_DELAY_MS", defaults.retry.max_delay),
                exponential_base: env_or(
                    "RETRY_EXPONENTIAL_BASE",
                    defaults.retry.exponential_base,
                ),
                jitter: env_or("RETRY_JITTER", defaults.retry.jitter),
                ..defaults.retry
            },
            breaker: CircuitBreakerConfig {
                failure_threshold: env_or(
                    "CB_FAILURE_THRESHOLD",
                    defaults.breaker.failure_threshold,
                ),
                success_threshold: env_or(
                    "CB_SUCCESS_THRESHOLD",
                    defaults.breaker.success_threshold,
                ),
                timeout: env_ms_or("CB_TIMEOUT_MS", defaults.breaker.timeout),
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            breaker: CircuitBreakerConfig::default(),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_ms_or(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
