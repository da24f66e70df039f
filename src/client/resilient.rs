//! Resilient client: breaker ⊃ retry ⊃ cache composition.

use std::future::Future;
use std::time::Duration;

use regex::Regex;
use tracing::info;

use super::ClientStats;
use crate::breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::cache::{CacheConfig, CacheManager};
use crate::config::Config;
use crate::error::Result;
use crate::retry::{RetryConfig, RetryHandler};

/// Owns one breaker, one retry handler and one cache for a single upstream.
///
/// Instances are independent; build one per upstream dependency.
#[derive(Debug)]
pub struct ResilientClient<V> {
    breaker: CircuitBreaker,
    retry: RetryHandler,
    cache: CacheManager<V>,
}

impl<V: Clone> ResilientClient<V> {
    pub fn new(
        name: impl Into<String>,
        breaker: CircuitBreakerConfig,
        retry: RetryConfig,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            breaker: CircuitBreaker::new(name, breaker),
            retry: RetryHandler::new(retry),
            cache: CacheManager::new(cache),
        }
    }

    /// Builds the client from the resilience sections of `config`.
    pub fn from_config(name: impl Into<String>, config: &Config) -> Self {
        Self::new(
            name,
            config.breaker.clone(),
            config.retry.clone(),
            &config.cache,
        )
    }

    /// Runs `fetch` through the breaker, the retry handler and the cache.
    ///
    /// A cached value for `key` is returned without calling `fetch`; a fresh
    /// value is cached under `ttl` (default TTL when `None`).
    ///
    /// # Errors
    /// - [`CircuitOpen`](crate::error::ResilienceError::CircuitOpen) while the breaker sheds load
    /// - [`RetryExhausted`](crate::error::ResilienceError::RetryExhausted) when every attempt failed transiently
    /// - the fetch error itself when it is not retryable
    pub async fn execute<F, Fut>(&self, key: &str, ttl: Option<Duration>, fetch: F) -> Result<V>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        self.breaker
            .execute(|| {
                self.retry
                    .execute(|| self.cache.get_or_set(key, &fetch, ttl))
            })
            .await
    }

    /// Runs `fetch` through the breaker and the retry handler, bypassing the
    /// cache. For operations whose results must not be reused.
    pub async fn execute_uncached<F, Fut, T>(&self, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.breaker
            .execute(|| self.retry.execute(&fetch))
            .await
    }

    // == Dashboard Surface ==

    pub fn stats(&self) -> ClientStats {
        ClientStats {
            circuit_breaker: self.breaker.stats(),
            cache: self.cache.stats(),
            retry: self.retry.stats(),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!(circuit = %self.breaker.name(), "Cache cleared");
    }

    /// Removes cached keys matching `pattern`, returning the count removed.
    pub fn invalidate_cache(&self, pattern: &Regex) -> usize {
        let removed = self.cache.invalidate_pattern(pattern);
        info!(pattern = %pattern, removed, "Cache entries invalidated");
        removed
    }

    pub fn reset_circuit_breaker(&self) {
        self.breaker.reset();
    }

    pub fn force_circuit_breaker_open(&self) {
        self.breaker.force_open();
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn retry_handler(&self) -> &RetryHandler {
        &self.retry
    }

    pub fn cache(&self) -> &CacheManager<V> {
        &self.cache
    }
}

impl<V: Clone + Send + 'static> ResilientClient<V> {
    /// Starts background maintenance (the cache sweeper).
    pub fn start(&self) {
        self.cache.start();
    }

    /// Stops background maintenance.
    pub fn shutdown(&self) {
        self.cache.stop();
    }
}
