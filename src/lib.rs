//! Resilient API - fault-tolerant client for a remote REST API
//!
//! Wraps upstream calls in a circuit breaker, a retry handler with
//! exponential back-off, and a TTL/LRU response cache, and exposes their
//! statistics and controls over a small dashboard API.

pub mod api;
pub mod breaker;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod retry;
pub mod tasks;

pub use api::AppState;
pub use breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use cache::{CacheConfig, CacheManager};
pub use client::{ApiClient, ApiResponse, ResilientClient};
pub use config::Config;
pub use error::ResilienceError;
pub use retry::{RetryConfig, RetryHandler};
pub use tasks::spawn_sweep_task;
