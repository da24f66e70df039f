//! Circuit Breaker Module
//!
//! Three-state failure accounting around a fallible async operation. While
//! OPEN, calls fail fast with [`ResilienceError::CircuitOpen`] instead of
//! reaching a dependency known to be failing.
//!
//! [`ResilienceError::CircuitOpen`]: crate::error::ResilienceError::CircuitOpen

mod circuit;
mod stats;

pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use stats::CircuitBreakerStats;
