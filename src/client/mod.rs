//! Client Module
//!
//! Composes the circuit breaker, retry handler and cache around remote calls.
//!
//! Every call is wrapped as breaker ⊃ retry ⊃ cache-or-fetch, so an open
//! circuit short-circuits before any retry or fetch, and a request absorbed
//! by retries counts once against the breaker.

mod http;
mod resilient;
mod stats;

pub use http::{ApiClient, ApiResponse, UpstreamConfig};
pub use resilient::ResilientClient;
pub use stats::ClientStats;
