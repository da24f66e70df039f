//! API Module
//!
//! HTTP handlers and routing for the resilience dashboard.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Breaker, cache and retry statistics
//! - `POST /cache/clear` - Drop every cached response
//! - `POST /cache/invalidate` - Drop cached responses matching a regex
//! - `POST /circuit-breaker/reset` - Close the circuit
//! - `POST /circuit-breaker/force-open` - Open the circuit
//! - `GET /api/*path` - Resilient proxy to the upstream API

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
