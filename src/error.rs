//! Error types for the resilience layer
//!
//! Provides a single tagged error type using thiserror. Callers match on the
//! variant instead of probing for ad-hoc flags on an opaque error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Resilience Error Enum ==
/// Unified error type surfaced by the cache, retry and circuit breaker layers.
#[derive(Error, Debug)]
pub enum ResilienceError {
    /// Circuit breaker is shedding load; the operation was never invoked
    #[error("Circuit breaker is OPEN (next attempt at {next_attempt_at} ms)")]
    CircuitOpen {
        /// Unix millisecond timestamp after which a probe is allowed
        next_attempt_at: u64,
    },

    /// Every allowed attempt failed with a retryable error
    #[error("Max retries ({max_retries}) exceeded after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Total attempts made, including the first one
        attempts: u32,
        /// Configured retry limit
        max_retries: u32,
        /// The last underlying failure
        #[source]
        source: Box<ResilienceError>,
    },

    /// Failure reported by the remote operation itself
    #[error("Upstream error: {message}")]
    Upstream {
        /// HTTP-like status code, if the failure carried one
        status_code: Option<u16>,
        /// Human readable cause
        message: String,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResilienceError {
    /// Builds an upstream error carrying an HTTP status code.
    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// Builds an upstream error without a status code (transport level).
    pub fn network(message: impl Into<String>) -> Self {
        Self::Upstream {
            status_code: None,
            message: message.into(),
        }
    }

    /// True when the error was produced by an open circuit breaker.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Status code carried by an upstream failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Upstream { status_code, .. } => *status_code,
            _ => None,
        }
    }

    /// Short discriminant used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CircuitOpen { .. } => "circuit_open",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::Upstream { .. } => "upstream",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Internal(_) => "internal",
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ResilienceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ResilienceError::CircuitOpen { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ResilienceError::RetryExhausted { .. } => StatusCode::BAD_GATEWAY,
            ResilienceError::Upstream { status_code, .. } => status_code
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            ResilienceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ResilienceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string(), self.kind()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the resilience layer.
pub type Result<T> = std::result::Result<T, ResilienceError>;
