//! Retryability classification.

use crate::error::ResilienceError;

/// Status codes retried when no explicit set is configured.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 6] = [408, 429, 500, 502, 503, 504];

/// Lower-cased fragments of transport failures worth retrying.
const TRANSIENT_NETWORK_PATTERNS: [&str; 11] = [
    "econnrefused",
    "connection refused",
    "etimedout",
    "timed out",
    "timeout",
    "enotfound",
    "dns error",
    "failed to lookup address",
    "failed to fetch",
    "network request failed",
    "error sending request",
];

/// True if `message` looks like a transient network failure.
pub fn is_transient_network_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    TRANSIENT_NETWORK_PATTERNS
        .iter()
        .any(|pattern| message.contains(pattern))
}

/// Allowlist classification: anything not recognised as transient is final.
pub(crate) fn is_retryable(error: &ResilienceError, retryable_status_codes: &[u16]) -> bool {
    match error {
        ResilienceError::CircuitOpen { .. } => false,
        ResilienceError::Upstream {
            status_code: Some(code),
            ..
        } => retryable_status_codes.contains(code),
        ResilienceError::Upstream {
            status_code: None,
            message,
        } => is_transient_network_message(message),
        ResilienceError::RetryExhausted { .. }
        | ResilienceError::InvalidRequest(_)
        | ResilienceError::Internal(_) => false,
    }
}
