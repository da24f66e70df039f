//! API Handlers
//!
//! HTTP request handlers for the dashboard and proxy endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    Json,
};
use tracing::info;

use crate::client::{ApiClient, ApiResponse, ClientStats, ResilientClient};
use crate::config::Config;
use crate::error::{ResilienceError, Result};
use crate::models::{ActionResponse, HealthResponse, InvalidateRequest, InvalidateResponse};

/// Application state shared across all handlers.
///
/// The client owns its own locks, so the state is a plain `Arc`.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Resilient upstream client
    pub client: Arc<ApiClient>,
}

impl AppState {
    /// Creates a new AppState around an existing client.
    pub fn new(client: ApiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Builds the upstream client from configuration.
    ///
    /// The cache sweeper is not started here.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resilience = ResilientClient::from_config("upstream-api", config);
        let client = ApiClient::new(&config.upstream, resilience)?;
        Ok(Self::new(client))
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /stats
///
/// Returns the breaker, cache and retry snapshots in one body.
pub async fn stats_handler(State(state): State<AppState>) -> Json<ClientStats> {
    Json(state.client.stats())
}

/// Handler for POST /cache/clear
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ActionResponse> {
    state.client.resilience().clear_cache();
    Json(ActionResponse::new("Cache cleared"))
}

/// Handler for POST /cache/invalidate
///
/// Removes every cached response whose key matches the regex in the body.
pub async fn invalidate_cache_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let pattern = req.compile().map_err(ResilienceError::InvalidRequest)?;
    let removed = state.client.resilience().invalidate_cache(&pattern);

    Ok(Json(InvalidateResponse::new(&req.pattern, removed)))
}

/// Handler for POST /circuit-breaker/reset
pub async fn reset_circuit_breaker_handler(
    State(state): State<AppState>,
) -> Json<ActionResponse> {
    state.client.resilience().reset_circuit_breaker();
    info!("Circuit breaker reset via dashboard");
    Json(ActionResponse::new("Circuit breaker reset"))
}

/// Handler for POST /circuit-breaker/force-open
pub async fn force_open_handler(State(state): State<AppState>) -> Json<ActionResponse> {
    state.client.resilience().force_circuit_breaker_open();
    info!("Circuit breaker forced open via dashboard");
    Json(ActionResponse::new("Circuit breaker forced open"))
}

/// Handler for GET /api/*path
///
/// Forwards the path and query string to the upstream through the
/// resilient client. Errors map to status codes via [`ResilienceError`].
pub async fn proxy_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<ApiResponse>> {
    let endpoint = proxy_endpoint(&path, query.as_deref());
    let response = state.client.get(&endpoint).await?;
    Ok(Json(response))
}

fn proxy_endpoint(path: &str, query: Option<&str>) -> String {
    let path = path.trim_start_matches('/');
    match query {
        Some(q) if !q.is_empty() => format!("/{}?{}", path, q),
        _ => format!("/{}", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaker::CircuitState;

    fn test_state() -> AppState {
        AppState::from_config(&Config::default()).unwrap()
    }

    #[test]
    fn test_proxy_endpoint() {
        assert_eq!(proxy_endpoint("blocks", None), "/blocks");
        assert_eq!(proxy_endpoint("blocks/7", Some("")), "/blocks/7");
        assert_eq!(
            proxy_endpoint("/blocks", Some("page=2&limit=10")),
            "/blocks?page=2&limit=10"
        );
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_stats_handler_starts_empty() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.circuit_breaker.state, CircuitState::Closed);
        assert_eq!(response.cache.size, 0);
        assert_eq!(response.retry.total_requests, 0);
    }

    #[tokio::test]
    async fn test_force_open_then_reset() {
        let state = test_state();

        force_open_handler(State(state.clone())).await;
        assert_eq!(
            state.client.resilience().breaker().state(),
            CircuitState::Open
        );

        // Open breaker rejects the proxy without touching the network
        let err = proxy_handler(
            State(state.clone()),
            Path("blocks".to_string()),
            RawQuery(None),
        )
        .await
        .unwrap_err();
        assert!(err.is_circuit_open());

        reset_circuit_breaker_handler(State(state.clone())).await;
        assert_eq!(
            state.client.resilience().breaker().state(),
            CircuitState::Closed
        );
    }

    #[tokio::test]
    async fn test_invalidate_invalid_pattern() {
        let req = InvalidateRequest {
            pattern: "([".to_string(),
        };
        let result = invalidate_cache_handler(State(test_state()), Json(req)).await;
        assert!(matches!(result, Err(ResilienceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_empty_cache() {
        let req = InvalidateRequest {
            pattern: "^api:".to_string(),
        };
        let response = invalidate_cache_handler(State(test_state()), Json(req))
            .await
            .unwrap();
        assert_eq!(response.removed, 0);
    }

    #[tokio::test]
    async fn test_clear_cache_handler() {
        let response = clear_cache_handler(State(test_state())).await;
        assert_eq!(response.message, "Cache cleared");
    }
}
