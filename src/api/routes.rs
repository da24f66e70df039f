//! API Routes
//!
//! Configures the Axum router with the dashboard and proxy endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_cache_handler, force_open_handler, health_handler, invalidate_cache_handler,
    proxy_handler, reset_circuit_breaker_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (the dashboard is served from another port)
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/cache/clear", post(clear_cache_handler))
        .route("/cache/invalidate", post(invalidate_cache_handler))
        .route("/circuit-breaker/reset", post(reset_circuit_breaker_handler))
        .route("/circuit-breaker/force-open", post(force_open_handler))
        .route("/api/*path", get(proxy_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
