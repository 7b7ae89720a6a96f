//! API layer - routes and handlers

pub mod handlers;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Agent action-group invocation
        .route("/agent/invoke", post(handlers::agent::invoke_agent))
        // Prompt-flow relay
        .route("/flow/invoke", post(handlers::flow::invoke_flow))
        // Add state
        .with_state(state)
        // Applied to success and error responses alike
        .layer(cors(&cors_origins))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "fhir-gateway"
    }))
}

/// CORS layer built from configured origins
fn cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Do not emit permissive CORS headers unless explicitly configured.
        return CorsLayer::new();
    }

    let mut header_values = Vec::with_capacity(origins.len());
    for origin in origins {
        if let Ok(value) = axum::http::HeaderValue::from_str(origin) {
            header_values.push(value);
        }
    }

    // If all configured origins were invalid, fall back to no CORS.
    if header_values.is_empty() {
        return CorsLayer::new();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(header_values))
        .allow_methods(Any)
        .allow_headers(Any)
}
