//! REST API module using Axum
//!
//! Provides the HTTP endpoints for the knowledge service:
//! - POST /add-knowledge - store a snippet with its embedding
//! - POST /ask - answer a question from the most similar stored snippet
//! - GET /health, GET /status - liveness and store diagnostics

pub mod handlers;
mod routes;

pub use handlers::ServiceState;

use axum::http::{header, Method};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// Set `RECALL_CORS_ORIGINS` to a comma-separated list of allowed origins
/// for development.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("RECALL_CORS_ORIGINS") {
        Ok(origins) => {
            let allowed: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!(origins = %origins, "CORS: allowing configured origins");
            CorsLayer::new()
                .allow_origin(allowed)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
        Err(_) => {
            // No cross-origin allowed by default
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        }
    }
}

/// Create the complete application router.
pub fn create_app(state: ServiceState) -> Router {
    let cors = build_cors_layer();

    Router::new()
        .merge(routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
