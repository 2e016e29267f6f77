//! API route definitions
//!
//! Organizes endpoints for the knowledge service:
//! - POST /add-knowledge - store a snippet
//! - POST /ask - answer a question
//! - GET /health - liveness probe
//! - GET /status - store and provider diagnostics

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, ServiceState};

/// Create all API routes for the service
pub fn api_routes(state: ServiceState) -> Router {
    Router::new()
        .route("/add-knowledge", post(handlers::add_knowledge))
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::get_status))
        .with_state(state)
}
