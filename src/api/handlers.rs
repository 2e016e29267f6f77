//! API route handlers
//!
//! Request handling logic for the knowledge service endpoints. Handlers own
//! no logic beyond translating engine outcomes into HTTP status codes and
//! JSON shapes; everything interesting happens in the engine.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::engine::KnowledgeEngine;

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ServiceState {
    /// The engine, holding the store handle and provider clients
    pub engine: KnowledgeEngine,
    /// Embedding model name, reported by /status
    pub embedding_model: String,
    /// Chat model name, reported by /status
    pub chat_model: String,
}

impl ServiceState {
    /// Create handler state around a constructed engine.
    pub fn new(engine: KnowledgeEngine, embedding_model: &str, chat_model: &str) -> Self {
        Self {
            engine,
            embedding_model: embedding_model.to_string(),
            chat_model: chat_model.to_string(),
        }
    }
}

// ============================================================================
// Request / Response Shapes
// ============================================================================

/// Body of POST /add-knowledge
#[derive(Debug, Deserialize)]
pub struct AddKnowledgeRequest {
    pub content: String,
}

/// Body of POST /ask
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// Successful response of POST /ask
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// Error response shape: `{ "error": "..." }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response of GET /health
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub entries: usize,
}

/// Response of GET /status
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub store_backend: &'static str,
    pub entries: usize,
    pub embedding_model: String,
    pub chat_model: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /add-knowledge - store a snippet, embedding it on the way in.
///
/// Returns 201 with the created entry, 200 with the existing entry when the
/// content is already present, or 500 on store failure. Embedding failure
/// does not fail the request; the entry is written with a placeholder
/// vector.
pub async fn add_knowledge(
    State(state): State<ServiceState>,
    Json(request): Json<AddKnowledgeRequest>,
) -> Response {
    match state.engine.add_knowledge(&request.content).await {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(outcome.entry)).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "add-knowledge request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to add knowledge".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /ask - answer a question from the most similar stored snippet.
///
/// Returns 200 with `{ answer }`, or 500 with `{ error }` when the store or
/// answer generation fails.
pub async fn ask(
    State(state): State<ServiceState>,
    Json(request): Json<AskRequest>,
) -> Response {
    match state.engine.ask(&request.question).await {
        Ok(answer) => (StatusCode::OK, Json(AskResponse { answer })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ask request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to get answer".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /health - liveness probe
pub async fn health_check(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        entries: state.engine.entry_count(),
    })
}

/// GET /status - store and provider diagnostics
pub async fn get_status(State(state): State<ServiceState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        store_backend: state.engine.store_backend(),
        entries: state.engine.entry_count(),
        embedding_model: state.embedding_model.clone(),
        chat_model: state.chat_model.clone(),
    })
}
