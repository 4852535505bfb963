//! HTTP surface — shared state and router assembly.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::error::DatabaseError;
use crate::instances;
use crate::processor::{Dispatcher, ProcessorRegistry, TaskLocks};
use crate::store::Database;
use crate::tasks;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Database>,
    /// Per-task advisory locks, shared with the background mutators.
    pub locks: Arc<TaskLocks>,
    pub registry: Arc<ProcessorRegistry>,
    pub dispatcher: Dispatcher,
}

/// Build the Axum router with all API routes and permissive CORS.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(tasks::routes::task_routes())
        .merge(instances::routes::instance_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Welcome to the opstrack task management API"
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "opstrack"
    }))
}

/// Convert a store failure into a 500 without leaking internals.
pub(crate) fn db_error(e: DatabaseError) -> Response {
    tracing::error!(error = %e, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Internal server error"})),
    )
        .into_response()
}
