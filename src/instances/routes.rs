//! REST endpoints for compute instances.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::http::{AppState, db_error};
use crate::instances::model::{Instance, InstanceStatusUpdate, NewInstance};
use crate::timefmt;

pub fn instance_routes() -> Router<AppState> {
    Router::new()
        .route("/api/instances", get(list_instances).post(create_instance))
        .route("/api/instances/batch", post(create_instances_batch))
        .route("/api/instances/{id}", get(get_instance))
        .route(
            "/api/instances/{id}/status",
            get(get_instance_status).put(update_instance_status),
        )
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Instance not found"})),
    )
        .into_response()
}

/// The `{status, lastHeartbeat}` shape returned by the status endpoints.
fn status_body(instance: &Instance) -> serde_json::Value {
    serde_json::json!({
        "status": instance.status,
        "lastHeartbeat": instance
            .last_heartbeat
            .map(|dt| dt.format(timefmt::FORMAT).to_string()),
    })
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn list_instances(State(state): State<AppState>) -> Response {
    match state.store.list_instances().await {
        Ok(instances) => Json(instances).into_response(),
        Err(e) => db_error(e),
    }
}

async fn get_instance(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.get_instance(id).await {
        Ok(Some(instance)) => Json(instance).into_response(),
        Ok(None) => not_found(),
        Err(e) => db_error(e),
    }
}

async fn create_instance(
    State(state): State<AppState>,
    Json(body): Json<NewInstance>,
) -> Response {
    match state.store.create_instance(&body).await {
        Ok(instance) => (StatusCode::CREATED, Json(instance)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn create_instances_batch(
    State(state): State<AppState>,
    Json(body): Json<Vec<NewInstance>>,
) -> Response {
    let mut created = Vec::with_capacity(body.len());
    for new in &body {
        match state.store.create_instance(new).await {
            Ok(instance) => created.push(instance),
            Err(e) => return db_error(e),
        }
    }
    Json(created).into_response()
}

async fn update_instance_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<InstanceStatusUpdate>,
) -> Response {
    match state
        .store
        .update_instance_status(id, body.status, Utc::now())
        .await
    {
        Ok(Some(instance)) => Json(status_body(&instance)).into_response(),
        Ok(None) => not_found(),
        Err(e) => db_error(e),
    }
}

async fn get_instance_status(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.get_instance(id).await {
        Ok(Some(instance)) => Json(status_body(&instance)).into_response(),
        Ok(None) => not_found(),
        Err(e) => db_error(e),
    }
}
