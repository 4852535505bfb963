//! REST endpoints for tasks and their logs.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::http::{AppState, db_error};
use crate::processor::{DispatchJob, TaskLogger};
use crate::tasks::model::{CreateTask, FieldError, NewTask, TaskStatus, UpdateTask};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/tasks/{id}/logs", get(get_task_logs))
}

fn validation_error(errors: Vec<FieldError>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "message": "Validation failed",
            "errors": errors,
        })),
    )
        .into_response()
}

fn missing_instances_error(missing: Vec<i64>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({
            "message": "Referenced instances do not exist",
            "missing_ids": missing,
        })),
    )
        .into_response()
}

/// Check which of the referenced instance ids are absent from the store.
async fn missing_instance_ids(
    state: &AppState,
    ids: &[i64],
) -> Result<Vec<i64>, crate::error::DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let found = state.store.find_instances(ids).await?;
    let found_ids: HashSet<i64> = found.iter().map(|i| i.id).collect();
    Ok(ids
        .iter()
        .copied()
        .filter(|id| !found_ids.contains(id))
        .collect())
}

// ── Handlers ────────────────────────────────────────────────────────────

async fn list_tasks(State(state): State<AppState>) -> Response {
    match state.store.list_tasks().await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => db_error(e),
    }
}

async fn get_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.get_task(id).await {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Task not found"})),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}

async fn create_task(State(state): State<AppState>, Json(body): Json<CreateTask>) -> Response {
    let errors = body.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    // Referential check before any row is written: a task referencing a
    // missing instance must not be persisted at all.
    let instance_ids: Vec<i64> = body.instances.iter().map(|i| i.id).collect();
    let missing = match missing_instance_ids(&state, &instance_ids).await {
        Ok(missing) => missing,
        Err(e) => return db_error(e),
    };
    if !missing.is_empty() {
        return missing_instances_error(missing);
    }

    let mut new = NewTask::new(body.title, body.description, body.task_type);

    // Dispatch trigger: a registered title prefix qualifies the task for
    // background execution and forces its initial state.
    let processor = state.registry.match_title(&new.title);
    if processor.is_some() {
        new.status = TaskStatus::InProgress;
        new.progress = 0.0;
    }

    let task = match state.store.create_task(&new).await {
        Ok(task) => task,
        Err(e) => return db_error(e),
    };
    if let Err(e) = state
        .store
        .replace_task_instances(task.id, &instance_ids)
        .await
    {
        return db_error(e);
    }

    if let Some(processor) = processor {
        // Initial log line goes in before the job is handed off, so the
        // worker always observes a fully persisted task.
        let logger = TaskLogger::new(Arc::clone(&state.store), task.id);
        if let Err(e) = logger.info("Task created, execution scheduled").await {
            return db_error(e);
        }
        state.dispatcher.enqueue(DispatchJob {
            task_id: task.id,
            kind: processor.kind().to_string(),
        });
        info!(
            task_id = task.id,
            kind = processor.kind(),
            "Task dispatched for background execution"
        );
    }

    match state.store.get_task(task.id).await {
        Ok(Some(task)) => (StatusCode::CREATED, Json(task)).into_response(),
        Ok(None) => db_error(crate::error::DatabaseError::Query(
            "task vanished after insert".into(),
        )),
        Err(e) => db_error(e),
    }
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateTask>,
) -> Response {
    let errors = body.validate();
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let instance_ids: Option<Vec<i64>> = body
        .instances
        .as_ref()
        .map(|refs| refs.iter().map(|i| i.id).collect());
    if let Some(ref ids) = instance_ids {
        let missing = match missing_instance_ids(&state, ids).await {
            Ok(missing) => missing,
            Err(e) => return db_error(e),
        };
        if !missing.is_empty() {
            return missing_instances_error(missing);
        }
    }

    // Same advisory lock the background mutator takes, so a foreground
    // edit and a timeline write cannot interleave on this row.
    let _guard = state.locks.acquire(id).await;

    let mut task = match state.store.get_task(id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Task not found"})),
            )
                .into_response();
        }
        Err(e) => return db_error(e),
    };

    if let Some(title) = body.title {
        task.title = title;
    }
    if let Some(description) = body.description {
        task.description = description;
    }
    if let Some(status) = body.status {
        task.status = status;
    }
    if let Some(progress) = body.progress {
        task.progress = progress;
    }
    if let Some(task_type) = body.task_type {
        task.task_type = task_type;
    }

    if let Err(e) = state.store.save_task(&task).await {
        return db_error(e);
    }
    if let Some(ids) = instance_ids {
        if let Err(e) = state.store.replace_task_instances(id, &ids).await {
            return db_error(e);
        }
    }

    match state.store.get_task(id).await {
        Ok(Some(task)) => Json(task).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Task not found"})),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}

async fn delete_task(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let _guard = state.locks.acquire(id).await;
    match state.store.delete_task(id).await {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Task not found"})),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}

async fn get_task_logs(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    match state.store.logs_for_task(id).await {
        Ok(logs) => Json(logs).into_response(),
        Err(e) => db_error(e),
    }
}
