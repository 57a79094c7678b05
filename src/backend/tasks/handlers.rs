/**
 * Tasks HTTP Handlers
 *
 * # Endpoints
 *
 * - `GET /` - tasks micro-frontend document
 * - `GET /api/tasks?status=&priority=` - `{success, tasks, total}`
 * - `POST /api/tasks` - 201 `{success, task, message}`
 * - `GET /api/tasks/{id}` - `{success, task}`
 * - `PUT /api/tasks/{id}` - `{success, task, message}`
 * - `DELETE /api/tasks/{id}` - `{success, message}`
 * - `GET /api/stats` - `{success, stats}`
 * - `GET /health`
 *
 * Failures use the shared `BackendError` JSON body.
 */

use crate::backend::error::BackendError;
use crate::backend::tasks::state::TasksState;
use crate::shared::chat::timestamp_now;
use crate::shared::task::{NewTask, TaskFilter, TaskUpdate};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde_json::{json, Value};

const TASKS_PAGE: &str = include_str!("../../../templates/tasks.html");

pub async fn tasks_page() -> Html<&'static str> {
    Html(TASKS_PAGE)
}

pub async fn list_tasks(State(store): State<TasksState>, Query(filter): Query<TaskFilter>) -> Json<Value> {
    let tasks = store.read().await.list(&filter);
    Json(json!({
        "success": true,
        "total": tasks.len(),
        "tasks": tasks,
    }))
}

pub async fn get_task(State(store): State<TasksState>, Path(id): Path<u64>) -> Result<Json<Value>, BackendError> {
    let store = store.read().await;
    let task = store.get(id)?;
    Ok(Json(json!({ "success": true, "task": task })))
}

/// Create a task
///
/// A body that is not a JSON object is reported like any other bad request.
pub async fn create_task(
    State(store): State<TasksState>,
    payload: Result<Json<NewTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), BackendError> {
    let Json(new) = payload.map_err(|e| BackendError::bad_request(e.body_text()))?;
    let task = store.write().await.create(new)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "task": task,
            "message": "Tarea creada exitosamente",
        })),
    ))
}

pub async fn update_task(
    State(store): State<TasksState>,
    Path(id): Path<u64>,
    payload: Result<Json<TaskUpdate>, JsonRejection>,
) -> Result<Json<Value>, BackendError> {
    let Json(update) = payload.map_err(|e| BackendError::bad_request(e.body_text()))?;
    let task = store.write().await.update(id, update)?;
    Ok(Json(json!({
        "success": true,
        "task": task,
        "message": "Tarea actualizada exitosamente",
    })))
}

pub async fn delete_task(State(store): State<TasksState>, Path(id): Path<u64>) -> Result<Json<Value>, BackendError> {
    store.write().await.delete(id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Tarea eliminada exitosamente",
    })))
}

pub async fn task_stats(State(store): State<TasksState>) -> Json<Value> {
    let stats = store.read().await.stats();
    Json(json!({ "success": true, "stats": stats }))
}

/// `GET /health`
pub async fn tasks_health(State(store): State<TasksState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "tw-tasks",
        "tasks": store.read().await.len(),
        "timestamp": timestamp_now(),
    }))
}
