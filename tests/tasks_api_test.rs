//! Tasks micro-frontend API tests

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use twshell::backend::server::create_tasks_app;
use twshell::backend::tasks::TaskStore;

fn app() -> Router {
    create_tasks_app(TaskStore::seeded().into_state())
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request(method, uri, body)).await.unwrap();
    let status = response.status();
    (status, common::body_json(response).await)
}

#[tokio::test]
async fn test_list_seeded_tasks() {
    let (status, body) = send(&app(), "GET", "/api/tasks", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 3);
    assert_eq!(body["tasks"][0]["title"], "Implementar autenticación");
    assert_eq!(body["tasks"][1]["status"], "in-progress");
}

#[tokio::test]
async fn test_list_with_filters() {
    let app = app();
    let (_, body) = send(&app, "GET", "/api/tasks?status=pending&priority=all", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["tasks"][0]["id"], 3);

    let (_, body) = send(&app, "GET", "/api/tasks?priority=medium", None).await;
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_create_task() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/tasks",
        Some(json!({ "title": "  Revisar PR  ", "description": "del shell", "priority": "high" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Tarea creada exitosamente");
    assert_eq!(body["task"]["id"], 4);
    assert_eq!(body["task"]["title"], "Revisar PR");
    assert_eq!(body["task"]["status"], "pending");
    assert_eq!(body["task"]["priority"], "high");

    let (_, list) = send(&app, "GET", "/api/tasks", None).await;
    assert_eq!(list["tasks"][0]["id"], 4);
}

#[tokio::test]
async fn test_create_requires_title() {
    let (status, body) = send(&app(), "POST", "/api/tasks", Some(json!({ "description": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "El título es requerido");
}

#[tokio::test]
async fn test_create_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/tasks")
        .header("content-type", "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(common::body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_get_update_delete() {
    let app = app();

    let (status, body) = send(&app, "GET", "/api/tasks/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Diseñar interfaz de chat");

    let (status, body) = send(&app, "PUT", "/api/tasks/2", Some(json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Tarea actualizada exitosamente");
    assert_eq!(body["task"]["status"], "completed");
    assert_eq!(body["task"]["priority"], "medium");

    let (status, body) = send(&app, "DELETE", "/api/tasks/2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Tarea eliminada exitosamente" }));

    let (status, body) = send(&app, "GET", "/api/tasks/2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Tarea no encontrada");
}

#[tokio::test]
async fn test_update_rejects_unknown_status() {
    let (status, _) = send(&app(), "PUT", "/api/tasks/1", Some(json!({ "status": "archived" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_and_health() {
    let app = app();
    let (_, body) = send(&app, "GET", "/api/stats", None).await;
    assert_eq!(
        body,
        json!({
            "success": true,
            "stats": { "total": 3, "completed": 1, "inProgress": 1, "pending": 1, "highPriority": 2 },
        })
    );

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "tw-tasks");
    assert_eq!(body["tasks"], 3);
}

#[tokio::test]
async fn test_page_is_html() {
    let response = app().oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}
