//! Chat page and health endpoints.

use crate::backend::chat::state::ChatHub;
use crate::shared::chat::timestamp_now;
use axum::{extract::State, response::Html, Json};

const CHAT_PAGE: &str = include_str!("../../../../templates/chat.html");

/// `GET /` - chat micro-frontend document
pub async fn chat_page() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// `GET /health`
pub async fn chat_health(State(hub): State<ChatHub>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "tw-chat",
        "sessions": hub.session_count(),
        "timestamp": timestamp_now(),
    }))
}
