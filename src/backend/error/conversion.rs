/**
 * Error Conversion
 *
 * `IntoResponse` for `BackendError`. Error responses are JSON:
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 404
 * }
 * ```
 */

use crate::backend::error::types::BackendError;
use axum::{
    http::header,
    response::{IntoResponse, Response},
    Json,
};

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("[Backend] {} ({})", message, status.as_u16());
        } else {
            tracing::debug!("[Backend] {} ({})", message, status.as_u16());
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response()
    }
}
