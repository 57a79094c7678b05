/**
 * Backend Error Types
 *
 * Errors raised by the axum handlers of the shell, chat and tasks servers.
 * Every variant maps to an HTTP status and is rendered by `IntoResponse`
 * (see `conversion.rs`).
 *
 * # Status Mapping
 *
 * - `HandlerError` - the status carried by the error
 * - `StateError` - 500
 * - `Shell(ConfigUnavailable)` - 503
 * - `Shell(ServiceNotFound)` - 404
 * - `Shell(TransportError)` - 503
 * - `Shell(UpstreamError)` - the upstream status
 * - `Shell(ValidationError)` - 400
 * - serialization failures - 500
 */

use crate::shared::ShellError;
use axum::http::StatusCode;
use thiserror::Error;

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use twshell::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("Tarea no encontrada");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level failure with an explicit status
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Shared state could not be used
    #[error("State error: {message}")]
    StateError {
        /// Human-readable error message
        message: String,
    },

    /// Registry, proxy or validation failure from the shared layer
    #[error(transparent)]
    Shell(#[from] ShellError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    /// Create a new state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::StateError {
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::StateError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shell(err) => match err {
                ShellError::ConfigUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ShellError::ServiceNotFound { .. } => StatusCode::NOT_FOUND,
                ShellError::TransportError { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ShellError::UpstreamError { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                ShellError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                ShellError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            Self::StateError { message } => message.clone(),
            Self::Shell(ShellError::ValidationError { message, .. }) => message.clone(),
            Self::Shell(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
