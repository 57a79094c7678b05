//! Shared Error Types
//!
//! This module defines the error taxonomy used across the shell: registry
//! loading, proxy calls and frame composition all report failures through
//! `ShellError`.
//!
//! # Error Categories
//!
//! - `ConfigUnavailable` - The registry source was unreachable or malformed
//! - `ServiceNotFound` - A name that is not in the registry was used
//! - `TransportError` - The target service could not be reached at all
//! - `UpstreamError` - The target service answered with a non-2xx status
//! - `ValidationError` - Caller-supplied data failed validation
//! - `SerializationError` - JSON encoding or decoding failed
//!
//! `TransportError` and `UpstreamError` are deliberately distinct: callers
//! must be able to tell "service unreachable" from "service reachable but
//! rejected the request".
//!
//! # Usage
//!
//! ```rust
//! use twshell::shared::error::ShellError;
//!
//! let error = ShellError::not_found("ghost");
//! assert!(error.is_not_found());
//! ```
use thiserror::Error;

/// Shell-wide error taxonomy
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShellError {
    /// Registry configuration could not be loaded
    #[error("Configuration unavailable: {message}")]
    ConfigUnavailable {
        /// Human-readable error message
        message: String,
    },

    /// Unknown micro-frontend / service name
    #[error("Service not found: {name}")]
    ServiceNotFound {
        /// The name that failed to resolve
        name: String,
    },

    /// Network-level failure (connection refused, DNS, timeout)
    #[error("Transport error calling {service}: {message}")]
    TransportError {
        /// Target service key
        service: String,
        /// Human-readable error message
        message: String,
    },

    /// The service answered with a non-2xx status
    #[error("Upstream error from {service}: HTTP {status}")]
    UpstreamError {
        /// Target service key
        service: String,
        /// HTTP status code returned by the service
        status: u16,
        /// Decoded error body, when the service sent JSON
        payload: Option<serde_json::Value>,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },
}

impl ShellError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigUnavailable {
            message: message.into(),
        }
    }

    /// Create a new service-not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ServiceNotFound { name: name.into() }
    }

    /// Create a new transport error
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportError {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new upstream error
    pub fn upstream(
        service: impl Into<String>,
        status: u16,
        payload: Option<serde_json::Value>,
    ) -> Self {
        Self::UpstreamError {
            service: service.into(),
            status,
            payload,
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ServiceNotFound { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportError { .. })
    }

    /// Status code carried by an `UpstreamError`, if any
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::UpstreamError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = ShellError::config("registry unreachable");
        match error {
            ShellError::ConfigUnavailable { message } => {
                assert_eq!(message, "registry unreachable");
            }
            _ => panic!("Expected ConfigUnavailable"),
        }
    }

    #[test]
    fn test_not_found_error() {
        let error = ShellError::not_found("ghost");
        assert!(error.is_not_found());
        assert!(!error.is_transport());
        assert_eq!(error.to_string(), "Service not found: ghost");
    }

    #[test]
    fn test_transport_and_upstream_are_distinct() {
        let transport = ShellError::transport("tasks", "connection refused");
        let upstream = ShellError::upstream("tasks", 404, None);

        assert!(transport.is_transport());
        assert_eq!(transport.upstream_status(), None);
        assert!(!upstream.is_transport());
        assert_eq!(upstream.upstream_status(), Some(404));
    }

    #[test]
    fn test_upstream_keeps_payload() {
        let payload = serde_json::json!({"error": "Tarea no encontrada"});
        let error = ShellError::upstream("tasks", 404, Some(payload.clone()));
        match error {
            ShellError::UpstreamError { payload: Some(p), .. } => assert_eq!(p, payload),
            _ => panic!("Expected UpstreamError with payload"),
        }
    }

    #[test]
    fn test_from_serde_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let shell_error: ShellError = result.unwrap_err().into();

        match shell_error {
            ShellError::SerializationError { .. } => {}
            _ => panic!("Expected SerializationError from serde error"),
        }
    }
}
