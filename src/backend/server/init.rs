/**
 * Server Initialization
 *
 * Builds the axum application for the configured role.
 *
 * # Initialization Process
 *
 * 1. Create the role's state (shell registries and proxy, chat hub, or the
 *    seeded task store)
 * 2. Create the role's router with the common layers
 *
 * Only the shell can fail to initialize: a service table with duplicate
 * keys or an HTTP client that cannot be built is reported as a
 * `BackendError` instead of starting a half-configured server.
 */

use crate::backend::chat::ChatHub;
use crate::backend::error::BackendError;
use crate::backend::routes::{create_chat_router, create_shell_router, create_tasks_router};
use crate::backend::server::config::{ServerConfig, ServiceRole};
use crate::backend::server::state::ShellState;
use crate::backend::tasks::{TaskStore, TasksState};
use axum::Router;

/// Create the application for `config.role`
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_app(config: &ServerConfig) -> Result<Router<()>, BackendError> {
    tracing::info!("[Server] Initializing {} service", config.role.as_str());
    match config.role {
        ServiceRole::Shell => create_shell_app(config),
        ServiceRole::Chat => Ok(create_chat_app(ChatHub::new())),
        ServiceRole::Tasks => Ok(create_tasks_app(TaskStore::seeded().into_state())),
    }
}

/// Create the shell application
pub fn create_shell_app(config: &ServerConfig) -> Result<Router<()>, BackendError> {
    let state = ShellState::from_config(config)?;
    tracing::info!(
        "[Shell] Registered micro-frontends: {}",
        state.advertised.names().collect::<Vec<_>>().join(", ")
    );
    Ok(create_shell_router(state))
}

/// Create the chat application around an existing hub
pub fn create_chat_app(hub: ChatHub) -> Router<()> {
    create_chat_router(hub)
}

/// Create the tasks application around an existing store
pub fn create_tasks_app(store: TasksState) -> Router<()> {
    create_tasks_router(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::server::config::ServiceEntry;

    #[test]
    fn test_create_app_for_each_role() {
        for role in [ServiceRole::Shell, ServiceRole::Chat, ServiceRole::Tasks] {
            assert!(create_app(&ServerConfig::for_role(role)).is_ok());
        }
    }

    #[test]
    fn test_duplicate_services_fail_shell_startup() {
        let entry = ServiceEntry::new("tasks", "Tareas", "assignment", "", "http://localhost:5000");
        let config = ServerConfig::for_role(ServiceRole::Shell).with_services(vec![entry.clone(), entry]);
        let err = create_app(&config).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::SERVICE_UNAVAILABLE);
    }
}
