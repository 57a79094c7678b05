/**
 * Shell Server State
 *
 * State shared by the shell server's handlers, with `FromRef`
 * implementations so each handler extracts only the part it needs.
 *
 * - `advertised` - registry served to browsers; URLs point at the shell's
 *   own `/{service}` passthrough
 * - `proxy` - forwarder over the upstream registry
 *
 * The chat and tasks servers use `ChatHub` and `TasksState` directly as
 * their router state.
 */

use crate::backend::server::config::ServerConfig;
use crate::shared::{ApiProxy, AppConfig, ServiceRegistry, ShellError};
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ShellState {
    pub advertised: Arc<ServiceRegistry>,
    pub proxy: ApiProxy,
}

impl ShellState {
    /// Build both registries and the forwarding client from configuration
    ///
    /// # Errors
    ///
    /// `ConfigUnavailable` when the service table has duplicate keys or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ShellError> {
        let advertised = config.advertised_registry()?;
        let upstreams = config.upstream_registry()?;
        let client_config = AppConfig::builder()
            .proxy_timeout(config.proxy_timeout)
            .build()
            .map_err(|e| ShellError::config(e.to_string()))?;
        Ok(Self {
            advertised: Arc::new(advertised),
            proxy: ApiProxy::new(upstreams, &client_config)?,
        })
    }
}

impl FromRef<ShellState> for Arc<ServiceRegistry> {
    fn from_ref(state: &ShellState) -> Self {
        state.advertised.clone()
    }
}

impl FromRef<ShellState> for ApiProxy {
    fn from_ref(state: &ShellState) -> Self {
        state.proxy.clone()
    }
}
