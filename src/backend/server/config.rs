/**
 * Server Configuration
 *
 * Environment-driven configuration for the `tw-server` binary. One binary
 * runs any of the three services, selected by `SERVICE_ROLE`.
 *
 * # Variables
 *
 * - `SERVICE_ROLE` - `shell` (default), `chat` or `tasks`
 * - `PORT` - listen port (shell 8080, chat 5002, tasks 5000)
 * - `AUTH_SERVICE_URL`, `CHAT_SERVICE_URL`, `DOCS_SERVICE_URL`,
 *   `TASKS_SERVICE_URL` - upstream base URLs proxied by the shell
 * - `TW_REGISTRY_FILE` - TOML file replacing the built-in service table
 * - `PROXY_TIMEOUT_SECS` - timeout for proxied requests (default 10)
 *
 * # Error Handling
 *
 * An unknown role or an unreadable or malformed registry file is fatal;
 * the latter surfaces as `ShellError::ConfigUnavailable`. A malformed port
 * or timeout is logged and replaced by its default.
 *
 * # Registry File
 *
 * ```toml
 * [services.tasks]
 * name = "Tareas"
 * icon = "assignment"
 * description = "Gestión de tareas y proyectos"
 * upstream = "http://tw-tasks-service"
 * # url = "/tasks"   (advertised URL, defaults to /<key>)
 * ```
 */

use crate::shared::config::DEFAULT_REQUEST_TIMEOUT;
use crate::shared::{ServiceDescriptor, ServiceRegistry, ShellError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Which service this process runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceRole {
    Shell,
    Chat,
    Tasks,
}

impl ServiceRole {
    pub fn default_port(self) -> u16 {
        match self {
            ServiceRole::Shell => 8080,
            ServiceRole::Chat => 5002,
            ServiceRole::Tasks => 5000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceRole::Shell => "shell",
            ServiceRole::Chat => "chat",
            ServiceRole::Tasks => "tasks",
        }
    }
}

impl FromStr for ServiceRole {
    type Err = ServerConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "shell" => Ok(ServiceRole::Shell),
            "chat" => Ok(ServiceRole::Chat),
            "tasks" => Ok(ServiceRole::Tasks),
            other => Err(ServerConfigError::InvalidRole(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerConfigError {
    #[error("unknown SERVICE_ROLE '{0}' (expected shell, chat or tasks)")]
    InvalidRole(String),
    #[error("service registry unavailable: {0}")]
    Registry(#[source] ShellError),
}

/// Micro-frontend known to the shell: what it advertises and where it lives
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceEntry {
    /// Descriptor served by `/api/microfrontends`
    pub descriptor: ServiceDescriptor,
    /// Base URL the shell forwards to
    pub upstream: String,
}

impl ServiceEntry {
    /// Entry advertised at the shell's own `/<key>` passthrough
    pub fn new(
        key: &str,
        display_name: &str,
        icon: &str,
        description: &str,
        upstream: impl Into<String>,
    ) -> Self {
        Self {
            descriptor: ServiceDescriptor::new(key, display_name, format!("/{}", key), icon, description),
            upstream: upstream.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFileEntry {
    name: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    icon: String,
    #[serde(default)]
    description: String,
    upstream: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    services: BTreeMap<String, RegistryFileEntry>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub role: ServiceRole,
    pub port: u16,
    pub services: Vec<ServiceEntry>,
    pub proxy_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from the process environment (and `.env`)
    pub fn from_env() -> Result<Self, ServerConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let role: ServiceRole = lookup("SERVICE_ROLE").unwrap_or_default().parse()?;

        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("[Config] Invalid PORT '{}', using {}", raw, role.default_port());
                role.default_port()
            }),
            None => role.default_port(),
        };

        let proxy_timeout = match lookup("PROXY_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!("[Config] Invalid PROXY_TIMEOUT_SECS '{}', using default", raw);
                    DEFAULT_REQUEST_TIMEOUT
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        let services = match lookup("TW_REGISTRY_FILE") {
            Some(path) => match load_registry_file(&path) {
                Ok(services) => {
                    tracing::info!("[Config] Loaded {} services from {}", services.len(), path);
                    services
                }
                Err(e) => {
                    tracing::error!("[Config] {}", e);
                    return Err(ServerConfigError::Registry(e));
                }
            },
            None => default_services(&lookup),
        };

        Ok(Self {
            role,
            port,
            services,
            proxy_timeout,
        })
    }

    /// Configuration for a given role with the built-in service table
    pub fn for_role(role: ServiceRole) -> Self {
        Self {
            role,
            port: role.default_port(),
            services: default_services(&|_: &str| None),
            proxy_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Replace the service table
    pub fn with_services(mut self, services: Vec<ServiceEntry>) -> Self {
        self.services = services;
        self
    }

    /// Registry served to browsers (`/api/microfrontends`)
    pub fn advertised_registry(&self) -> Result<ServiceRegistry, ShellError> {
        ServiceRegistry::from_descriptors(self.services.iter().map(|s| s.descriptor.clone()))
    }

    /// Registry of upstream base URLs used for forwarding
    pub fn upstream_registry(&self) -> Result<ServiceRegistry, ShellError> {
        ServiceRegistry::from_descriptors(self.services.iter().map(|s| {
            let mut descriptor = s.descriptor.clone();
            descriptor.url = s.upstream.clone();
            descriptor
        }))
    }
}

/// Built-in table of the four micro-frontends
fn default_services(lookup: &dyn Fn(&str) -> Option<String>) -> Vec<ServiceEntry> {
    let upstream = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());
    vec![
        ServiceEntry::new(
            "auth",
            "Autenticación",
            "lock",
            "Gestión de usuarios y autenticación",
            upstream("AUTH_SERVICE_URL", "http://tw-auth-service"),
        ),
        ServiceEntry::new(
            "chat",
            "Chat",
            "chat",
            "Sistema de chat en tiempo real",
            upstream("CHAT_SERVICE_URL", "http://tw-chat-service"),
        ),
        ServiceEntry::new(
            "docs",
            "Documentos",
            "description",
            "Gestión de documentos compartidos",
            upstream("DOCS_SERVICE_URL", "http://tw-docs-service"),
        ),
        ServiceEntry::new(
            "tasks",
            "Tareas",
            "assignment",
            "Gestión de tareas y proyectos",
            upstream("TASKS_SERVICE_URL", "http://tw-tasks-service"),
        ),
    ]
}

/// Parse a TOML registry file into service entries
pub fn load_registry_file(path: impl AsRef<Path>) -> Result<Vec<ServiceEntry>, ShellError> {
    let path = path.as_ref();
    let document = std::fs::read_to_string(path)
        .map_err(|e| ShellError::config(format!("cannot read registry file {:?}: {}", path, e)))?;
    parse_registry_file(&document)
}

fn parse_registry_file(document: &str) -> Result<Vec<ServiceEntry>, ShellError> {
    let file: RegistryFile = toml::from_str(document)
        .map_err(|e| ShellError::config(format!("malformed registry file: {}", e)))?;
    Ok(file
        .services
        .into_iter()
        .map(|(key, entry)| {
            let url = entry.url.unwrap_or_else(|| format!("/{}", key));
            ServiceEntry {
                descriptor: ServiceDescriptor::new(key, entry.name, url, entry.icon, entry.description),
                upstream: entry.upstream,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.role, ServiceRole::Shell);
        assert_eq!(config.port, 8080);
        assert_eq!(config.proxy_timeout, Duration::from_secs(10));

        let upstreams = config.upstream_registry().unwrap();
        assert_eq!(upstreams.resolve("tasks").unwrap().url, "http://tw-tasks-service");
        let advertised = config.advertised_registry().unwrap();
        assert_eq!(advertised.resolve("tasks").unwrap().url, "/tasks");
        assert_eq!(advertised.len(), 4);
    }

    #[test]
    fn test_env_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SERVICE_ROLE", "tasks"),
            ("PORT", "9000"),
            ("TASKS_SERVICE_URL", "http://localhost:5000"),
            ("PROXY_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.role, ServiceRole::Tasks);
        assert_eq!(config.port, 9000);
        assert_eq!(config.proxy_timeout, Duration::from_secs(3));
        assert_eq!(
            config.upstream_registry().unwrap().resolve("tasks").unwrap().url,
            "http://localhost:5000"
        );
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SERVICE_ROLE", "chat"),
            ("PORT", "eighty"),
            ("PROXY_TIMEOUT_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.port, 5002);
        assert_eq!(config.proxy_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_unknown_role_is_fatal() {
        let result = ServerConfig::from_lookup(lookup(&[("SERVICE_ROLE", "billing")]));
        assert!(matches!(result, Err(ServerConfigError::InvalidRole(r)) if r == "billing"));
    }

    #[test]
    fn test_parse_registry_file() {
        let services = parse_registry_file(
            r#"
            [services.wiki]
            name = "Wiki"
            icon = "description"
            upstream = "http://wiki:7000"

            [services.tasks]
            name = "Tareas"
            url = "https://tasks.example"
            upstream = "http://tasks:5000"
            "#,
        )
        .unwrap();
        assert_eq!(services.len(), 2);
        let wiki = services.iter().find(|s| s.descriptor.key == "wiki").unwrap();
        assert_eq!(wiki.descriptor.url, "/wiki");
        assert_eq!(wiki.upstream, "http://wiki:7000");
        let tasks = services.iter().find(|s| s.descriptor.key == "tasks").unwrap();
        assert_eq!(tasks.descriptor.url, "https://tasks.example");
    }

    #[test]
    fn test_missing_registry_file_is_config_unavailable() {
        let result = ServerConfig::from_lookup(lookup(&[(
            "TW_REGISTRY_FILE",
            "/definitely/not/here.toml",
        )]));
        assert!(matches!(
            result,
            Err(ServerConfigError::Registry(ShellError::ConfigUnavailable { .. }))
        ));
    }

    #[test]
    fn test_malformed_registry_document_is_config_unavailable() {
        let result = parse_registry_file("[services.tasks]\nname = 3");
        assert!(matches!(result, Err(ShellError::ConfigUnavailable { .. })));
    }
}
