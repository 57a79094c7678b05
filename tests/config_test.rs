//! Configuration loading tests
//!
//! Environment-variable tests are serialized since they mutate process
//! state.

use pretty_assertions::assert_eq;
use serial_test::serial;
use std::io::Write;
use twshell::backend::server::{ServerConfig, ServerConfigError, ServiceRole};
use twshell::shared::ShellError;
use twshell::shared::ServiceRegistry;

const VARS: &[&str] = &[
    "SERVICE_ROLE",
    "PORT",
    "PROXY_TIMEOUT_SECS",
    "TW_REGISTRY_FILE",
    "TASKS_SERVICE_URL",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

const REGISTRY_FILE: &str = r#"
[services.tasks]
name = "Tareas"
icon = "assignment"
description = "Gestión de tareas y proyectos"
upstream = "http://localhost:5000"

[services.metrics]
name = "Métricas"
url = "http://metrics.local"
icon = "monitoring"
upstream = "http://localhost:7000"
"#;

#[test]
#[serial]
fn test_from_env_reads_role_and_port() {
    clear_env();
    std::env::set_var("SERVICE_ROLE", "chat");
    std::env::set_var("PORT", "6000");

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config.role, ServiceRole::Chat);
    assert_eq!(config.port, 6000);
    clear_env();
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_role() {
    clear_env();
    std::env::set_var("SERVICE_ROLE", "billing");
    assert!(ServerConfig::from_env().is_err());
    clear_env();
}

#[test]
#[serial]
fn test_from_env_uses_registry_file() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(REGISTRY_FILE.as_bytes()).unwrap();
    std::env::set_var("TW_REGISTRY_FILE", file.path());
    std::env::set_var("TASKS_SERVICE_URL", "http://ignored");

    let config = ServerConfig::from_env().unwrap();
    let advertised = config.advertised_registry().unwrap();
    assert_eq!(advertised.names().collect::<Vec<_>>(), vec!["metrics", "tasks"]);
    assert_eq!(advertised.resolve("tasks").unwrap().url, "/tasks");
    assert_eq!(advertised.resolve("metrics").unwrap().url, "http://metrics.local");
    assert_eq!(
        config.upstream_registry().unwrap().resolve("tasks").unwrap().url,
        "http://localhost:5000"
    );
    clear_env();
}

#[test]
#[serial]
fn test_from_env_missing_registry_file_is_fatal() {
    clear_env();
    std::env::set_var("TW_REGISTRY_FILE", "/nonexistent/registry.toml");

    let result = ServerConfig::from_env();
    assert!(matches!(
        result,
        Err(ServerConfigError::Registry(ShellError::ConfigUnavailable { .. }))
    ));
    clear_env();
}

#[test]
#[serial]
fn test_from_env_malformed_registry_file_is_fatal() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[services.tasks]\nname = \"Tareas\"\n").unwrap();
    std::env::set_var("TW_REGISTRY_FILE", file.path());

    let result = ServerConfig::from_env();
    assert!(matches!(
        result,
        Err(ServerConfigError::Registry(ShellError::ConfigUnavailable { .. }))
    ));
    clear_env();
}

#[test]
fn test_registry_load_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[services.docs]
name = "Documentos"
url = "http://localhost:5003"
icon = "description"
description = "Gestión de documentos compartidos"
"#
    )
    .unwrap();

    let registry = ServiceRegistry::load_file(file.path()).unwrap();
    let docs = registry.resolve("docs").unwrap();
    assert_eq!(docs.key, "docs");
    assert_eq!(docs.display_name, "Documentos");
    assert_eq!(docs.root_url(), "http://localhost:5003/");
}

#[test]
fn test_registry_load_file_malformed() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[services.docs\nname = ").unwrap();
    let err = ServiceRegistry::load_file(file.path()).unwrap_err();
    assert!(matches!(err, twshell::shared::ShellError::ConfigUnavailable { .. }));
}
