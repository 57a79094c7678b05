//! Common test utilities and helpers
//!
//! - Spawning routers on real listeners
//! - Decoding response bodies
//! - Registry fixtures pointing at mock upstreams

#![allow(dead_code)]

use axum::body::Body;
use axum::http::Response;
use axum::Router;
use std::net::SocketAddr;
use twshell::backend::server::{ServerConfig, ServiceEntry, ServiceRole};
use twshell::shared::{ServiceDescriptor, ServiceRegistry};

/// Serve `router` on an ephemeral local port
pub async fn spawn_app(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing listens on
pub async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Single-service registry
pub fn registry_with(key: &str, url: &str) -> ServiceRegistry {
    ServiceRegistry::from_descriptors(vec![ServiceDescriptor::new(
        key,
        key.to_uppercase(),
        url,
        "extension",
        format!("{} service", key),
    )])
    .unwrap()
}

/// Shell configuration whose `tasks` service forwards to `upstream`
pub fn shell_config(upstream: &str) -> ServerConfig {
    ServerConfig::for_role(ServiceRole::Shell).with_services(vec![
        ServiceEntry::new("tasks", "Tareas", "assignment", "Gestión de tareas y proyectos", upstream),
        ServiceEntry::new("chat", "Chat", "chat", "Sistema de chat en tiempo real", "http://127.0.0.1:1"),
    ])
}
