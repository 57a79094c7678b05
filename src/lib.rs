//! TWShell - Micro-frontend Shell Library
//!
//! TWShell composes independently deployed micro-frontends (auth, chat,
//! tasks, docs) into a single shell application. The shell loads each
//! micro-frontend into an isolated frame, bridges a publish/subscribe event
//! bus across frame boundaries and lets any micro-frontend call a sibling
//! service's REST API through a shell-mediated proxy.
//!
//! # Overview
//!
//! This library provides:
//! - A read-only Service Registry snapshot (name → location + metadata)
//! - An injectable Event Bus with a cross-origin frame relay
//! - A generic API Proxy that distinguishes unreachable from rejecting services
//! - The Shell Loader / Compositor slot state machine
//! - A realtime chat channel (server hub + client session state machine)
//!
//! # Module Structure
//!
//! - **`shared`** - Types and primitives shared by the servers and the shell
//!   frontend: service descriptors, registry, bus, proxy, chat wire events,
//!   configuration and error types.
//!
//! - **`frontend`** - Shell-side orchestration
//!   - Compositor (registry-driven loading, placeholder fallback)
//!   - Realtime chat client (join / reconnect / rename)
//!
//! - **`backend`** - Axum servers (only compiled with the `ssr` feature)
//!   - Shell server (registry endpoint, API proxy, frame passthrough)
//!   - Chat server (WebSocket session manager)
//!   - Tasks micro-frontend (in-memory CRUD)
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the `backend` module and the `tw-server`
//!   binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use twshell::shared::{EventBus, ServiceRegistry};
//! use twshell::frontend::Compositor;
//! use twshell::shared::config::AppConfig;
//!
//! # async fn example() {
//! let config = AppConfig::builder()
//!     .shell_url("http://localhost:8080".to_string())
//!     .build()
//!     .unwrap();
//! let registry = ServiceRegistry::load_from_shell(&config).await;
//! let compositor = Compositor::new(registry, EventBus::new(), &config);
//! compositor.load("tasks").await;
//! # }
//! ```

/// Shared types and primitives
pub mod shared;

/// Shell-side orchestration (compositor, chat client)
pub mod frontend;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
