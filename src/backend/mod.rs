//! Backend Module
//!
//! The axum servers of the platform. Compiled only with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`server`** - configuration, state and app construction per role
//! - **`routes`** - router assembly for the shell, chat and tasks roles
//! - **`shell`** - host document, registry endpoint and forwarding
//! - **`chat`** - realtime chat hub and WebSocket endpoint
//! - **`tasks`** - tasks micro-frontend API and page
//! - **`error`** - `BackendError` and its JSON response form
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs    - Module exports and documentation
//! ├── main.rs   - tw-server binary
//! ├── server/   - Configuration and initialization
//! ├── routes/   - Router assembly
//! ├── shell/    - Shell handlers
//! ├── chat/     - Chat hub and handlers
//! ├── tasks/    - Tasks store and handlers
//! └── error/    - Error types
//! ```
//!
//! # Thread Safety
//!
//! Handler state is cheap to clone: `Arc`-wrapped registries, a pooled
//! `reqwest::Client`, the `ChatHub` handle and `Arc<RwLock<TaskStore>>`.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Shell server handlers
pub mod shell;

/// Chat server
pub mod chat;

/// Tasks micro-frontend
pub mod tasks;

/// Backend error types
pub mod error;

pub use chat::ChatHub;
pub use error::BackendError;
pub use server::{create_app, ServerConfig, ServiceRole};
pub use tasks::TaskStore;
