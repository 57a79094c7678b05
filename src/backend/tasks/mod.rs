//! Tasks Backend Module
//!
//! The tasks micro-frontend: a small CRUD API over an in-memory store plus
//! the page the shell embeds.
//!
//! # Module Structure
//!
//! ```text
//! tasks/
//! ├── mod.rs      - Module exports and documentation
//! ├── state.rs    - TaskStore and the shared TasksState handle
//! └── handlers.rs - axum handlers for the page and /api routes
//! ```

/// In-memory task store
pub mod state;

/// Tasks HTTP handlers
pub mod handlers;

pub use state::{TaskStore, TasksState};
