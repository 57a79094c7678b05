//! Chat Backend Module
//!
//! Server half of the realtime chat: a volatile session hub and the
//! WebSocket endpoint that feeds it. Nothing is persisted; a reconnecting
//! client is a brand-new session.
//!
//! # Architecture
//!
//! - **`state`** - `ChatHub`, the session arena and broadcast rules
//! - **`handlers`** - `GET /ws`, `GET /` and `GET /health`
//!
//! # Example
//!
//! ```rust
//! use twshell::backend::chat::ChatHub;
//!
//! let hub = ChatHub::new();
//! let (id, _outbound) = hub.connect();
//! assert_eq!(hub.join(id, "alice").as_deref(), Some("alice"));
//! ```

/// Chat session hub
pub mod state;

/// Chat HTTP/WebSocket handlers
pub mod handlers;

pub use state::ChatHub;
