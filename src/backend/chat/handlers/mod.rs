//! Chat Handlers Module
//!
//! Axum handlers of the chat micro-frontend.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs   - Module exports and documentation
//! ├── ws.rs    - GET /ws WebSocket session
//! └── page.rs  - GET / document and GET /health
//! ```
//!
//! # Wire Protocol
//!
//! Text frames carry `{"event": <name>, "data": <value>}`. Clients send
//! `join` and `message`; the server answers with `message` broadcasts and
//! `system` notices.

/// WebSocket session handler
pub mod ws;

/// Page and health handlers
pub mod page;

pub use page::{chat_health, chat_page};
pub use ws::{handle_ws_upgrade, run_chat_session};
