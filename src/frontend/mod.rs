//! Frontend Module
//!
//! Shell-side orchestration that runs in the hosting page: composing
//! micro-frontends into the content slot and the realtime chat client.
//!
//! # Module Structure
//!
//! ```text
//! frontend/
//! ├── compositor.rs  - Shell Loader / Compositor slot state machine
//! └── chat/          - Chat session state machine and WebSocket client
//! ```

pub mod chat;
pub mod compositor;

pub use compositor::{
    Compositor, EmbeddedFrame, ErrorPanel, LoadOutcome, LoadTicket, NavItem, PlaceholderView,
    SlotState,
};
