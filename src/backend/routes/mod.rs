//! Route Configuration Module
//!
//! Router assembly for the three service roles.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs    - Module exports and documentation
//! └── router.rs - Shell, chat and tasks routers
//! ```
//!
//! # Routes
//!
//! ## Shell
//!
//! - `GET /`, `GET /health`, `GET /api/microfrontends`
//! - `* /api/proxy/{service}/{*endpoint}` - JSON API forwarding
//! - `* /{service}/{*path}` - browser passthrough for iframes
//!
//! ## Chat
//!
//! - `GET /`, `GET /ws`, `GET /health`
//!
//! ## Tasks
//!
//! - `GET /`, `GET|POST /api/tasks`, `GET|PUT|DELETE /api/tasks/{id}`,
//!   `GET /api/stats`, `GET /health`

/// Router creation
pub mod router;

pub use router::{create_chat_router, create_shell_router, create_tasks_router};
