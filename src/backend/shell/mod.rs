//! Shell Backend Module
//!
//! The shell server: the host document, the service registry endpoint and
//! the forwarding routes through which micro-frontends are loaded and
//! called.
//!
//! # Module Structure
//!
//! ```text
//! shell/
//! ├── mod.rs   - Module exports and documentation
//! ├── pages.rs - GET /, GET /health, GET /api/microfrontends
//! └── proxy.rs - /api/proxy/{service}/... and /{service}/... forwarding
//! ```

/// Index, health and registry handlers
pub mod pages;

/// Forwarding handlers
pub mod proxy;

pub use pages::{list_microfrontends, render_index, shell_health, shell_index};
pub use proxy::{passthrough, passthrough_root, proxy_api, proxy_api_root};
