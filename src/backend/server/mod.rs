//! Server Module
//!
//! Configuration, state and initialization of the `tw-server` binary. One
//! binary runs the shell, chat or tasks service depending on
//! `SERVICE_ROLE`.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── config.rs - ServerConfig from the environment
//! ├── state.rs  - ShellState and FromRef implementations
//! └── init.rs   - create_app and the per-role constructors
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use twshell::backend::server::{create_app, ServerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::from_env()?;
//! let app = create_app(&config)?;
//! let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shell server state
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{ServerConfig, ServerConfigError, ServiceEntry, ServiceRole};
pub use init::{create_app, create_chat_app, create_shell_app, create_tasks_app};
pub use state::ShellState;
