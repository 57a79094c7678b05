//! Realtime Chat Client
//!
//! Client half of the chat channel: a sans-IO session state machine plus
//! the WebSocket transport and driver that execute it.
//!
//! # Module Structure
//!
//! ```text
//! chat/
//! ├── session.rs    - ChatSession state machine, NameStore, ChatCommand
//! ├── transport.rs  - tokio-tungstenite WebSocket transport
//! └── client.rs     - ChatClient driver
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use twshell::frontend::chat::{ChatClient, MemoryNameStore};
//! use twshell::shared::config::AppConfig;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::builder()
//!     .chat_url("ws://localhost:5002/ws".to_string())
//!     .build()?;
//! let mut client = ChatClient::from_config(MemoryNameStore::new(), &config, false)?;
//! client.start().await?;
//! client.submit_name("alice").await?;
//! client.wait_until_joined().await;
//! client.send_message("hola").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod session;
pub mod transport;

pub use client::ChatClient;
pub use session::{ChatCommand, ChatEntry, ChatPhase, ChatSession, MemoryNameStore, NameStore, SessionError};
pub use transport::{ChatClientError, ChatTransport};
