//! Shared Module
//!
//! Platform-agnostic types and client-side primitives used by both the
//! servers and the shell frontend.
//!
//! # Overview
//!
//! - Service descriptors and the read-only Service Registry
//! - The Event Bus and its cross-frame relay
//! - The API Proxy
//! - Chat wire events and task types
//! - Configuration and the shared error taxonomy

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Service descriptors and icons
pub mod service;

/// Name → descriptor registry
pub mod registry;

/// In-page publish/subscribe bus
pub mod bus;

/// Cross-frame bus relay
pub mod relay;

/// Registry-backed REST forwarding
pub mod proxy;

/// Chat wire events
pub mod chat;

/// Task types
pub mod task;

/// Re-export commonly used types for convenience
pub use bus::{BusEvent, EventBus, Subscription};
pub use chat::{ChatMessage, ClientEvent, ServerEvent};
pub use config::{AppConfig, AppConfigBuilder, ConfigError};
pub use error::ShellError;
pub use proxy::{ApiProxy, HttpMethod, ProxyCall, UpstreamResponse};
pub use registry::ServiceRegistry;
pub use relay::{BusBridge, FrameEnvelope, FrameIsolation, FrameRelay};
pub use service::{Icon, ServiceDescriptor};
pub use task::{Task, TaskPriority, TaskStats, TaskStatus};
