//! Application configuration module
//!
//! Provides the client-side configuration shared by the compositor, the API
//! proxy and the chat client.

use std::time::Duration;
use thiserror::Error;

/// Default timeout for proxied calls and root-document fetches
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default time to wait for a confirmed chat connection
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shell base URL (origin of the hosting page)
    pub shell_url: Option<String>,
    /// Timeout for API proxy calls
    pub proxy_timeout: Duration,
    /// Timeout for micro-frontend root document fetches
    pub load_timeout: Duration,
    /// Chat connect timeout before the name prompt is reopened
    pub connect_timeout: Duration,
    /// Chat endpoint used when running standalone
    pub chat_url: Option<String>,
    /// Chat endpoint used when embedded inside the shell
    pub chat_embedded_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            shell_url: None,
            proxy_timeout: DEFAULT_REQUEST_TIMEOUT,
            load_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            chat_url: None,
            chat_embedded_url: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.shell_url, &self.chat_url, &self.chat_embedded_url]
            .into_iter()
            .flatten()
        {
            reqwest::Url::parse(url).map_err(|_| ConfigError::InvalidUrl(url.clone()))?;
        }
        if self.proxy_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("proxy_timeout"));
        }
        if self.load_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("load_timeout"));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("connect_timeout"));
        }
        Ok(())
    }

    /// Shell base URL, required for registry loading over HTTP
    pub fn require_shell_url(&self) -> Result<&str, ConfigError> {
        self.shell_url
            .as_deref()
            .ok_or(ConfigError::MissingValue("shell_url"))
    }

    /// Chat endpoint for the given embedding context
    ///
    /// Embedded sessions use the dedicated embedded endpoint when one is
    /// configured and fall back to the standalone endpoint otherwise.
    pub fn chat_endpoint(&self, embedded: bool) -> Option<&str> {
        if embedded {
            if let Some(url) = self.chat_embedded_url.as_deref() {
                return Some(url);
            }
        }
        self.chat_url.as_deref()
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    shell_url: Option<String>,
    proxy_timeout: Option<Duration>,
    load_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    chat_url: Option<String>,
    chat_embedded_url: Option<String>,
}

impl AppConfigBuilder {
    /// Set the shell URL
    pub fn shell_url(mut self, url: String) -> Self {
        self.shell_url = Some(url);
        self
    }

    pub fn proxy_timeout(mut self, timeout: Duration) -> Self {
        self.proxy_timeout = Some(timeout);
        self
    }

    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the standalone chat WebSocket URL
    pub fn chat_url(mut self, url: String) -> Self {
        self.chat_url = Some(url);
        self
    }

    /// Set the chat WebSocket URL used from inside the shell
    pub fn chat_embedded_url(mut self, url: String) -> Self {
        self.chat_embedded_url = Some(url);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            shell_url: self.shell_url,
            proxy_timeout: self.proxy_timeout.unwrap_or(defaults.proxy_timeout),
            load_timeout: self.load_timeout.unwrap_or(defaults.load_timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            chat_url: self.chat_url,
            chat_embedded_url: self.chat_embedded_url,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("timeout must be non-zero: {0}")]
    InvalidTimeout(&'static str),
}
