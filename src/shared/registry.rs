/**
 * Service Registry
 *
 * Read-only snapshot mapping micro-frontend names to their descriptors.
 * The shell loads it once at startup; there is no mutation API.
 *
 * # Sources
 *
 * - HTTP: `GET {shell}/api/microfrontends` (relative URLs are resolved
 *   against the shell base URL)
 * - TOML file with `[services.<key>]` tables
 * - In-memory descriptors
 *
 * Any failure to reach or parse a source is reported as
 * `ShellError::ConfigUnavailable`; it never yields a partial registry.
 */
use crate::shared::config::AppConfig;
use crate::shared::error::ShellError;
use crate::shared::service::ServiceDescriptor;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Immutable name → descriptor snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ServiceRegistry {
    services: BTreeMap<String, ServiceDescriptor>,
}

/// Layout of a TOML registry file
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    services: BTreeMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Build a registry from descriptors, rejecting duplicate keys
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<Self, ShellError> {
        let mut services = BTreeMap::new();
        for descriptor in descriptors {
            if descriptor.key.is_empty() {
                return Err(ShellError::config("service descriptor without a key"));
            }
            if services.contains_key(&descriptor.key) {
                return Err(ShellError::config(format!(
                    "duplicate service key '{}'",
                    descriptor.key
                )));
            }
            services.insert(descriptor.key.clone(), descriptor);
        }
        Ok(Self { services })
    }

    /// Build a registry from a keyed map, filling each descriptor's key
    fn from_keyed(map: BTreeMap<String, ServiceDescriptor>, base: Option<&Url>) -> Result<Self, ShellError> {
        let mut services = BTreeMap::new();
        for (key, mut descriptor) in map {
            descriptor.key = key.clone();
            if let Some(base) = base {
                descriptor.url = resolve_url(base, &descriptor.url)?;
            }
            services.insert(key, descriptor);
        }
        Ok(Self { services })
    }

    /// Parse the registry endpoint's JSON payload
    ///
    /// # Arguments
    ///
    /// * `json` - JSON object keyed by service name
    /// * `base` - Base URL used to resolve relative service URLs
    pub fn from_json(json: &str, base: Option<&Url>) -> Result<Self, ShellError> {
        let map: BTreeMap<String, ServiceDescriptor> = serde_json::from_str(json)
            .map_err(|e| ShellError::config(format!("malformed registry payload: {}", e)))?;
        Self::from_keyed(map, base)
    }

    /// Parse a TOML registry document
    pub fn from_toml(document: &str) -> Result<Self, ShellError> {
        let file: RegistryFile = toml::from_str(document)
            .map_err(|e| ShellError::config(format!("malformed registry file: {}", e)))?;
        Self::from_keyed(file.services, None)
    }

    /// Load a TOML registry file from disk
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ShellError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| {
            ShellError::config(format!("cannot read registry file {:?}: {}", path, e))
        })?;
        Self::from_toml(&document)
    }

    /// Fetch the registry from a shell's `/api/microfrontends` endpoint
    ///
    /// # Errors
    ///
    /// `ConfigUnavailable` when the endpoint is unreachable, answers with a
    /// non-2xx status, or returns a malformed payload.
    pub async fn load(client: &reqwest::Client, shell_url: &str) -> Result<Self, ShellError> {
        let base = Url::parse(shell_url)
            .map_err(|e| ShellError::config(format!("invalid shell URL {}: {}", shell_url, e)))?;
        let endpoint = base
            .join("/api/microfrontends")
            .map_err(|e| ShellError::config(e.to_string()))?;

        tracing::info!("[Registry] Loading micro-frontend configuration from {}", endpoint);

        let response = client
            .get(endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ShellError::config(format!("registry unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(ShellError::config(format!(
                "registry endpoint returned HTTP {}",
                response.status().as_u16()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ShellError::config(format!("registry body unreadable: {}", e)))?;

        let registry = Self::from_json(&body, Some(&base))?;
        tracing::info!("[Registry] Loaded {} micro-frontends", registry.len());
        Ok(registry)
    }

    /// Load the registry from the shell configured in `config`
    pub async fn load_from_shell(config: &AppConfig) -> Result<Self, ShellError> {
        let shell_url = config
            .require_shell_url()
            .map_err(|e| ShellError::config(e.to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(config.load_timeout)
            .build()
            .map_err(|e| ShellError::config(e.to_string()))?;
        Self::load(&client, shell_url).await
    }

    /// Resolve a service name to its descriptor
    pub fn resolve(&self, name: &str) -> Result<&ServiceDescriptor, ShellError> {
        self.services
            .get(name)
            .ok_or_else(|| ShellError::not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Registered keys in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

fn resolve_url(base: &Url, url: &str) -> Result<String, ShellError> {
    base.join(url)
        .map(|u| u.to_string().trim_end_matches('/').to_string())
        .map_err(|e| ShellError::config(format!("invalid service URL '{}': {}", url, e)))
}
