/**
 * API Proxy
 *
 * Shell-mediated REST forwarding. A caller names a registered service and
 * an endpoint path; the proxy resolves the service's base URL through the
 * registry and issues the request there.
 *
 * # Error Mapping
 *
 * - Unregistered service → `ServiceNotFound`, no request is issued
 * - Connection refused / DNS / timeout → `TransportError`
 * - Reachable service answering non-2xx → `UpstreamError` with the status
 *   and the decoded error body when it is JSON
 *
 * # Example
 *
 * ```rust,no_run
 * use twshell::shared::proxy::{ApiProxy, HttpMethod};
 * # async fn demo(proxy: ApiProxy) -> Result<(), twshell::shared::ShellError> {
 * let tasks = proxy.call("tasks", "api/tasks", HttpMethod::Get, None).await?;
 * println!("{}", tasks["total"]);
 * # Ok(())
 * # }
 * ```
 */
use crate::shared::config::AppConfig;
use crate::shared::error::ShellError;
use crate::shared::registry::ServiceRegistry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request headers never forwarded upstream
pub const HOP_BY_HOP_HEADERS: &[&str] = &[
    "host",
    "content-length",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Upstream response headers dropped before replying
const EXCLUDED_RESPONSE_HEADERS: &[&str] = &[
    "content-encoding",
    "content-length",
    "transfer-encoding",
    "connection",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|h| h.eq_ignore_ascii_case(name))
}

/// Methods the proxy forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Whether a request body is sent for this verb
    pub fn has_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Parse a method name; `None` for verbs the proxy does not forward
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body carried by a proxy call
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyBody {
    /// JSON-encoded body
    Json(serde_json::Value),
    /// Opaque bytes forwarded as received
    Raw(Vec<u8>),
}

/// One forwarding request
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyCall {
    pub service: String,
    pub endpoint: String,
    pub method: HttpMethod,
    /// Raw query string without the leading `?`
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<ProxyBody>,
}

impl ProxyCall {
    pub fn new(service: impl Into<String>, endpoint: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            service: service.into(),
            endpoint: endpoint.into(),
            method,
            query: None,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = (!query.is_empty()).then_some(query);
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(ProxyBody::Json(body));
        self
    }

    pub fn with_raw_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(ProxyBody::Raw(body));
        self
    }

    /// Add a request header; hop-by-hop headers are silently skipped
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        if !is_hop_by_hop(&name) {
            self.headers.push((name, value.into()));
        }
        self
    }
}

/// Raw upstream reply
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    /// Response headers minus framing/encoding headers
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Join a base URL and an endpoint path with exactly one `/`
pub fn join_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Registry-backed HTTP forwarder
#[derive(Debug, Clone)]
pub struct ApiProxy {
    registry: Arc<ServiceRegistry>,
    client: reqwest::Client,
}

impl ApiProxy {
    /// Create a proxy with a client honoring `config.proxy_timeout`
    pub fn new(registry: ServiceRegistry, config: &AppConfig) -> Result<Self, ShellError> {
        let client = reqwest::Client::builder()
            .timeout(config.proxy_timeout)
            .build()
            .map_err(|e| ShellError::config(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self::with_client(registry, client))
    }

    pub fn with_client(registry: ServiceRegistry, client: reqwest::Client) -> Self {
        Self {
            registry: Arc::new(registry),
            client,
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Target URL for a call, including its query string
    pub fn target_url(&self, call: &ProxyCall) -> Result<String, ShellError> {
        let descriptor = self.registry.resolve(&call.service)?;
        let mut url = join_url(&descriptor.url, &call.endpoint);
        if let Some(query) = &call.query {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(query);
        }
        Ok(url)
    }

    /// WebSocket URL for a call: the target URL with `http` mapped to `ws`
    pub fn socket_url(&self, call: &ProxyCall) -> Result<String, ShellError> {
        let url = self.target_url(call)?;
        if let Some(rest) = url.strip_prefix("https://") {
            Ok(format!("wss://{}", rest))
        } else if let Some(rest) = url.strip_prefix("http://") {
            Ok(format!("ws://{}", rest))
        } else {
            Ok(url)
        }
    }

    /// Forward a call and return the raw upstream reply
    ///
    /// Any HTTP status counts as a reply; only failure to obtain one is an
    /// error.
    pub async fn forward(&self, call: &ProxyCall) -> Result<UpstreamResponse, ShellError> {
        let url = self.target_url(call)?;
        tracing::info!("[Proxy] {} {} → {}", call.method, call.service, url);

        let mut request = self.client.request(call.method.to_reqwest(), &url);
        for (name, value) in &call.headers {
            if !is_hop_by_hop(name) {
                request = request.header(name.as_str(), value.as_str());
            }
        }
        if call.method.has_body() {
            request = match &call.body {
                Some(ProxyBody::Json(value)) => request.json(value),
                Some(ProxyBody::Raw(bytes)) => request.body(bytes.clone()),
                None => request,
            };
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("[Proxy] {} unreachable: {}", call.service, e);
            ShellError::transport(&call.service, e.to_string())
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| {
                !EXCLUDED_RESPONSE_HEADERS
                    .iter()
                    .any(|h| h.eq_ignore_ascii_case(name.as_str()))
            })
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| ShellError::transport(&call.service, e.to_string()))?
            .to_vec();

        Ok(UpstreamResponse {
            status,
            content_type,
            headers,
            body,
        })
    }

    /// Call a service endpoint and decode its JSON reply
    ///
    /// # Arguments
    ///
    /// * `service` - Registered service name
    /// * `endpoint` - Path below the service's base URL
    /// * `method` - HTTP verb
    /// * `body` - JSON body, sent only for POST/PUT/PATCH
    ///
    /// # Returns
    ///
    /// The decoded body; an empty 2xx body decodes to `null`
    pub async fn call(
        &self,
        service: &str,
        endpoint: &str,
        method: HttpMethod,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ShellError> {
        let mut call = ProxyCall::new(service, endpoint, method);
        if let Some(body) = body {
            call = call.with_json(body);
        }
        self.call_with(&call).await
    }

    /// `call` for a prepared `ProxyCall`
    pub async fn call_with(&self, call: &ProxyCall) -> Result<serde_json::Value, ShellError> {
        let response = self.forward(call).await?;

        if !response.is_success() {
            let payload = serde_json::from_slice(&response.body).ok();
            return Err(ShellError::upstream(&call.service, response.status, payload));
        }

        if response.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}
