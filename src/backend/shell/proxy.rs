/**
 * Shell Forwarding Handlers
 *
 * Two forwarding surfaces share the `ApiProxy`:
 *
 * - `/api/proxy/{service}/{*endpoint}` - REST calls made by micro-frontends.
 *   Failures are JSON: unknown service → 404, unreachable → 503.
 * - `/{service}/{*path}` - the browser-visible passthrough the iframes
 *   load. Failures render the 404 page. WebSocket upgrades on this path
 *   are tunnelled to the upstream socket at the same path.
 *
 * Upstream status, headers and body are returned as received, minus the
 * framing headers the proxy strips. Hop-by-hop request headers are never
 * forwarded.
 */

use crate::shared::proxy::{ApiProxy, HttpMethod, ProxyCall, UpstreamResponse};
use crate::shared::ShellError;
use axum::{
    body::Body,
    extract::{
        ws::{self, rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        Path, RawQuery, State,
    },
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message as UpstreamMessage;

const NOT_FOUND_PAGE: &str = include_str!("../../../templates/404.html");

/// Request headers dropped in addition to the hop-by-hop set
///
/// The upstream must answer uncompressed since `content-encoding` is not
/// relayed back.
const SKIPPED_REQUEST_HEADERS: &[&str] = &["accept-encoding"];

/// Everything the forwarding handlers take from the incoming request
struct Incoming {
    method: Method,
    query: Option<String>,
    headers: HeaderMap,
    body: Bytes,
}

impl Incoming {
    fn into_call(self, service: &str, endpoint: &str) -> Option<ProxyCall> {
        let method = HttpMethod::parse(self.method.as_str())?;
        let mut call = ProxyCall::new(service, endpoint, method);
        if let Some(query) = self.query {
            call = call.with_query(query);
        }
        for (name, value) in &self.headers {
            if SKIPPED_REQUEST_HEADERS.contains(&name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                call = call.with_header(name.as_str(), value);
            }
        }
        if !self.body.is_empty() {
            call = call.with_raw_body(self.body.to_vec());
        }
        Some(call)
    }
}

/// `* /api/proxy/{service}`
pub async fn proxy_api_root(
    State(proxy): State<ApiProxy>,
    Path(service): Path<String>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let incoming = Incoming { method, query, headers, body };
    forward_api(&proxy, &service, "", incoming).await
}

/// `* /api/proxy/{service}/{*endpoint}`
pub async fn proxy_api(
    State(proxy): State<ApiProxy>,
    Path((service, endpoint)): Path<(String, String)>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let incoming = Incoming { method, query, headers, body };
    forward_api(&proxy, &service, &endpoint, incoming).await
}

/// `* /{service}`
pub async fn passthrough_root(
    State(proxy): State<ApiProxy>,
    Path(service): Path<String>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Ok(upgrade) = upgrade {
        return tunnel(&proxy, &service, "", query, upgrade).await;
    }
    let incoming = Incoming { method, query, headers, body };
    forward_page(&proxy, &service, "", incoming).await
}

/// `* /{service}/{*path}`
pub async fn passthrough(
    State(proxy): State<ApiProxy>,
    Path((service, path)): Path<(String, String)>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Ok(upgrade) = upgrade {
        return tunnel(&proxy, &service, &path, query, upgrade).await;
    }
    let incoming = Incoming { method, query, headers, body };
    forward_page(&proxy, &service, &path, incoming).await
}

async fn forward_api(proxy: &ApiProxy, service: &str, endpoint: &str, incoming: Incoming) -> Response {
    let Some(call) = incoming.into_call(service, endpoint) else {
        return method_not_allowed();
    };
    match proxy.forward(&call).await {
        Ok(upstream) => relay(upstream),
        Err(ShellError::ServiceNotFound { .. }) => {
            tracing::warn!("[Shell] API call for unknown service '{}'", service);
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": "Servicio no encontrado" })),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("[Shell] API call to '{}' failed: {}", service, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "error": format!("Error al comunicarse con {}", service),
                    "detail": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn forward_page(proxy: &ApiProxy, service: &str, path: &str, incoming: Incoming) -> Response {
    let Some(call) = incoming.into_call(service, path) else {
        return method_not_allowed();
    };
    match proxy.forward(&call).await {
        Ok(upstream) => relay(upstream),
        Err(e) => {
            tracing::warn!("[Shell] Passthrough to '{}' failed: {}", service, e);
            (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response()
        }
    }
}

/// Dial the upstream socket, then accept the client's upgrade
///
/// The upstream is dialled first so an unreachable service fails the
/// handshake instead of accepting a socket that closes immediately.
async fn tunnel(
    proxy: &ApiProxy,
    service: &str,
    path: &str,
    query: Option<String>,
    upgrade: WebSocketUpgrade,
) -> Response {
    let mut call = ProxyCall::new(service, path, HttpMethod::Get);
    if let Some(query) = query {
        call = call.with_query(query);
    }
    let url = match proxy.socket_url(&call) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!("[Shell] WebSocket tunnel to '{}' refused: {}", service, e);
            return (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response();
        }
    };
    let upstream = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((upstream, _)) => upstream,
        Err(e) => {
            tracing::warn!("[Shell] WebSocket tunnel to {} failed: {}", url, e);
            return (StatusCode::BAD_GATEWAY, Html(NOT_FOUND_PAGE)).into_response();
        }
    };
    tracing::info!("[Shell] Tunnelling WebSocket for '{}' to {}", service, url);
    upgrade.on_upgrade(move |socket| pump(socket, upstream))
}

/// Copy frames both ways until either side closes
async fn pump<S>(client: WebSocket, upstream: tokio_tungstenite::WebSocketStream<S>)
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    let (mut client_tx, mut client_rx) = client.split();
    let (mut upstream_tx, mut upstream_rx) = upstream.split();

    let downstream = tokio::spawn(async move {
        while let Some(Ok(msg)) = upstream_rx.next().await {
            let Some(msg) = from_upstream(msg) else {
                continue;
            };
            let closing = matches!(msg, ws::Message::Close(_));
            if client_tx.send(msg).await.is_err() || closing {
                break;
            }
        }
        let _ = client_tx.close().await;
    });

    while let Some(Ok(msg)) = client_rx.next().await {
        let closing = matches!(msg, ws::Message::Close(_));
        if upstream_tx.send(to_upstream(msg)).await.is_err() || closing {
            break;
        }
    }
    let _ = upstream_tx.close().await;
    let _ = downstream.await;
}

fn to_upstream(msg: ws::Message) -> UpstreamMessage {
    match msg {
        ws::Message::Text(text) => UpstreamMessage::text(text.as_str()),
        ws::Message::Binary(data) => UpstreamMessage::Binary(data),
        ws::Message::Ping(data) => UpstreamMessage::Ping(data),
        ws::Message::Pong(data) => UpstreamMessage::Pong(data),
        ws::Message::Close(_) => UpstreamMessage::Close(None),
    }
}

fn from_upstream(msg: UpstreamMessage) -> Option<ws::Message> {
    match msg {
        UpstreamMessage::Text(text) => Some(ws::Message::Text(text.as_str().into())),
        UpstreamMessage::Binary(data) => Some(ws::Message::Binary(data)),
        UpstreamMessage::Ping(data) => Some(ws::Message::Ping(data)),
        UpstreamMessage::Pong(data) => Some(ws::Message::Pong(data)),
        UpstreamMessage::Close(_) => Some(ws::Message::Close(None)),
        UpstreamMessage::Frame(_) => None,
    }
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Método no soportado" })),
    )
        .into_response()
}

/// Turn an upstream reply into the shell's response
fn relay(upstream: UpstreamResponse) -> Response {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    for (name, value) in &upstream.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.append(name, value);
            }
            _ => tracing::debug!("[Shell] Dropping unrepresentable header {}", name),
        }
    }
    response
}
