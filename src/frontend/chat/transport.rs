//! WebSocket transport for the chat client.

use crate::shared::chat::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Chat client failures
#[derive(Debug, Error)]
pub enum ChatClientError {
    #[error("no chat endpoint configured")]
    MissingEndpoint,
    #[error("connection to {endpoint} failed: {message}")]
    Connect { endpoint: String, message: String },
    #[error("no connection to {endpoint} after {timeout:?}")]
    ConnectTimeout {
        endpoint: String,
        timeout: std::time::Duration,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("not connected")]
    NotConnected,
    #[error(transparent)]
    Session(#[from] super::session::SessionError),
}

/// An open chat WebSocket
pub struct ChatTransport {
    ws: WsStream,
}

impl ChatTransport {
    pub async fn connect(endpoint: &str) -> Result<Self, ChatClientError> {
        let (ws, _) = connect_async(endpoint)
            .await
            .map_err(|e| ChatClientError::Connect {
                endpoint: endpoint.to_string(),
                message: e.to_string(),
            })?;
        tracing::info!("[Chat] Connected to {}", endpoint);
        Ok(Self { ws })
    }

    pub async fn send(&mut self, event: &ClientEvent) -> Result<(), ChatClientError> {
        self.ws
            .send(Message::text(event.to_frame()))
            .await
            .map_err(|e| ChatClientError::Transport(e.to_string()))
    }

    /// Next server event; `None` once the connection is closed
    ///
    /// Frames that do not parse as server events are skipped.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        while let Some(frame) = self.ws.next().await {
            match frame {
                Ok(Message::Text(text)) => match ServerEvent::parse(&text) {
                    Some(event) => return Some(event),
                    None => tracing::debug!("[Chat] Ignoring unrecognized frame"),
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("[Chat] Transport error: {}", e);
                    return None;
                }
            }
        }
        None
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
