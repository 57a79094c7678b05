/**
 * Chat WebSocket Handler
 *
 * `GET /ws` upgrades to a WebSocket and runs one chat session until the
 * client goes away.
 *
 * # Session Lifecycle
 *
 * 1. Register with the hub and obtain the outbound receiver
 * 2. Spawn a forwarder that writes hub frames to the socket
 * 3. Feed every incoming text frame to the hub
 * 4. On close or error, remove the session from the hub; dropping its
 *    sender ends the forwarder
 */

use crate::backend::chat::state::ChatHub;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};

/// Upgrade handler for `GET /ws`
pub async fn handle_ws_upgrade(ws: WebSocketUpgrade, State(hub): State<ChatHub>) -> Response {
    ws.on_upgrade(move |socket| run_chat_session(socket, hub))
}

/// Run a chat session for one connected client
pub async fn run_chat_session(socket: WebSocket, hub: ChatHub) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (id, mut outbound) = hub.connect();

    let forwarder = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(text) => hub.handle_frame(id, text.as_str()),
            Message::Binary(data) => match std::str::from_utf8(&data) {
                Ok(text) => hub.handle_frame(id, text),
                Err(_) => tracing::debug!("[Chat] Ignoring non-UTF8 frame from {}", id),
            },
            Message::Close(_) => break,
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    hub.disconnect(id);
    let _ = forwarder.await;
}
