/**
 * Chat Hub
 *
 * Arena of live chat sessions keyed by connection id. Each session owns an
 * outbound channel drained by its WebSocket task.
 *
 * Every mutation (connect, join, disconnect) and the broadcast it triggers
 * run under one lock, so no session can observe a join notice for someone
 * who has already left, and no broadcast is interleaved with another.
 * Sends go through unbounded channels and never block while the lock is
 * held.
 *
 * # Rules
 *
 * - `join` binds a name (placeholder `user-XXXX` when blank), tells every
 *   other connected session and welcomes the joiner; joining again renames
 * - `message` from a joined session is broadcast to every connected session
 *   including the sender; messages before join or blank after trimming are
 *   dropped
 * - `disconnect` removes the session; a joined session's departure is
 *   announced to the rest
 */
use crate::shared::chat::{
    joined_notice, left_notice, placeholder_name, welcome_notice, ChatMessage, ClientEvent,
    ServerEvent,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use uuid::Uuid;

struct Session {
    name: Option<String>,
    outbound: mpsc::UnboundedSender<String>,
}

#[derive(Default)]
struct HubInner {
    sessions: HashMap<Uuid, Session>,
}

impl HubInner {
    fn send_to(&self, id: Uuid, event: &ServerEvent) {
        if let Some(session) = self.sessions.get(&id) {
            let _ = session.outbound.send(event.to_frame());
        }
    }

    fn broadcast(&self, event: &ServerEvent, except: Option<Uuid>) {
        let frame = event.to_frame();
        for (id, session) in &self.sessions {
            if Some(*id) != except {
                let _ = session.outbound.send(frame.clone());
            }
        }
    }
}

/// Shared chat session table
#[derive(Clone, Default)]
pub struct ChatHub {
    inner: Arc<Mutex<HubInner>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HubInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new connection
    ///
    /// # Returns
    ///
    /// The connection id and the receiver of frames destined for it
    pub fn connect(&self) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let id = Uuid::new_v4();
        let (outbound, rx) = mpsc::unbounded_channel();
        self.lock().sessions.insert(
            id,
            Session {
                name: None,
                outbound,
            },
        );
        tracing::info!("[Chat] Client connected: {}", id);
        (id, rx)
    }

    /// Dispatch a raw text frame from `id`; unparseable frames are ignored
    pub fn handle_frame(&self, id: Uuid, frame: &str) {
        match ClientEvent::parse(frame) {
            Some(ClientEvent::Join(name)) => {
                self.join(id, &name);
            }
            Some(ClientEvent::Message(text)) => {
                self.message(id, &text);
            }
            None => tracing::debug!("[Chat] Ignoring malformed frame from {}", id),
        }
    }

    /// Bind a display name to `id`
    ///
    /// # Returns
    ///
    /// The bound name, or `None` if `id` is not connected
    pub fn join(&self, id: Uuid, requested: &str) -> Option<String> {
        let mut inner = self.lock();
        let session = inner.sessions.get_mut(&id)?;

        let name = match requested.trim() {
            "" => placeholder_name(&id.to_string()),
            trimmed => trimmed.to_string(),
        };
        session.name = Some(name.clone());

        inner.broadcast(&ServerEvent::System(joined_notice(&name)), Some(id));
        inner.send_to(id, &ServerEvent::System(welcome_notice(&name)));
        tracing::info!("[Chat] {} joined as {}", id, name);
        Some(name)
    }

    /// Broadcast a message from `id`
    ///
    /// # Returns
    ///
    /// `false` when the message was dropped
    pub fn message(&self, id: Uuid, text: &str) -> bool {
        let inner = self.lock();
        let Some(name) = inner.sessions.get(&id).and_then(|s| s.name.clone()) else {
            tracing::debug!("[Chat] Dropping message from {} before join", id);
            return false;
        };
        if text.trim().is_empty() {
            return false;
        }
        inner.broadcast(&ServerEvent::Message(ChatMessage::new(name, text)), None);
        true
    }

    /// Remove `id`, announcing the departure if it had joined
    ///
    /// # Returns
    ///
    /// The departed session's name, if it had joined
    pub fn disconnect(&self, id: Uuid) -> Option<String> {
        let mut inner = self.lock();
        let session = inner.sessions.remove(&id)?;
        tracing::info!("[Chat] Client disconnected: {}", id);
        let name = session.name?;
        inner.broadcast(&ServerEvent::System(left_notice(&name)), None);
        Some(name)
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn joined_count(&self) -> usize {
        self.lock()
            .sessions
            .values()
            .filter(|s| s.name.is_some())
            .count()
    }

    pub fn name_of(&self, id: Uuid) -> Option<String> {
        self.lock().sessions.get(&id).and_then(|s| s.name.clone())
    }
}
