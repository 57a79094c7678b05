/**
 * Chat Session State Machine
 *
 * Sans-IO client half of the realtime chat. The session consumes user
 * actions and transport notifications and answers with `ChatCommand`s that
 * a driver executes; it never touches a socket or a timer itself.
 *
 * # States
 *
 * ```text
 * Disconnected → Connecting → AwaitingJoin → Active
 *      ↑______________|____________|___________|   (close / disconnect)
 * ```
 *
 * - Without a stored display name the session stays `Disconnected` and
 *   asks for one before any transport activity
 * - Embedded sessions discard the stored name on creation and always ask
 * - `AwaitingJoin` ends when the server's welcome notice arrives; the name
 *   it carries is the one the server bound (a placeholder if none was sent)
 * - A connect timer guards `Connecting`; if it fires first the attempt is
 *   abandoned and the name prompt reopens
 */
use crate::shared::chat::{is_placeholder_name, ChatMessage, ClientEvent, ServerEvent};
use std::time::Duration;
use thiserror::Error;

const WELCOME_PREFIX: &str = "Bienvenido, ";

/// Tab-scoped storage for the chosen display name
pub trait NameStore: Send {
    fn load(&self) -> Option<String>;
    fn store(&mut self, name: &str);
    fn clear(&mut self);
}

/// In-memory `NameStore`
#[derive(Debug, Clone, Default)]
pub struct MemoryNameStore {
    name: Option<String>,
}

impl MemoryNameStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl NameStore for MemoryNameStore {
    fn load(&self) -> Option<String> {
        self.name.clone()
    }

    fn store(&mut self, name: &str) {
        self.name = Some(name.to_string());
    }

    fn clear(&mut self) {
        self.name = None;
    }
}

/// Connection phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Disconnected,
    Connecting,
    /// Transport open, join sent, welcome not yet received
    AwaitingJoin,
    Active,
}

/// Side effect requested from the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Show the display-name prompt
    PromptForName,
    /// Open the transport
    Connect { endpoint: String, attempt: u64 },
    /// Call `on_connect_timeout(attempt)` after `timeout`
    StartConnectTimer { attempt: u64, timeout: Duration },
    /// Send a frame over the open transport
    Send(ClientEvent),
    /// Close the transport
    Disconnect,
}

/// Line in the visible transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    Message(ChatMessage),
    System(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("messages can only be sent after joining")]
    NotJoined,
}

/// Client chat session
pub struct ChatSession<S: NameStore> {
    store: S,
    endpoint: String,
    embedded: bool,
    connect_timeout: Duration,
    phase: ChatPhase,
    /// Name requested by the user (may be empty)
    requested_name: Option<String>,
    /// Name confirmed by the server's welcome
    joined_name: Option<String>,
    attempt: u64,
    prompt_open: bool,
    transcript: Vec<ChatEntry>,
}

impl<S: NameStore> ChatSession<S> {
    /// Create a session
    ///
    /// # Arguments
    ///
    /// * `store` - Tab-scoped name storage
    /// * `endpoint` - WebSocket endpoint for this embedding context
    /// * `embedded` - Whether the chat runs inside the shell's frame
    /// * `connect_timeout` - How long `Connecting` may last
    pub fn new(mut store: S, endpoint: impl Into<String>, embedded: bool, connect_timeout: Duration) -> Self {
        if embedded {
            store.clear();
        }
        Self {
            store,
            endpoint: endpoint.into(),
            embedded,
            connect_timeout,
            phase: ChatPhase::Disconnected,
            requested_name: None,
            joined_name: None,
            attempt: 0,
            prompt_open: false,
            transcript: Vec::new(),
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_prompt_open(&self) -> bool {
        self.prompt_open
    }

    /// Name bound by the server, once joined
    pub fn joined_name(&self) -> Option<&str> {
        self.joined_name.as_deref()
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Initial load: connect with the stored name or ask for one
    pub fn start(&mut self) -> Vec<ChatCommand> {
        match self.store.load() {
            Some(name) if !name.trim().is_empty() => {
                self.requested_name = Some(name);
                self.begin_connect()
            }
            _ => self.open_prompt(),
        }
    }

    /// The user submitted the name prompt
    ///
    /// An empty name is accepted; the server substitutes a placeholder.
    /// While connected this re-joins under the new name.
    pub fn submit_name(&mut self, name: &str) -> Vec<ChatCommand> {
        let name = name.trim().to_string();
        self.store.store(&name);
        self.requested_name = Some(name.clone());
        self.prompt_open = false;

        match self.phase {
            ChatPhase::Disconnected => self.begin_connect(),
            ChatPhase::Connecting => Vec::new(),
            ChatPhase::AwaitingJoin | ChatPhase::Active => {
                self.phase = ChatPhase::AwaitingJoin;
                vec![ChatCommand::Send(ClientEvent::Join(name))]
            }
        }
    }

    /// The user asked to change their display name
    pub fn change_name(&mut self) -> Vec<ChatCommand> {
        self.store.clear();
        self.open_prompt()
    }

    /// Transport reported an open connection
    pub fn on_connected(&mut self) -> Vec<ChatCommand> {
        if self.phase != ChatPhase::Connecting {
            return Vec::new();
        }
        self.phase = ChatPhase::AwaitingJoin;
        let name = self.requested_name.clone().unwrap_or_default();
        vec![ChatCommand::Send(ClientEvent::Join(name))]
    }

    /// Connect timer fired
    pub fn on_connect_timeout(&mut self, attempt: u64) -> Vec<ChatCommand> {
        if !self.is_pending(attempt) {
            return Vec::new();
        }
        tracing::warn!("[Chat] No connection after {:?}, asking for name again", self.connect_timeout);
        self.abandon_connect()
    }

    /// Transport refused the connection before the timer fired
    pub fn on_connect_failed(&mut self, attempt: u64, reason: &str) -> Vec<ChatCommand> {
        if !self.is_pending(attempt) {
            return Vec::new();
        }
        tracing::warn!("[Chat] Connection to {} failed: {}", self.endpoint, reason);
        self.abandon_connect()
    }

    fn is_pending(&self, attempt: u64) -> bool {
        attempt == self.attempt && self.phase == ChatPhase::Connecting
    }

    fn abandon_connect(&mut self) -> Vec<ChatCommand> {
        self.phase = ChatPhase::Disconnected;
        let mut commands = vec![ChatCommand::Disconnect];
        commands.extend(self.open_prompt());
        commands
    }

    /// Transport closed; the next connection is a brand-new session
    pub fn on_closed(&mut self) -> Vec<ChatCommand> {
        self.phase = ChatPhase::Disconnected;
        self.joined_name = None;
        Vec::new()
    }

    /// Reconnect after transport loss, re-joining under the requested name
    pub fn reconnect(&mut self) -> Vec<ChatCommand> {
        if self.phase != ChatPhase::Disconnected {
            return Vec::new();
        }
        match self.requested_name {
            Some(_) => self.begin_connect(),
            None => self.open_prompt(),
        }
    }

    /// Explicit disconnect from any state
    pub fn disconnect(&mut self) -> Vec<ChatCommand> {
        let was_open = self.phase != ChatPhase::Disconnected;
        self.phase = ChatPhase::Disconnected;
        self.joined_name = None;
        self.attempt += 1;
        if was_open {
            vec![ChatCommand::Disconnect]
        } else {
            Vec::new()
        }
    }

    /// The user typed a message
    ///
    /// Blank text is a no-op.
    pub fn send_message(&mut self, text: &str) -> Result<Vec<ChatCommand>, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        if self.phase != ChatPhase::Active {
            return Err(SessionError::NotJoined);
        }
        Ok(vec![ChatCommand::Send(ClientEvent::Message(text.to_string()))])
    }

    /// A server event arrived
    pub fn on_server_event(&mut self, event: ServerEvent) {
        if let ServerEvent::System(text) = &event {
            if self.phase == ChatPhase::AwaitingJoin {
                if let Some(name) = self.welcomed_name(text) {
                    tracing::info!("[Chat] Joined as {}", name);
                    self.joined_name = Some(name);
                    self.phase = ChatPhase::Active;
                }
            }
        }
        self.transcript.push(match event {
            ServerEvent::Message(message) => ChatEntry::Message(message),
            ServerEvent::System(text) => ChatEntry::System(text),
        });
    }

    /// Name confirmed by `text` if it is this session's welcome
    ///
    /// Other users' join notices share the welcome prefix, so a requested
    /// name must match exactly. An empty request only accepts a placeholder.
    fn welcomed_name(&self, text: &str) -> Option<String> {
        let name = text.strip_prefix(WELCOME_PREFIX)?;
        let requested = self.requested_name.as_deref().unwrap_or_default().trim();
        let accepted = if requested.is_empty() {
            is_placeholder_name(name)
        } else {
            name == requested
        };
        accepted.then(|| name.to_string())
    }

    fn begin_connect(&mut self) -> Vec<ChatCommand> {
        self.attempt += 1;
        self.phase = ChatPhase::Connecting;
        vec![
            ChatCommand::Connect {
                endpoint: self.endpoint.clone(),
                attempt: self.attempt,
            },
            ChatCommand::StartConnectTimer {
                attempt: self.attempt,
                timeout: self.connect_timeout,
            },
        ]
    }

    fn open_prompt(&mut self) -> Vec<ChatCommand> {
        self.prompt_open = true;
        vec![ChatCommand::PromptForName]
    }
}
