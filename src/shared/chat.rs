/**
 * Chat Wire Events
 *
 * Event types exchanged over the chat WebSocket. Every frame is a JSON text
 * message `{"event": <name>, "data": <value>}`.
 *
 * # Events
 *
 * Client → server:
 * - `join` with the display name as data
 * - `message` with the message text as data
 *
 * Server → client:
 * - `message` with `{user, text, time}`
 * - `system` with a notice string
 *
 * Parsing is lenient: non-string data is coerced to a string and frames
 * that cannot be understood yield `None` instead of an error, so one
 * client's malformed input never disturbs the others.
 */
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const EVENT_JOIN: &str = "join";
pub const EVENT_MESSAGE: &str = "message";
pub const EVENT_SYSTEM: &str = "system";

/// Raw `{event, data}` frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WireFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// A broadcast chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Sender display name
    pub user: String,
    pub text: String,
    /// Server timestamp, RFC 3339 with millisecond precision
    pub time: String,
}

impl ChatMessage {
    /// Create a message stamped with the current server time
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            time: timestamp_now(),
        }
    }
}

/// Events a client sends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Join(String),
    Message(String),
}

impl ClientEvent {
    /// Parse a text frame, coercing the data to a string
    ///
    /// Returns `None` for non-JSON frames and unknown events.
    pub fn parse(frame: &str) -> Option<Self> {
        let frame: WireFrame = serde_json::from_str(frame).ok()?;
        let text = coerce_text(&frame.data);
        match frame.event.as_str() {
            EVENT_JOIN => Some(ClientEvent::Join(text)),
            EVENT_MESSAGE => Some(ClientEvent::Message(text)),
            _ => None,
        }
    }

    pub fn to_frame(&self) -> String {
        let (event, data) = match self {
            ClientEvent::Join(name) => (EVENT_JOIN, name),
            ClientEvent::Message(text) => (EVENT_MESSAGE, text),
        };
        encode(event, serde_json::Value::String(data.clone()))
    }
}

/// Events the server broadcasts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Message(ChatMessage),
    System(String),
}

impl ServerEvent {
    /// Parse a text frame received from the server
    pub fn parse(frame: &str) -> Option<Self> {
        let frame: WireFrame = serde_json::from_str(frame).ok()?;
        match frame.event.as_str() {
            EVENT_MESSAGE => serde_json::from_value(frame.data).ok().map(ServerEvent::Message),
            EVENT_SYSTEM => Some(ServerEvent::System(coerce_text(&frame.data))),
            _ => None,
        }
    }

    pub fn to_frame(&self) -> String {
        match self {
            ServerEvent::Message(message) => encode(
                EVENT_MESSAGE,
                serde_json::to_value(message).unwrap_or_default(),
            ),
            ServerEvent::System(text) => {
                encode(EVENT_SYSTEM, serde_json::Value::String(text.clone()))
            }
        }
    }
}

fn encode(event: &str, data: serde_json::Value) -> String {
    serde_json::json!({ "event": event, "data": data }).to_string()
}

/// Safe string form of arbitrary frame data
///
/// Strings pass through, `null` becomes empty, scalars use their display
/// form and arrays/objects their compact JSON text.
pub fn coerce_text(data: &serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Generated name for a join without one: `user-` plus the first four
/// characters of the connection id
pub fn placeholder_name(connection_id: &str) -> String {
    let prefix: String = connection_id.chars().take(4).collect();
    format!("user-{}", prefix)
}

/// Whether `name` has the shape produced by [`placeholder_name`]
pub fn is_placeholder_name(name: &str) -> bool {
    name.strip_prefix("user-").is_some_and(|rest| {
        rest.len() == 4 && rest.chars().all(|c| c.is_ascii_hexdigit())
    })
}

pub fn joined_notice(name: &str) -> String {
    format!("{} se ha unido al chat", name)
}

pub fn welcome_notice(name: &str) -> String {
    format!("Bienvenido, {}", name)
}

pub fn left_notice(name: &str) -> String {
    format!("{} salió del chat", name)
}

/// Current UTC time as RFC 3339 with milliseconds and `Z`
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
