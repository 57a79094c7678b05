/**
 * Cross-Frame Bus Relay
 *
 * The `EventBus` lives in the hosting page. Frames served from the shell's
 * own origin share it directly. Independently deployed micro-frontends are
 * usually cross-origin and cannot touch the host's memory, so the bridge
 * relays bus traffic to them as topic-tagged structured messages (the
 * `postMessage` analogue) and accepts messages back only from origins it
 * has attached.
 *
 * # Envelope
 *
 * ```json
 * {"type": "tw-bus", "topic": "task-created", "payload": {"task": {}}}
 * ```
 *
 * # Flow
 *
 * - `publish` delivers to local subscribers, then posts an envelope to
 *   every attached cross-origin frame
 * - `receive` validates the sender origin and the envelope tag, publishes
 *   locally and forwards to the other cross-origin frames; the sending
 *   frame does not get its own event echoed back
 */
use crate::shared::bus::EventBus;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::mpsc;

/// Tag identifying bus envelopes among other frame messages
pub const BUS_ENVELOPE_TAG: &str = "tw-bus";

/// Structured message carried across a frame boundary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameEnvelope {
    #[serde(rename = "type")]
    pub tag: String,
    pub topic: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl FrameEnvelope {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tag: BUS_ENVELOPE_TAG.to_string(),
            topic: topic.into(),
            payload,
        }
    }
}

/// Delivery channel into one embedded frame
pub trait FrameRelay: Send + Sync {
    /// Post an envelope to the frame; returns `false` if the frame is gone
    fn post_message(&self, envelope: &FrameEnvelope, target_origin: &str) -> bool;
}

impl FrameRelay for mpsc::UnboundedSender<FrameEnvelope> {
    fn post_message(&self, envelope: &FrameEnvelope, _target_origin: &str) -> bool {
        self.send(envelope.clone()).is_ok()
    }
}

/// How a frame reaches the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameIsolation {
    /// Same origin as the shell: shares the bus directly
    SameOrigin,
    /// Different origin: reached through relayed envelopes
    CrossOrigin,
}

/// Handle for an attached frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Reasons an incoming frame message is refused
#[derive(Debug, Error, PartialEq)]
pub enum RelayRejection {
    #[error("message from unattached origin {0}")]
    UnknownOrigin(String),
    #[error("not a bus envelope")]
    NotABusMessage,
}

struct AttachedFrame {
    handle: FrameHandle,
    origin: String,
    isolation: FrameIsolation,
    relay: Arc<dyn FrameRelay>,
}

/// Bus facade selecting direct or relayed delivery per frame origin
#[derive(Clone)]
pub struct BusBridge {
    bus: EventBus,
    shell_origin: String,
    frames: Arc<Mutex<Vec<AttachedFrame>>>,
    next_handle: Arc<AtomicU64>,
}

/// Serialized origin (`scheme://host[:port]`) of a URL, if it has one
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

impl BusBridge {
    /// Create a bridge for a shell served from `shell_url`
    pub fn new(bus: EventBus, shell_url: &str) -> Self {
        let shell_origin = origin_of(shell_url).unwrap_or_else(|| "null".to_string());
        Self {
            bus,
            shell_origin,
            frames: Arc::new(Mutex::new(Vec::new())),
            next_handle: Arc::new(AtomicU64::new(1)),
        }
    }

    fn frames(&self) -> MutexGuard<'_, Vec<AttachedFrame>> {
        self.frames.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn shell_origin(&self) -> &str {
        &self.shell_origin
    }

    /// Classify a frame URL relative to the shell origin
    pub fn isolation_for(&self, frame_url: &str) -> FrameIsolation {
        match origin_of(frame_url) {
            Some(origin) if origin == self.shell_origin => FrameIsolation::SameOrigin,
            _ => FrameIsolation::CrossOrigin,
        }
    }

    /// Attach an embedded frame
    pub fn attach(&self, frame_url: &str, relay: Arc<dyn FrameRelay>) -> FrameHandle {
        let handle = FrameHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let isolation = self.isolation_for(frame_url);
        let origin = origin_of(frame_url).unwrap_or_else(|| "null".to_string());
        tracing::info!("[Bus] Frame attached: {} ({:?})", origin, isolation);
        self.frames().push(AttachedFrame {
            handle,
            origin,
            isolation,
            relay,
        });
        handle
    }

    pub fn detach(&self, handle: FrameHandle) -> bool {
        let mut frames = self.frames();
        let before = frames.len();
        frames.retain(|f| f.handle != handle);
        before != frames.len()
    }

    pub fn attached_frames(&self) -> usize {
        self.frames().len()
    }

    /// Publish to local subscribers and relay to cross-origin frames
    ///
    /// # Returns
    ///
    /// Local deliveries plus successful relays
    pub fn publish(&self, topic: &str, payload: serde_json::Value) -> usize {
        let envelope = FrameEnvelope::new(topic, payload.clone());
        let local = self.bus.publish(topic, payload);
        local + self.relay(&envelope, None)
    }

    /// Accept a message posted by an embedded frame
    ///
    /// # Arguments
    ///
    /// * `sender_origin` - Origin reported for the posting frame
    /// * `message` - Raw structured message
    ///
    /// # Errors
    ///
    /// Rejects messages from origins that are not attached cross-origin
    /// frames, and messages that are not tagged bus envelopes.
    pub fn receive(
        &self,
        sender_origin: &str,
        message: &serde_json::Value,
    ) -> Result<usize, RelayRejection> {
        let known = self.frames().iter().any(|f| {
            f.isolation == FrameIsolation::CrossOrigin && f.origin == sender_origin
        });
        if !known {
            tracing::warn!("[Bus] Rejected frame message from {}", sender_origin);
            return Err(RelayRejection::UnknownOrigin(sender_origin.to_string()));
        }

        let envelope: FrameEnvelope = serde_json::from_value(message.clone())
            .map_err(|_| RelayRejection::NotABusMessage)?;
        if envelope.tag != BUS_ENVELOPE_TAG {
            return Err(RelayRejection::NotABusMessage);
        }

        let local = self.bus.publish(&envelope.topic, envelope.payload.clone());
        Ok(local + self.relay(&envelope, Some(sender_origin)))
    }

    fn relay(&self, envelope: &FrameEnvelope, skip_origin: Option<&str>) -> usize {
        let targets: Vec<(String, Arc<dyn FrameRelay>)> = self
            .frames()
            .iter()
            .filter(|f| f.isolation == FrameIsolation::CrossOrigin)
            .filter(|f| Some(f.origin.as_str()) != skip_origin)
            .map(|f| (f.origin.clone(), Arc::clone(&f.relay)))
            .collect();

        targets
            .into_iter()
            .filter(|(origin, relay)| {
                let posted = relay.post_message(envelope, origin);
                if !posted {
                    tracing::warn!("[Bus] Frame {} no longer reachable", origin);
                }
                posted
            })
            .count()
    }
}
