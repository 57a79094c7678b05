/**
 * Event Bus
 *
 * In-page publish/subscribe mechanism that lets micro-frontends notify each
 * other without direct references. One instance is constructed by the
 * shell's composition root and handed to every component that needs it;
 * clones share the same subscriber table.
 *
 * # Delivery Semantics
 *
 * - `publish` delivers synchronously, on the calling thread, in
 *   subscription order
 * - Only subscribers present when `publish` is called receive the event;
 *   nothing is buffered or replayed for late subscribers
 * - Every subscription receives exactly one delivery per publish call.
 *   Subscribing the same handler twice yields two deliveries.
 * - A panicking handler is caught and logged; the remaining handlers still
 *   receive the event
 * - Handlers run outside the subscriber lock, so they may publish or
 *   subscribe re-entrantly
 */
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Topic published by the auth micro-frontend after a successful login
pub const TOPIC_USER_LOGGED_IN: &str = "user-logged-in";
/// Raw login response forwarded by the auth micro-frontend
pub const TOPIC_LOGIN_SUCCESS: &str = "login-success";
pub const TOPIC_USER_REGISTERED: &str = "user-registered";
pub const TOPIC_LOGOUT_REQUESTED: &str = "logout-requested";
pub const TOPIC_TASK_CREATED: &str = "task-created";
pub const TOPIC_TASK_UPDATED: &str = "task-updated";
pub const TOPIC_TASK_DELETED: &str = "task-deleted";

/// A published event: topic plus opaque structured payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

impl BusEvent {
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }
}

type Handler = Arc<dyn Fn(&serde_json::Value) + Send + Sync>;

struct Entry {
    id: u64,
    topic: String,
    handler: Handler,
}

/// Handle returned by `subscribe`, used to remove the subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    topic: String,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

/// Shared publish/subscribe bus
#[derive(Clone, Default)]
pub struct EventBus {
    entries: Arc<Mutex<Vec<Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.lock().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A handler never runs while the lock is held, so poisoning can only
        // come from a panic inside this module; the table is still valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a handler for `topic`
    ///
    /// # Returns
    ///
    /// A `Subscription` handle that can later be passed to `unsubscribe`
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&serde_json::Value) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().push(Entry {
            id,
            topic: topic.clone(),
            handler: Arc::new(handler),
        });
        tracing::debug!("[Bus] Subscribed #{} to '{}'", id, topic);
        Subscription { id, topic }
    }

    /// Remove a subscription
    ///
    /// # Returns
    ///
    /// `true` if the subscription was still registered
    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != subscription.id);
        before != entries.len()
    }

    /// Publish `payload` to every current subscriber of `topic`
    ///
    /// # Returns
    ///
    /// Number of handlers that completed without panicking
    pub fn publish(&self, topic: &str, payload: serde_json::Value) -> usize {
        let handlers: Vec<(u64, Handler)> = self
            .lock()
            .iter()
            .filter(|e| e.topic == topic)
            .map(|e| (e.id, Arc::clone(&e.handler)))
            .collect();

        tracing::info!("[Bus] Event published: {} ({} subscribers)", topic, handlers.len());

        let mut delivered = 0;
        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(&payload))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    tracing::error!("[Bus] Subscriber #{} panicked handling '{}'", id, topic);
                }
            }
        }
        delivered
    }

    /// Publish a pre-built event
    pub fn publish_event(&self, event: BusEvent) -> usize {
        self.publish(&event.topic, event.payload)
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.lock().iter().filter(|e| e.topic == topic).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn recorder(bus: &EventBus, topic: &str, log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Subscription {
        let log = Arc::clone(log);
        let tag = tag.to_string();
        bus.subscribe(topic, move |payload| {
            log.lock().unwrap().push(format!("{}:{}", tag, payload));
        })
    }

    #[test]
    fn test_delivers_in_subscription_order() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "task-created", &log, "a");
        recorder(&bus, "task-created", &log, "b");
        recorder(&bus, "task-deleted", &log, "c");

        let delivered = bus.publish("task-created", json!(1));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a:1", "b:1"]);
    }

    #[test]
    fn test_late_subscriber_gets_nothing() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.publish("user-logged-in", json!({"user": "ana"}));
        recorder(&bus, "user-logged-in", &log, "late");
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        recorder(&bus, "t", &log, "first");
        bus.subscribe("t", |_| panic!("boom"));
        recorder(&bus, "t", &log, "third");

        let delivered = bus.publish("t", json!("x"));

        assert_eq!(delivered, 2);
        assert_eq!(*log.lock().unwrap(), vec!["first:\"x\"", "third:\"x\""]);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_handle() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = recorder(&bus, "t", &log, "a");
        recorder(&bus, "t", &log, "b");

        assert!(bus.unsubscribe(&first));
        assert!(!bus.unsubscribe(&first));
        bus.publish("t", json!(0));

        assert_eq!(*log.lock().unwrap(), vec!["b:0"]);
        assert_eq!(bus.subscriber_count("t"), 1);
    }

    #[test]
    fn test_reentrant_subscribe_does_not_receive_current_event() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let inner_bus = bus.clone();
        let inner_count = Arc::clone(&count);
        bus.subscribe("t", move |_| {
            let c = Arc::clone(&inner_count);
            inner_bus.subscribe("t", move |_| {
                c.fetch_add(1, Ordering::SeqCst);
            });
        });

        bus.publish("t", json!(null));
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count("t"), 2);
    }
}
