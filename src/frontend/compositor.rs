/**
 * Shell Loader / Compositor
 *
 * Owns the shell's single content slot and drives it through
 *
 * ```text
 * Idle → Loading → { Embedded | Placeholder | Error }
 * ```
 *
 * - `Loading` is entered synchronously by `navigate`
 * - `Embedded` when the service root answers 2xx with an HTML document
 * - `Placeholder` when the root fetch fails in any way (non-2xx, timeout,
 *   connection refused); this is the "service not implemented yet" view
 * - `Error` when the name cannot be resolved or the registry never loaded
 *
 * Every navigation bumps a generation counter. A load result is applied
 * only when its ticket still carries the current generation, so a slow,
 * superseded fetch can never overwrite a newer selection.
 */
use crate::shared::config::AppConfig;
use crate::shared::error::ShellError;
use crate::shared::registry::ServiceRegistry;
use crate::shared::relay::{BusBridge, FrameEnvelope, FrameHandle, FrameIsolation, FrameRelay};
use crate::shared::service::{Icon, ServiceDescriptor};
use crate::shared::bus::EventBus;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;

/// A micro-frontend embedded in the slot
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFrame {
    pub service: String,
    pub display_name: String,
    pub icon: Icon,
    /// URL loaded into the frame
    pub frame_url: String,
    pub isolation: FrameIsolation,
}

/// "Service not yet available" view
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderView {
    pub service: String,
    pub display_name: String,
    pub icon: Icon,
    pub description: String,
    /// Base URL the shell tried to load
    pub url: String,
    /// Why the root document could not be embedded
    pub reason: String,
    /// Integration steps for the service author
    pub instructions: Vec<String>,
}

/// Error panel shown when navigation cannot start
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPanel {
    pub service: Option<String>,
    pub message: String,
}

/// State of the content slot
#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    /// Welcome screen, nothing loaded
    Idle,
    Loading { service: String },
    Embedded(EmbeddedFrame),
    Placeholder(PlaceholderView),
    Error(ErrorPanel),
}

impl SlotState {
    pub fn is_embedded(&self) -> bool {
        matches!(self, SlotState::Embedded(_))
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, SlotState::Placeholder(_))
    }

    /// Service currently occupying the slot, if any
    pub fn service(&self) -> Option<&str> {
        match self {
            SlotState::Idle => None,
            SlotState::Loading { service } => Some(service),
            SlotState::Embedded(frame) => Some(&frame.service),
            SlotState::Placeholder(view) => Some(&view.service),
            SlotState::Error(panel) => panel.service.as_deref(),
        }
    }
}

/// Proof of a started load; only the latest ticket may complete the slot
#[derive(Debug, Clone, PartialEq)]
pub struct LoadTicket {
    generation: u64,
    descriptor: ServiceDescriptor,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }
}

/// Result of probing a service root document
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Available,
    Unavailable { reason: String },
}

/// Entry in the shell navigation
#[derive(Debug, Clone, PartialEq)]
pub struct NavItem {
    pub key: String,
    pub display_name: String,
    pub icon: Icon,
    pub description: String,
}

struct Slot {
    state: SlotState,
    generation: u64,
    frame: Option<FrameHandle>,
}

/// Registry-driven slot compositor
pub struct Compositor {
    registry: Result<ServiceRegistry, ShellError>,
    bridge: BusBridge,
    client: reqwest::Client,
    slot: Mutex<Slot>,
    frame_tx: Arc<dyn FrameRelay>,
    frame_rx: Mutex<Option<mpsc::UnboundedReceiver<FrameEnvelope>>>,
}

impl Compositor {
    /// Create a compositor
    ///
    /// # Arguments
    ///
    /// * `registry` - Result of loading the registry; a failure is kept and
    ///   reported by every navigation
    /// * `bus` - The shell's event bus
    /// * `config` - Shell URL (for origin checks) and load timeout
    pub fn new(
        registry: Result<ServiceRegistry, ShellError>,
        bus: EventBus,
        config: &AppConfig,
    ) -> Self {
        if let Err(e) = &registry {
            tracing::error!("[Shell] Micro-frontend configuration unavailable: {}", e);
        }

        let client = reqwest::Client::builder()
            .timeout(config.load_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[Shell] Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        let shell_url = config.shell_url.as_deref().unwrap_or("null");
        let (frame_tx, frame_rx) = mpsc::unbounded_channel();

        Self {
            registry,
            bridge: BusBridge::new(bus, shell_url),
            client,
            slot: Mutex::new(Slot {
                state: SlotState::Idle,
                generation: 0,
                frame: None,
            }),
            frame_tx: Arc::new(frame_tx),
            frame_rx: Mutex::new(Some(frame_rx)),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn bridge(&self) -> &BusBridge {
        &self.bridge
    }

    pub fn registry(&self) -> Result<&ServiceRegistry, &ShellError> {
        self.registry.as_ref()
    }

    /// Envelopes to post into the embedded frame; can be taken once
    pub fn take_frame_messages(&self) -> Option<mpsc::UnboundedReceiver<FrameEnvelope>> {
        self.frame_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }

    /// Navigation entries in registry order; empty if the registry failed
    pub fn nav_items(&self) -> Vec<NavItem> {
        match &self.registry {
            Ok(registry) => registry
                .descriptors()
                .map(|d| NavItem {
                    key: d.key.clone(),
                    display_name: d.display_name.clone(),
                    icon: d.icon(),
                    description: d.description.clone(),
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn state(&self) -> SlotState {
        self.slot().state.clone()
    }

    /// Start navigating to `name`
    ///
    /// Moves the slot to `Loading` and returns the ticket for the load. If
    /// the registry is unavailable or the name is unknown, the slot moves to
    /// `Error` instead and the error is returned.
    pub fn navigate(&self, name: &str) -> Result<LoadTicket, ShellError> {
        let resolved = match &self.registry {
            Ok(registry) => registry.resolve(name).cloned(),
            Err(e) => Err(e.clone()),
        };

        let mut slot = self.slot();
        slot.generation += 1;
        self.detach_frame(&mut slot);

        match resolved {
            Ok(descriptor) => {
                tracing::info!("[Shell] Loading micro-frontend: {}", name);
                slot.state = SlotState::Loading {
                    service: name.to_string(),
                };
                Ok(LoadTicket {
                    generation: slot.generation,
                    descriptor,
                })
            }
            Err(e) => {
                tracing::warn!("[Shell] Cannot navigate to {}: {}", name, e);
                slot.state = SlotState::Error(ErrorPanel {
                    service: Some(name.to_string()),
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Apply a load outcome if `ticket` is still current
    ///
    /// # Returns
    ///
    /// `false` when the ticket was superseded and the outcome discarded
    pub fn complete(&self, ticket: &LoadTicket, outcome: LoadOutcome) -> bool {
        let mut slot = self.slot();
        if slot.generation != ticket.generation {
            tracing::debug!(
                "[Shell] Discarding superseded load of {}",
                ticket.descriptor.key
            );
            return false;
        }

        let descriptor = &ticket.descriptor;
        slot.state = match outcome {
            LoadOutcome::Available => {
                let isolation = self.bridge.isolation_for(&descriptor.url);
                let handle = self.bridge.attach(&descriptor.url, Arc::clone(&self.frame_tx));
                slot.frame = Some(handle);
                tracing::info!("[Shell] Embedded {} ({:?})", descriptor.key, isolation);
                SlotState::Embedded(EmbeddedFrame {
                    service: descriptor.key.clone(),
                    display_name: descriptor.display_name.clone(),
                    icon: descriptor.icon(),
                    frame_url: descriptor.url.clone(),
                    isolation,
                })
            }
            LoadOutcome::Unavailable { reason } => {
                tracing::info!(
                    "[Shell] {} not available, showing placeholder: {}",
                    descriptor.key,
                    reason
                );
                SlotState::Placeholder(placeholder_for(descriptor, reason))
            }
        };
        true
    }

    /// Navigate to `name`, fetch its root document once and apply the result
    ///
    /// # Returns
    ///
    /// The slot state after this load finished (which may belong to a newer
    /// navigation if this one was superseded)
    pub async fn load(&self, name: &str) -> SlotState {
        let ticket = match self.navigate(name) {
            Ok(ticket) => ticket,
            Err(_) => return self.state(),
        };
        let outcome = self.probe(ticket.descriptor()).await;
        self.complete(&ticket, outcome);
        self.state()
    }

    /// Return to the welcome screen, discarding any load in flight
    pub fn show_welcome(&self) {
        let mut slot = self.slot();
        slot.generation += 1;
        self.detach_frame(&mut slot);
        slot.state = SlotState::Idle;
    }

    fn detach_frame(&self, slot: &mut Slot) {
        if let Some(handle) = slot.frame.take() {
            self.bridge.detach(handle);
        }
    }

    /// Single GET of the service root document
    async fn probe(&self, descriptor: &ServiceDescriptor) -> LoadOutcome {
        let url = descriptor.root_url();
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "text/html")
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_ascii_lowercase);
                match content_type {
                    Some(ct) if !ct.contains("text/html") => LoadOutcome::Unavailable {
                        reason: format!("unexpected content type {}", ct),
                    },
                    _ => LoadOutcome::Available,
                }
            }
            Ok(response) => LoadOutcome::Unavailable {
                reason: format!("HTTP {}", response.status().as_u16()),
            },
            Err(e) => LoadOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

fn placeholder_for(descriptor: &ServiceDescriptor, reason: String) -> PlaceholderView {
    PlaceholderView {
        service: descriptor.key.clone(),
        display_name: descriptor.display_name.clone(),
        icon: descriptor.icon(),
        description: descriptor.description.clone(),
        url: descriptor.url.clone(),
        reason,
        instructions: vec![
            format!("Expose GET / at {} returning an HTML document", descriptor.root_url()),
            "Publish and subscribe through the shell event bus to talk to other micro-frontends"
                .to_string(),
            format!(
                "Call sibling services through /api/proxy/{{service}}/{{endpoint}}; this one is reachable as /api/proxy/{}/",
                descriptor.key
            ),
        ],
    }
}
