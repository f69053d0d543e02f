use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActivityKind {
    PointerMove,
    KeyPress,
    Scroll,
    Click,
}

/// Notifications forwarded by the host page. The JSON form matches what a
/// webview bridge posts, e.g. `{"type":"visibilityChange","hidden":true}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BrowserEvent {
    VisibilityChange { hidden: bool },
    Activity { kind: ActivityKind },
    Unload,
}

impl BrowserEvent {
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).with_context(|| format!("invalid browser event: {raw}"))
    }
}

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out point for browser events. Subscribing attaches a listener;
/// dropping the receiver detaches it.
#[derive(Clone)]
pub struct EventSurface {
    tx: broadcast::Sender<BrowserEvent>,
}

impl Default for EventSurface {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventSurface {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns how many listeners received the event.
    pub fn dispatch(&self, event: BrowserEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
