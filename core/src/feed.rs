//! Capsule list feed and event stream.
//!
//! The source app pushed state through behavior/publish subjects; here the
//! replay semantics are explicit in the channel choice:
//!
//! - [`CapsuleFeed`] replays: a late subscriber immediately observes the
//!   last published list (behavior-relay semantics, `tokio::sync::watch`).
//! - [`CapsuleEvents`] does not replay: a late subscriber only sees events
//!   emitted after subscribing (publish-subject semantics,
//!   `tokio::sync::broadcast`).

use tokio::sync::{broadcast, watch};

use capsule_types::{CapsuleId, ListCapsuleCellItem};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Last-value-replaying feed of the capsule list projection.
#[derive(Debug)]
pub struct CapsuleFeed {
    tx: watch::Sender<Vec<ListCapsuleCellItem>>,
}

impl CapsuleFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Publish a new list value. Succeeds with or without subscribers.
    pub fn publish(&self, items: Vec<ListCapsuleCellItem>) {
        self.tx.send_replace(items);
    }

    /// The most recently published list.
    #[must_use]
    pub fn latest(&self) -> Vec<ListCapsuleCellItem> {
        self.tx.borrow().clone()
    }

    /// Subscribe; the receiver starts out holding the last published
    /// value.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<ListCapsuleCellItem>> {
        self.tx.subscribe()
    }
}

impl Default for CapsuleFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot notifications about capsule activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapsuleEvent {
    /// The list projection was refetched and republished.
    ListRefreshed { count: usize },
    /// A creation flow committed a new capsule.
    CapsuleCreated(CapsuleId),
    /// A capsule detail view was opened.
    CapsuleOpened(CapsuleId),
}

/// Plain event stream without replay.
#[derive(Debug)]
pub struct CapsuleEvents {
    tx: broadcast::Sender<CapsuleEvent>,
}

impl CapsuleEvents {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Emit an event to current subscribers. An event with no subscribers
    /// is dropped, not queued.
    pub fn emit(&self, event: CapsuleEvent) {
        let _ = self.tx.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CapsuleEvent> {
        self.tx.subscribe()
    }
}

impl Default for CapsuleEvents {
    fn default() -> Self {
        Self::new()
    }
}
