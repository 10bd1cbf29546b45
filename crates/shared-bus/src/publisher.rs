//! # Event Publisher
//!
//! Platform callbacks publish here. Publishing never blocks and never fails:
//! with no event loop subscribed the event is counted as dropped and the
//! next authoritative context or reachability change covers for it.

use crate::events::{EventFilter, SyncEvent};
use crate::subscriber::{EventSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Sink for transport and lifecycle callbacks.
///
/// Synchronous, because platform callbacks arrive on plain threads.
pub trait EventPublisher: Send + Sync {
    /// Hand `event` to every current subscriber; returns how many got it.
    fn publish(&self, event: SyncEvent) -> usize;

    /// Events handed to `publish` so far, delivered or not.
    fn events_published(&self) -> u64;
}

/// Process-local bus backed by `tokio::sync::broadcast`.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<SyncEvent>,
    published: AtomicU64,
    /// Published while nobody was subscribed.
    unheard: AtomicU64,
}

impl InMemoryEventBus {
    /// Bus buffering `DEFAULT_CHANNEL_CAPACITY` events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Bus buffering `capacity` events per subscriber; a subscriber that
    /// falls further behind loses the oldest ones.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            published: AtomicU64::new(0),
            unheard: AtomicU64::new(0),
        }
    }

    /// Live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Events nobody was subscribed to receive.
    #[must_use]
    pub fn unheard_count(&self) -> u64 {
        self.unheard.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(topics = ?filter.topics(), "[shared-bus] Subscribed");
        Subscription::new(self.sender.subscribe(), filter)
    }
}

impl EventPublisher for InMemoryEventBus {
    fn publish(&self, event: SyncEvent) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);
        let topic = event.topic();

        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(?topic, receivers, "[shared-bus] Event published");
                receivers
            }
            Err(_) => {
                self.unheard.fetch_add(1, Ordering::Relaxed);
                warn!(?topic, "[shared-bus] No event loop subscribed, event dropped");
                0
            }
        }
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}
