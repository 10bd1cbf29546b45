//! # Sync Events
//!
//! Every notification that must be marshaled onto the single-writer context.

use serde::{Deserialize, Serialize};

/// All events that can be published to the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    // =========================================================================
    // CONNECTIVITY
    // =========================================================================
    /// The peer became reachable or unreachable.
    ReachabilityChanged {
        /// New reachability.
        reachable: bool,
    },

    // =========================================================================
    // AUTHORITY → SATELLITE
    // =========================================================================
    /// A full-replacement application context arrived (encoded).
    ApplicationContextReceived {
        /// Codec bytes of the context.
        payload: Vec<u8>,
    },

    // =========================================================================
    // SATELLITE → AUTHORITY
    // =========================================================================
    /// A keyed mutation message arrived at the authority (encoded).
    MessageReceived {
        /// Codec bytes of the message.
        payload: Vec<u8>,
    },

    // =========================================================================
    // LIFECYCLE
    // =========================================================================
    /// The authority process resumed or came to the foreground.
    AuthorityResumed,

    /// A display surface asked for fresh data from the shared region.
    ReloadRequested,
}

impl SyncEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            SyncEvent::ReachabilityChanged { .. } => EventTopic::Connectivity,
            SyncEvent::ApplicationContextReceived { .. } => EventTopic::Context,
            SyncEvent::MessageReceived { .. } => EventTopic::Message,
            SyncEvent::AuthorityResumed | SyncEvent::ReloadRequested => EventTopic::Lifecycle,
        }
    }
}

/// Coarse grouping of events, used to route them to the side that acts on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Reachability changes.
    Connectivity,
    /// Inbound application contexts.
    Context,
    /// Inbound mutation messages.
    Message,
    /// Process lifecycle.
    Lifecycle,
}

/// Which topics a subscription receives. No topics means every topic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Receive every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Receive only the listed topics.
    #[must_use]
    pub fn only(topics: impl IntoIterator<Item = EventTopic>) -> Self {
        let mut filter = Self::default();
        for topic in topics {
            if !filter.topics.contains(&topic) {
                filter.topics.push(topic);
            }
        }
        filter
    }

    /// What a satellite event loop acts on.
    #[must_use]
    pub fn satellite() -> Self {
        Self::only([
            EventTopic::Connectivity,
            EventTopic::Context,
            EventTopic::Lifecycle,
        ])
    }

    /// What the authority event loop acts on.
    #[must_use]
    pub fn authority() -> Self {
        Self::only([
            EventTopic::Connectivity,
            EventTopic::Message,
            EventTopic::Lifecycle,
        ])
    }

    /// Topics this filter admits; empty for all.
    #[must_use]
    pub fn topics(&self) -> &[EventTopic] {
        &self.topics
    }

    /// Whether `event` passes.
    #[must_use]
    pub fn matches(&self, event: &SyncEvent) -> bool {
        self.topics.is_empty() || self.topics.contains(&event.topic())
    }
}
