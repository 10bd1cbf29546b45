//! # Shared Bus - Event Bus for Sync Callbacks
//!
//! Transport callbacks (reachability changes, inbound application contexts,
//! inbound mutation messages) and lifecycle notifications arrive on whatever
//! thread the platform delivers them on. They are published here and consumed
//! by exactly one event-loop task, which is the single writer of the local
//! cache and the deferred-action ledger.
//!
//! ```text
//! ┌──────────────┐   publish()    ┌──────────────┐   recv()    ┌─────────────────┐
//! │  Transport   │ ─────────────→ │  Event Bus   │ ──────────→ │ SyncCoordinator │
//! │  callbacks   │                │ (broadcast)  │             │  (single writer)│
//! └──────────────┘                └──────────────┘             └─────────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventTopic, SyncEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
