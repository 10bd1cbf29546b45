//! # MS-03 Transport Channel
//!
//! Delivers mutation messages to the authority and receives application
//! contexts from it, over an abstract `Transport` medium.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (domain, `Transport` port, loopback adapter, service)
//!
//! ## Delivery Algorithm
//!
//! ```text
//! send(intent)
//!   ├─ already in flight (service completion)? ──→ Deduplicated
//!   ├─ peer reachable? ── try_send_now ── Acked ──→ Delivered
//!   │                                 └─ Failed ──┐
//!   └────────────────────────────────────────────┴─→ enqueue_durable ─→ Queued
//!                                                      └─ rejected ───→ Dropped
//! ```
//!
//! Falling back sets a user-visible status string; it is cleared when the
//! peer becomes reachable or a confirmation context arrives.
//!
//! ## Module Structure
//!
//! ```text
//! ms-03-transport-channel/
//! ├── config.rs        # ChannelConfig
//! ├── domain/          # DeliveryOutcome, SendOutcome, TransportError, ChannelMetrics
//! ├── ports/           # Transport (outbound)
//! ├── adapters/        # LoopbackTransport
//! └── service.rs       # TransportChannel
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::LoopbackTransport;
pub use config::ChannelConfig;
pub use domain::{ChannelMetrics, DeliveryOutcome, SendOutcome, TransportError};
pub use ports::Transport;
pub use service::TransportChannel;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
