//! # Domain Errors

use thiserror::Error;

/// Transport errors. None of these reach the user as a hard failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The peer is not reachable right now. A known state, not a fault.
    #[error("Peer unreachable")]
    Unreachable,

    /// A live send was attempted and not acknowledged.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),

    /// The medium refused to take the payload into its durable queue.
    #[error("Durable queue rejected payload: {0}")]
    QueueRejected(String),
}
