//! # Delivery Outcomes

use super::errors::TransportError;

/// Result of one live send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The peer acknowledged the payload.
    Acked,
    /// Not delivered (timeout, link loss, peer gone).
    Failed(TransportError),
}

/// Result of `TransportChannel::send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Acknowledged by the peer.
    Delivered,
    /// Handed to the medium's durable queue; delivered when the peer reappears.
    Queued,
    /// An equivalent intent is already on its way; nothing was sent.
    Deduplicated,
    /// Neither path accepted the payload. Logged and counted.
    Dropped,
}

impl SendOutcome {
    /// Whether the intent is on its way to the authority (now or later).
    pub fn is_accepted(&self) -> bool {
        matches!(self, SendOutcome::Delivered | SendOutcome::Queued)
    }
}
