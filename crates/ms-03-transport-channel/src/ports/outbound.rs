//! # Outbound Ports (Driven Ports)
//!
//! The physical link between authority and satellite. Timeouts belong to the
//! medium; the channel only distinguishes "acknowledged" from "not delivered".

use async_trait::async_trait;

use crate::domain::{DeliveryOutcome, TransportError};

/// Abstract dual-mode delivery medium.
///
/// Production: the platform's device-pairing session.
/// Testing: `LoopbackTransport`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whether the peer is reachable right now.
    fn is_reachable(&self) -> bool;

    /// Attempt a live, acknowledged send.
    async fn try_send_now(&self, payload: Vec<u8>) -> DeliveryOutcome;

    /// Hand the payload to the medium's durable queue. The medium delivers it
    /// once the peer reappears; the caller never retries.
    fn enqueue_durable(&self, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Replace the application context seen by the peer (authority side).
    async fn update_application_context(&self, payload: Vec<u8>) -> Result<(), TransportError>;

    /// The most recent application context received, if one is waiting.
    fn pending_application_context(&self) -> Option<Vec<u8>>;
}
