//! # Transport Channel Service
//!
//! Owns the peer-reachability flag, the soft status string and the set of
//! intents sent since the last confirmation context.

use ms_01_snapshot_codec::{
    decode_context, decode_intent, encode_context, encode_intent, ApplicationContext,
};
use parking_lot::{Mutex, RwLock};
use shared_types::{DedupKey, MutationIntent};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::domain::{ChannelMetrics, DeliveryOutcome, SendOutcome, TransportError};
use crate::ports::Transport;

enum Admission {
    /// An equivalent completion is already in flight.
    Duplicate,
    Unencodable,
    Ready(Vec<u8>),
}

/// Dual-mode delivery channel between a satellite and the authority.
pub struct TransportChannel {
    config: ChannelConfig,
    transport: Arc<dyn Transport>,
    reachable: AtomicBool,
    status_message: RwLock<Option<String>>,
    /// Intents sent since the last confirmation context, by dedup identity.
    in_flight: Mutex<HashMap<DedupKey, MutationIntent>>,
    metrics: ChannelMetrics,
}

impl TransportChannel {
    /// Create a channel over `transport`, seeding reachability from it.
    pub fn new(config: ChannelConfig, transport: Arc<dyn Transport>) -> Self {
        let reachable = transport.is_reachable();
        Self {
            config,
            transport,
            reachable: AtomicBool::new(reachable),
            status_message: RwLock::new(None),
            in_flight: Mutex::new(HashMap::new()),
            metrics: ChannelMetrics::new(),
        }
    }

    // =========================================================================
    // Outbound (satellite → authority)
    // =========================================================================

    /// Deliver an intent: live if the peer is reachable, else durably.
    pub async fn send(&self, intent: &MutationIntent) -> SendOutcome {
        let payload = match self.admit(intent) {
            Admission::Duplicate => return self.finish(intent, SendOutcome::Deduplicated),
            Admission::Unencodable => return self.finish(intent, SendOutcome::Dropped),
            Admission::Ready(payload) => payload,
        };

        if self.is_peer_reachable() {
            match self.transport.try_send_now(payload.clone()).await {
                DeliveryOutcome::Acked => {
                    debug!(key = %intent.message_key(), "[ms-03] Delivered live");
                    return self.finish(intent, SendOutcome::Delivered);
                }
                DeliveryOutcome::Failed(e) => {
                    info!(error = %e, "[ms-03] Live send failed, falling back to durable queue");
                }
            }
        }

        let outcome = self.enqueue_fallback(payload);
        self.finish(intent, outcome)
    }

    /// Deliver an intent through the durable queue only.
    ///
    /// Used where no async context exists to await a live send.
    pub fn send_durable(&self, intent: &MutationIntent) -> SendOutcome {
        let outcome = match self.admit(intent) {
            Admission::Duplicate => SendOutcome::Deduplicated,
            Admission::Unencodable => SendOutcome::Dropped,
            Admission::Ready(payload) => self.enqueue_fallback(payload),
        };
        self.finish(intent, outcome)
    }

    // =========================================================================
    // Inbound callbacks
    // =========================================================================

    /// Reachability callback from the medium.
    pub fn on_reachability_changed(&self, reachable: bool) {
        let was = self.reachable.swap(reachable, Ordering::SeqCst);
        if was != reachable {
            info!(reachable, "[ms-03] Peer reachability changed");
        }
        if reachable {
            self.clear_status();
        }
    }

    /// Decode an application context push. A readable context confirms
    /// everything sent so far; an unreadable one is dropped with a warning.
    pub fn on_application_context(&self, payload: &[u8]) -> Option<ApplicationContext> {
        match decode_context(payload) {
            Ok(context) => {
                let confirmed = {
                    let mut in_flight = self.in_flight.lock();
                    let n = in_flight.len();
                    in_flight.clear();
                    n
                };
                self.clear_status();
                debug!(
                    pushed_at = context.pushed_at,
                    confirmed, "[ms-03] Application context received"
                );
                Some(context)
            }
            Err(e) => {
                warn!(error = %e, "[ms-03] Unreadable application context ignored");
                None
            }
        }
    }

    /// A context that was already waiting when the process started.
    pub fn drain_waiting_context(&self) -> Option<ApplicationContext> {
        let payload = self.transport.pending_application_context()?;
        info!("[ms-03] Replaying waiting application context");
        self.on_application_context(&payload)
    }

    // =========================================================================
    // Authority side
    // =========================================================================

    /// Push a full-replacement context to the satellite.
    pub async fn publish_context(&self, context: &ApplicationContext) -> Result<(), TransportError> {
        let payload = encode_context(context)
            .map_err(|e| TransportError::QueueRejected(e.to_string()))?;
        self.transport.update_application_context(payload).await?;
        debug!(pushed_at = context.pushed_at, "[ms-03] Application context published");
        Ok(())
    }

    /// Decode a mutation message received from a satellite.
    pub fn receive_message(&self, payload: &[u8]) -> Option<MutationIntent> {
        match decode_intent(payload) {
            Ok(intent) => Some(intent),
            Err(e) => {
                warn!(error = %e, "[ms-03] Unreadable mutation message dropped");
                None
            }
        }
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Last known peer reachability.
    pub fn is_peer_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }

    /// Soft status for the UI while mutations wait in the durable queue.
    pub fn status_message(&self) -> Option<String> {
        self.status_message.read().clone()
    }

    /// Number of intents awaiting a confirmation context.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.lock().len()
    }

    /// Send counters.
    pub fn metrics(&self) -> &ChannelMetrics {
        &self.metrics
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Register the intent as in flight and encode it.
    fn admit(&self, intent: &MutationIntent) -> Admission {
        {
            let mut in_flight = self.in_flight.lock();
            let key = intent.dedup_key();
            if in_flight.contains_key(&key) && !intent.latest_wins() {
                debug!(key = %intent.message_key(), "[ms-03] Intent already in flight");
                return Admission::Duplicate;
            }
            in_flight.insert(key, intent.clone());
        }

        match encode_intent(intent) {
            Ok(payload) => Admission::Ready(payload),
            Err(e) => {
                warn!(error = %e, "[ms-03] Failed to encode intent");
                Admission::Unencodable
            }
        }
    }

    fn enqueue_fallback(&self, payload: Vec<u8>) -> SendOutcome {
        match self.transport.enqueue_durable(payload) {
            Ok(()) => {
                *self.status_message.write() = Some(self.config.fallback_status_message.clone());
                SendOutcome::Queued
            }
            Err(e) => {
                warn!(error = %e, "[ms-03] Durable queue rejected payload");
                SendOutcome::Dropped
            }
        }
    }

    fn finish(&self, intent: &MutationIntent, outcome: SendOutcome) -> SendOutcome {
        if outcome == SendOutcome::Dropped {
            let mut in_flight = self.in_flight.lock();
            let key = intent.dedup_key();
            if in_flight.get(&key) == Some(intent) {
                in_flight.remove(&key);
            }
        }
        self.metrics.record(outcome);
        outcome
    }

    fn clear_status(&self) {
        self.status_message.write().take();
    }
}
