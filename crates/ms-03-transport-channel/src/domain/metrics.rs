//! # Channel Metrics

use std::sync::atomic::{AtomicU64, Ordering};

use super::outcomes::SendOutcome;

/// Per-outcome send counters.
#[derive(Debug, Default)]
pub struct ChannelMetrics {
    /// Acknowledged live sends.
    pub live_delivered: AtomicU64,
    /// Payloads handed to the durable queue.
    pub durable_queued: AtomicU64,
    /// Sends skipped as duplicates.
    pub deduplicated: AtomicU64,
    /// Payloads neither path accepted.
    pub dropped: AtomicU64,
}

impl ChannelMetrics {
    /// Create new metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one send outcome.
    pub fn record(&self, outcome: SendOutcome) {
        let counter = match outcome {
            SendOutcome::Delivered => &self.live_delivered,
            SendOutcome::Queued => &self.durable_queued,
            SendOutcome::Deduplicated => &self.deduplicated,
            SendOutcome::Dropped => &self.dropped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count for one outcome.
    pub fn count(&self, outcome: SendOutcome) -> u64 {
        match outcome {
            SendOutcome::Delivered => &self.live_delivered,
            SendOutcome::Queued => &self.durable_queued,
            SendOutcome::Deduplicated => &self.deduplicated,
            SendOutcome::Dropped => &self.dropped,
        }
        .load(Ordering::Relaxed)
    }
}
