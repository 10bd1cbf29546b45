//! # Coordinator Entities

use ms_02_action_ledger::EnqueueOutcome;
use ms_03_transport_channel::SendOutcome;
use shared_types::{MutationIntent, Timestamp};
use tokio::task::JoinHandle;

/// How a mutation left this process.
#[derive(Debug)]
pub enum Delivery {
    /// A transport send is running in the background.
    Spawned(JoinHandle<SendOutcome>),
    /// No runtime was available; the payload went straight to the durable queue.
    Durable(SendOutcome),
    /// Handed off through the deferred action ledger.
    Ledger(EnqueueOutcome),
}

/// Returned to the UI immediately after the optimistic update.
#[derive(Debug)]
pub struct MutationReceipt {
    /// The intent that was dispatched.
    pub intent: MutationIntent,
    /// Delivery path taken.
    pub delivery: Delivery,
}

impl MutationReceipt {
    /// Wait for a background send to finish. Only tests and tooling do this;
    /// the UI never awaits delivery.
    pub async fn settle(self) -> Option<SendOutcome> {
        match self.delivery {
            Delivery::Spawned(handle) => handle.await.ok(),
            Delivery::Durable(outcome) => Some(outcome),
            Delivery::Ledger(_) => None,
        }
    }
}

/// What the UI shows about sync health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    /// `produced_at` of the cached snapshot.
    pub last_synced_at: Option<Timestamp>,
    /// Whether the cached snapshot is past the staleness threshold.
    pub is_stale: bool,
    /// Last known peer reachability.
    pub is_peer_reachable: bool,
    /// Soft "will sync later" text, if set.
    pub status_message: Option<String>,
    /// Records waiting in the deferred action ledger.
    pub pending_actions: usize,
}

/// Result of one authority-side drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Records applied and removed from the ledger.
    pub applied: usize,
    /// Records left for the next drain because applying them failed.
    pub failed: usize,
    /// Records skipped because a later record has the same identity.
    pub superseded: usize,
    /// Records pruned by TTL during this drain.
    pub expired_pruned: u64,
}
