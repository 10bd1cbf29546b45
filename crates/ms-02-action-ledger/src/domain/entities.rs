//! # Ledger Entities

use serde::{Deserialize, Serialize};
use shared_types::{MutationIntent, Timestamp};

/// A mutation waiting for the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingActionRecord {
    /// Monotonic across the life of the ledger, including across `clear`.
    pub sequence: u64,
    /// When the record was appended.
    pub enqueued_at: Timestamp,
    /// The mutation.
    pub intent: MutationIntent,
}

impl PendingActionRecord {
    /// Whether the record has outlived `ttl_ms` at `now`.
    pub fn is_expired(&self, now: Timestamp, ttl_ms: Timestamp) -> bool {
        now.saturating_sub(self.enqueued_at) > ttl_ms
    }
}

/// Result of `DeferredActionLedger::enqueue`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended as a new record.
    Added {
        /// Sequence assigned.
        sequence: u64,
    },
    /// Replaced an older record with the same identity (mileage, latest wins).
    Superseded {
        /// Sequence of the removed record.
        replaced: u64,
        /// Sequence assigned to the new record.
        sequence: u64,
    },
    /// An equivalent record is already pending; nothing changed.
    Duplicate {
        /// Sequence of the pending record.
        existing: u64,
    },
    /// The store was unavailable; the intent was not recorded.
    NotRecorded,
}

impl EnqueueOutcome {
    /// Whether the ledger now holds a record it did not hold before.
    pub fn was_added(&self) -> bool {
        matches!(
            self,
            EnqueueOutcome::Added { .. } | EnqueueOutcome::Superseded { .. }
        )
    }
}

/// The persisted ledger: one JSON document under one key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerDocument {
    #[serde(default)]
    pub next_sequence: u64,
    #[serde(default)]
    pub records: Vec<PendingActionRecord>,
}

impl LedgerDocument {
    pub fn next(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Drop expired records; returns how many were removed.
    pub fn prune(&mut self, now: Timestamp, ttl_ms: Timestamp) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !r.is_expired(now, ttl_ms));
        before - self.records.len()
    }
}
