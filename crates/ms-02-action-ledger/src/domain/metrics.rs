//! # Ledger Metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for ledger activity. `not_recorded` is the observable signal for
/// mutations lost to storage failures.
#[derive(Debug, Default)]
pub struct LedgerMetrics {
    /// Records newly appended.
    pub enqueued: AtomicU64,
    /// Mileage records replaced by a newer one.
    pub superseded: AtomicU64,
    /// Completions rejected as already pending.
    pub duplicates: AtomicU64,
    /// Intents lost because the store was unavailable.
    pub not_recorded: AtomicU64,
    /// Records dropped by TTL pruning.
    pub pruned: AtomicU64,
}

impl LedgerMetrics {
    /// Create new metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    /// Records newly appended.
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    /// Mileage records replaced.
    pub fn superseded_count(&self) -> u64 {
        self.superseded.load(Ordering::Relaxed)
    }

    /// Duplicate completions rejected.
    pub fn duplicate_count(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Intents lost to storage failures.
    pub fn not_recorded_count(&self) -> u64 {
        self.not_recorded.load(Ordering::Relaxed)
    }

    /// Records pruned by TTL.
    pub fn pruned_count(&self) -> u64 {
        self.pruned.load(Ordering::Relaxed)
    }
}
