//! # Deferred Action Ledger Service
//!
//! Every public operation is one load → mutate → store cycle under `guard`.

use parking_lot::Mutex;
use shared_storage::{KeyValueStore, TimeSource};
use shared_types::MutationIntent;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::domain::{
    EnqueueOutcome, LedgerDocument, LedgerError, LedgerMetrics, PendingActionRecord,
};

/// Durable handoff queue of mutations waiting for the authority.
pub struct DeferredActionLedger {
    config: LedgerConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
    /// Exclusive critical section around load/mutate/store.
    guard: Mutex<()>,
    metrics: LedgerMetrics,
}

impl DeferredActionLedger {
    /// Create a ledger over the shared store.
    pub fn new(
        config: LedgerConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
            guard: Mutex::new(()),
            metrics: LedgerMetrics::new(),
        }
    }

    /// Record an intent for later delivery.
    ///
    /// Never fails: storage problems yield `EnqueueOutcome::NotRecorded`
    /// and a warning.
    pub fn enqueue(&self, intent: MutationIntent) -> EnqueueOutcome {
        let _guard = self.guard.lock();
        let now = self.clock.now();

        let mut doc = match self.load() {
            Ok(doc) => doc,
            Err(e) => return self.not_recorded(&intent, &e),
        };
        self.prune_and_count(&mut doc, now);

        let key = intent.dedup_key();
        let existing = doc
            .records
            .iter()
            .position(|r| r.intent.dedup_key() == key);

        let outcome = match existing {
            Some(index) if intent.latest_wins() => {
                let replaced = doc.records.remove(index).sequence;
                let sequence = doc.next();
                doc.records.push(PendingActionRecord {
                    sequence,
                    enqueued_at: now,
                    intent: intent.clone(),
                });
                EnqueueOutcome::Superseded { replaced, sequence }
            }
            Some(index) => EnqueueOutcome::Duplicate {
                existing: doc.records[index].sequence,
            },
            None => {
                let sequence = doc.next();
                doc.records.push(PendingActionRecord {
                    sequence,
                    enqueued_at: now,
                    intent: intent.clone(),
                });
                EnqueueOutcome::Added { sequence }
            }
        };

        if let EnqueueOutcome::Duplicate { existing } = outcome {
            LedgerMetrics::bump(&self.metrics.duplicates, 1);
            debug!(
                sequence = existing,
                key = %intent.message_key(),
                "[ms-02] Intent already pending, ignored"
            );
            return outcome;
        }

        if let Err(e) = self.store_doc(&doc) {
            return self.not_recorded(&intent, &e);
        }

        match outcome {
            EnqueueOutcome::Superseded { replaced, sequence } => {
                LedgerMetrics::bump(&self.metrics.superseded, 1);
                debug!(replaced, sequence, "[ms-02] Pending mileage update superseded");
            }
            EnqueueOutcome::Added { sequence } => {
                LedgerMetrics::bump(&self.metrics.enqueued, 1);
                debug!(
                    sequence,
                    vehicle_id = %intent.vehicle_id(),
                    key = %intent.message_key(),
                    "[ms-02] Intent enqueued"
                );
            }
            _ => {}
        }
        outcome
    }

    /// All unexpired records in enqueue order.
    ///
    /// Expired records are removed and the pruned ledger is persisted before
    /// returning. An unreadable store yields an empty list.
    pub fn drain_all(&self) -> Vec<PendingActionRecord> {
        let _guard = self.guard.lock();
        let now = self.clock.now();

        let mut doc = match self.load() {
            Ok(doc) => doc,
            Err(e) => {
                warn!(error = %e, "[ms-02] Ledger unreadable, nothing to drain");
                return Vec::new();
            }
        };

        if self.prune_and_count(&mut doc, now) > 0 {
            if let Err(e) = self.store_doc(&doc) {
                warn!(error = %e, "[ms-02] Failed to persist pruned ledger");
            }
        }

        doc.records.sort_by_key(|r| r.sequence);
        doc.records
    }

    /// Remove every record. Sequence numbering continues where it left off.
    pub fn clear(&self) -> Result<(), LedgerError> {
        let _guard = self.guard.lock();
        let mut doc = self.load()?;
        let removed = doc.records.len();
        doc.records.clear();
        self.store_doc(&doc)?;
        info!(removed, "[ms-02] Ledger cleared");
        Ok(())
    }

    /// Remove the records with the given sequence numbers.
    ///
    /// Used after the authority confirmed applying them; everything else
    /// stays for the next drain. Returns how many records were removed.
    pub fn acknowledge(&self, sequences: &[u64]) -> Result<usize, LedgerError> {
        if sequences.is_empty() {
            return Ok(0);
        }
        let _guard = self.guard.lock();
        let mut doc = self.load()?;
        let before = doc.records.len();
        doc.records.retain(|r| !sequences.contains(&r.sequence));
        let removed = before - doc.records.len();
        if removed > 0 {
            self.store_doc(&doc)?;
        }
        debug!(removed, remaining = doc.records.len(), "[ms-02] Records acknowledged");
        Ok(removed)
    }

    /// Number of unexpired records. Does not persist pruning.
    pub fn pending_count(&self) -> usize {
        let _guard = self.guard.lock();
        let now = self.clock.now();
        let ttl_ms = self.config.ttl_ms();
        self.load()
            .map(|doc| {
                doc.records
                    .iter()
                    .filter(|r| !r.is_expired(now, ttl_ms))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Activity counters.
    pub fn metrics(&self) -> &LedgerMetrics {
        &self.metrics
    }

    /// Configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn load(&self) -> Result<LedgerDocument, LedgerError> {
        let Some(bytes) = self.store.get(&self.config.storage_key)? else {
            return Ok(LedgerDocument::default());
        };
        match serde_json::from_slice(&bytes) {
            Ok(doc) => Ok(doc),
            Err(e) => {
                warn!(error = %e, "[ms-02] Ledger document unreadable, starting empty");
                Ok(LedgerDocument::default())
            }
        }
    }

    fn store_doc(&self, doc: &LedgerDocument) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec(doc).map_err(|e| LedgerError::Encode(e.to_string()))?;
        self.store.put(&self.config.storage_key, &bytes)?;
        Ok(())
    }

    fn prune_and_count(&self, doc: &mut LedgerDocument, now: u64) -> usize {
        let pruned = doc.prune(now, self.config.ttl_ms());
        if pruned > 0 {
            LedgerMetrics::bump(&self.metrics.pruned, pruned as u64);
            info!(pruned, "[ms-02] Expired records pruned");
        }
        pruned
    }

    fn not_recorded(&self, intent: &MutationIntent, error: &LedgerError) -> EnqueueOutcome {
        LedgerMetrics::bump(&self.metrics.not_recorded, 1);
        warn!(
            error = %error,
            vehicle_id = %intent.vehicle_id(),
            key = %intent.message_key(),
            "[ms-02] Mutation not recorded"
        );
        EnqueueOutcome::NotRecorded
    }
}
