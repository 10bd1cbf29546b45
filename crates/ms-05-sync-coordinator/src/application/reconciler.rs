//! # Authority Reconciler
//!
//! Authority-side counterpart of the coordinator: consumes the deferred
//! action ledger and inbound messages, applies them to the canonical store,
//! and publishes fresh snapshots.
//!
//! Drain policy: a record leaves the ledger only once it has been applied
//! (or superseded by a later record with the same identity). Records that
//! fail stay for the next drain until the TTL prunes them.

use ms_01_snapshot_codec::{encode_snapshot, ApplicationContext};
use ms_02_action_ledger::DeferredActionLedger;
use ms_03_transport_channel::TransportChannel;
use parking_lot::Mutex;
use shared_bus::{Subscription, SyncEvent};
use shared_storage::keys::{OVERLAY_KEY, SNAPSHOT_KEY};
use shared_storage::{load_settings, BatchOperation, KeyValueStore, TimeSource};
use shared_types::{DedupKey, MutationIntent, Timestamp, VehicleSnapshot};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::{ApplyError, DrainReport, SyncError};
use crate::ports::CanonicalStore;

/// Authority-side reconciliation service.
pub struct AuthorityReconciler {
    canonical: Arc<dyn CanonicalStore>,
    ledger: Arc<DeferredActionLedger>,
    channel: Arc<TransportChannel>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
    /// Last `produced_at` handed out.
    last_produced_at: Mutex<Option<Timestamp>>,
    /// Newest `issued_at` applied per vehicle for mileage updates.
    mileage_applied_at: Mutex<HashMap<Uuid, Timestamp>>,
}

/// What happened to one intent on its way into the canonical store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Application {
    Applied,
    /// A newer mileage update for the same vehicle was already applied.
    Outdated,
}

impl AuthorityReconciler {
    /// Create a reconciler.
    pub fn new(
        canonical: Arc<dyn CanonicalStore>,
        ledger: Arc<DeferredActionLedger>,
        channel: Arc<TransportChannel>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            canonical,
            ledger,
            channel,
            store,
            clock,
            last_produced_at: Mutex::new(None),
            mileage_applied_at: Mutex::new(HashMap::new()),
        }
    }

    /// Apply everything satellites handed off while the authority was away.
    ///
    /// Records are applied in enqueue order; within one replay only the last
    /// record per dedup identity is applied. One failure never blocks the rest.
    pub fn drain_deferred_actions(&self) -> DrainReport {
        let pruned_before = self.ledger.metrics().pruned_count();
        let records = self.ledger.drain_all();
        let mut report = DrainReport {
            expired_pruned: self.ledger.metrics().pruned_count() - pruned_before,
            ..DrainReport::default()
        };

        let last_for_identity: HashMap<DedupKey, u64> = records
            .iter()
            .map(|r| (r.intent.dedup_key(), r.sequence))
            .collect();

        let mut done = Vec::with_capacity(records.len());
        for record in &records {
            if last_for_identity.get(&record.intent.dedup_key()) != Some(&record.sequence) {
                report.superseded += 1;
                done.push(record.sequence);
                continue;
            }
            match self.apply_in_order(&record.intent) {
                Ok(Application::Applied) => {
                    report.applied += 1;
                    done.push(record.sequence);
                }
                Ok(Application::Outdated) => {
                    report.superseded += 1;
                    done.push(record.sequence);
                }
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        sequence = record.sequence,
                        key = %record.intent.message_key(),
                        error = %e,
                        "[ms-05] Deferred action failed, kept for next drain"
                    );
                }
            }
        }

        // Acknowledging exactly what was applied leaves records enqueued by
        // other processes during this drain in place.
        if let Err(e) = self.ledger.acknowledge(&done) {
            warn!(error = %e, "[ms-05] Failed to acknowledge drained records");
        }

        info!(
            applied = report.applied,
            failed = report.failed,
            superseded = report.superseded,
            expired_pruned = report.expired_pruned,
            "[ms-05] Deferred actions drained"
        );
        report
    }

    /// Apply a live mutation message. If the canonical store refuses it, the
    /// intent is parked in the ledger so the next drain retries it.
    pub fn receive_message(&self, payload: &[u8]) -> Result<MutationIntent, SyncError> {
        let intent = self
            .channel
            .receive_message(payload)
            .ok_or(SyncError::Unreadable)?;

        match self.apply_in_order(&intent) {
            Ok(Application::Applied) => {
                debug!(key = %intent.message_key(), vehicle_id = %intent.vehicle_id(), "[ms-05] Live mutation applied");
            }
            Ok(Application::Outdated) => {
                debug!(vehicle_id = %intent.vehicle_id(), "[ms-05] Outdated mileage update skipped");
            }
            Err(e) => {
                warn!(
                    key = %intent.message_key(),
                    error = %e,
                    "[ms-05] Live mutation failed, parked in ledger"
                );
                self.ledger.enqueue(intent);
                return Err(e.into());
            }
        }
        Ok(intent)
    }

    /// Build the snapshot for the pinned vehicle, write it to the shared
    /// store for display surfaces and push it to the satellite.
    ///
    /// `produced_at` strictly increases across calls even if the clock does not.
    pub async fn publish_snapshot(&self) -> Result<Option<VehicleSnapshot>, SyncError> {
        let settings = load_settings(self.store.as_ref());
        let stamp = self.next_stamp();

        let snapshot = self.canonical.snapshot(&settings).map(|mut s| {
            s.produced_at = stamp;
            s
        });

        // A shared overlay was made on the previous snapshot and is dropped
        // in the same write.
        let batch = match &snapshot {
            Some(s) => match encode_snapshot(s) {
                Ok(bytes) => Some(vec![
                    BatchOperation::put(SNAPSHOT_KEY, bytes),
                    BatchOperation::delete(OVERLAY_KEY),
                ]),
                Err(e) => {
                    warn!(error = %e, "[ms-05] Snapshot not encodable");
                    None
                }
            },
            None => Some(vec![
                BatchOperation::delete(SNAPSHOT_KEY),
                BatchOperation::delete(OVERLAY_KEY),
            ]),
        };
        if let Some(batch) = batch {
            if let Err(e) = self.store.atomic_batch_write(batch) {
                warn!(error = %e, "[ms-05] Shared snapshot not written");
            }
        }

        let context = ApplicationContext {
            snapshot: snapshot.clone(),
            pushed_at: stamp,
        };
        self.channel.publish_context(&context).await?;
        info!(
            produced_at = stamp,
            has_vehicle = snapshot.is_some(),
            "[ms-05] Snapshot published"
        );
        Ok(snapshot)
    }

    /// Apply one marshaled event.
    pub async fn handle_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::MessageReceived { payload } => {
                if self.receive_message(payload).is_ok() {
                    self.publish_logged().await;
                }
            }
            SyncEvent::AuthorityResumed => {
                let report = self.drain_deferred_actions();
                if report.applied > 0 || report.superseded > 0 {
                    self.publish_logged().await;
                }
            }
            SyncEvent::ReachabilityChanged { reachable } => {
                self.channel.on_reachability_changed(*reachable);
            }
            SyncEvent::ApplicationContextReceived { .. } | SyncEvent::ReloadRequested => {
                debug!(topic = ?event.topic(), "[ms-05] Satellite event ignored on authority");
            }
        }
    }

    /// Authority event loop.
    pub async fn run(&self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!("[ms-05] Authority loop running");
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => self.handle_event(&event).await,
                    None => break,
                },
                _ = shutdown.changed() => {
                    info!("[ms-05] Shutdown signal received");
                    break;
                }
            }
        }
    }

    async fn publish_logged(&self) {
        if let Err(e) = self.publish_snapshot().await {
            warn!(error = %e, "[ms-05] Snapshot publish failed");
        }
    }

    /// Apply `intent` unless it is a mileage update older than one already
    /// applied for the same vehicle. Live sends may arrive out of order.
    fn apply_in_order(&self, intent: &MutationIntent) -> Result<Application, ApplyError> {
        let MutationIntent::MileageUpdate {
            vehicle_id,
            issued_at,
            ..
        } = intent
        else {
            self.canonical.apply(intent)?;
            return Ok(Application::Applied);
        };

        let mut applied_at = self.mileage_applied_at.lock();
        if applied_at.get(vehicle_id).is_some_and(|newest| issued_at < newest) {
            return Ok(Application::Outdated);
        }
        self.canonical.apply(intent)?;
        applied_at.insert(*vehicle_id, *issued_at);
        Ok(Application::Applied)
    }

    fn next_stamp(&self) -> Timestamp {
        let now = self.clock.now();
        let mut last = self.last_produced_at.lock();
        let stamp = match *last {
            Some(previous) if now <= previous => previous + 1,
            _ => now,
        };
        *last = Some(stamp);
        stamp
    }
}
