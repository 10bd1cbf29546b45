//! # Sync Coordinator
//!
//! Satellite-side orchestration. Mutations return right after the optimistic
//! cache update; delivery continues on a spawned task or through the ledger.

use ms_02_action_ledger::DeferredActionLedger;
use ms_03_transport_channel::TransportChannel;
use ms_04_snapshot_cache::{LocalSnapshotCache, ReplaceOutcome};
use shared_bus::{Subscription, SyncEvent};
use shared_storage::TimeSource;
use shared_types::MutationIntent;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{CoordinatorConfig, ProcessRole};
use crate::domain::{Delivery, MutationReceipt, SyncError, SyncStatus};

/// Satellite sync coordinator. One per process, built explicitly and handed
/// its collaborators.
pub struct SyncCoordinator {
    config: CoordinatorConfig,
    cache: Arc<LocalSnapshotCache>,
    ledger: Arc<DeferredActionLedger>,
    channel: Arc<TransportChannel>,
    clock: Arc<dyn TimeSource>,
}

impl SyncCoordinator {
    /// Create a coordinator.
    pub fn new(
        config: CoordinatorConfig,
        cache: Arc<LocalSnapshotCache>,
        ledger: Arc<DeferredActionLedger>,
        channel: Arc<TransportChannel>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            cache,
            ledger,
            channel,
            clock,
        }
    }

    /// Bring the cache up to date before normal operation: replay a context
    /// that was already waiting, and for handoff-only processes re-read the
    /// shared store.
    pub fn start(&self) -> Option<ReplaceOutcome> {
        let from_context = self
            .channel
            .drain_waiting_context()
            .map(|context| self.cache.apply_context(context));

        let from_store = match self.config.role {
            ProcessRole::HandoffOnly => self.cache.reload(),
            ProcessRole::Connected => None,
        };

        let outcome = match (from_context, from_store) {
            (Some(ReplaceOutcome::Applied), _) | (_, Some(ReplaceOutcome::Applied)) => {
                Some(ReplaceOutcome::Applied)
            }
            (a, b) => a.or(b),
        };
        info!(
            role = ?self.config.role,
            outcome = ?outcome,
            cached = self.cache.last_synced_at().is_some(),
            "[ms-05] Coordinator started"
        );
        outcome
    }

    // =========================================================================
    // User-initiated mutations
    // =========================================================================

    /// Record a new odometer reading.
    pub fn update_mileage(&self, new_mileage: u32) -> Result<MutationReceipt, SyncError> {
        let current = self.cache.current().ok_or(SyncError::NoVehicle)?;
        let intent = MutationIntent::MileageUpdate {
            vehicle_id: current.vehicle_id,
            new_mileage,
            issued_at: self.clock.now(),
        };
        self.cache.apply_optimistic_mileage(new_mileage)?;
        Ok(self.dispatch(intent))
    }

    /// Mark a maintenance item done.
    pub fn mark_service_done(
        &self,
        service_id: Option<Uuid>,
        service_name: &str,
    ) -> Result<MutationReceipt, SyncError> {
        let current = self.cache.current().ok_or(SyncError::NoVehicle)?;
        let intent = MutationIntent::ServiceCompletion {
            vehicle_id: current.vehicle_id,
            service_id,
            service_name: service_name.to_string(),
            mileage_at_service: current.display_mileage(),
            performed_at: self.clock.now(),
        };
        self.cache
            .apply_optimistic_service_removal(service_id, service_name)?;
        Ok(self.dispatch(intent))
    }

    fn dispatch(&self, intent: MutationIntent) -> MutationReceipt {
        let delivery = match self.config.role {
            ProcessRole::HandoffOnly => Delivery::Ledger(self.ledger.enqueue(intent.clone())),
            ProcessRole::Connected => match Handle::try_current() {
                Ok(handle) => {
                    let channel = Arc::clone(&self.channel);
                    let pending = intent.clone();
                    Delivery::Spawned(handle.spawn(async move { channel.send(&pending).await }))
                }
                Err(_) => {
                    warn!("[ms-05] No async runtime, using durable queue");
                    Delivery::Durable(self.channel.send_durable(&intent))
                }
            },
        };
        debug!(key = %intent.message_key(), "[ms-05] Mutation dispatched");
        MutationReceipt { intent, delivery }
    }

    // =========================================================================
    // Event loop
    // =========================================================================

    /// Apply one marshaled transport or lifecycle event.
    pub fn handle_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::ReachabilityChanged { reachable } => {
                self.channel.on_reachability_changed(*reachable);
            }
            SyncEvent::ApplicationContextReceived { payload } => {
                if let Some(context) = self.channel.on_application_context(payload) {
                    self.cache.apply_context(context);
                }
            }
            SyncEvent::ReloadRequested => {
                self.cache.reload();
            }
            SyncEvent::MessageReceived { .. } | SyncEvent::AuthorityResumed => {
                debug!(topic = ?event.topic(), "[ms-05] Authority event ignored on satellite");
            }
        }
    }

    /// Single-writer loop: apply events until the bus closes or shutdown is
    /// signalled.
    pub async fn run(&self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!("[ms-05] Event loop running");
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(event) => self.handle_event(&event),
                    None => {
                        info!("[ms-05] Event bus closed");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("[ms-05] Shutdown signal received");
                    break;
                }
            }
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    /// Sync health for the UI.
    pub fn sync_status(&self) -> SyncStatus {
        SyncStatus {
            last_synced_at: self.cache.last_synced_at(),
            is_stale: self.cache.is_stale(),
            is_peer_reachable: self.channel.is_peer_reachable(),
            status_message: self.channel.status_message(),
            pending_actions: self.ledger.pending_count(),
        }
    }

    /// The cache this coordinator writes.
    pub fn cache(&self) -> &Arc<LocalSnapshotCache> {
        &self.cache
    }

    /// The channel this coordinator sends on.
    pub fn channel(&self) -> &Arc<TransportChannel> {
        &self.channel
    }

    /// The ledger this coordinator hands off to.
    pub fn ledger(&self) -> &Arc<DeferredActionLedger> {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ms_01_snapshot_codec::{encode_context, ApplicationContext};
    use ms_02_action_ledger::{EnqueueOutcome, LedgerConfig};
    use ms_03_transport_channel::{ChannelConfig, LoopbackTransport, SendOutcome, Transport};
    use ms_04_snapshot_cache::CacheConfig;
    use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBus};
    use shared_storage::{InMemoryKVStore, ManualClock};
    use shared_types::{ServiceStatus, ServiceSummary, VehicleSnapshot};
    use std::time::Duration;

    const T0: u64 = 1_700_000_000_000;

    struct Harness {
        coordinator: Arc<SyncCoordinator>,
        satellite: LoopbackTransport,
        authority: LoopbackTransport,
    }

    fn civic(produced_at: u64) -> VehicleSnapshot {
        VehicleSnapshot::new(Uuid::from_u128(1), "Civic", 50_000, produced_at).with_services(vec![
            ServiceSummary::new(Uuid::from_u128(7), "Oil Change", ServiceStatus::DueSoon, ""),
        ])
    }

    fn harness(role: ProcessRole, reachable: bool) -> Harness {
        let store = Arc::new(InMemoryKVStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let (satellite, authority) = LoopbackTransport::pair(reachable);

        let cache = Arc::new(LocalSnapshotCache::open(
            CacheConfig::for_testing(),
            store.clone(),
            clock.clone(),
        ));
        cache.replace(civic(T0));
        let ledger = Arc::new(DeferredActionLedger::new(
            LedgerConfig::for_testing(),
            store,
            clock.clone(),
        ));
        let channel = Arc::new(TransportChannel::new(
            ChannelConfig::default(),
            Arc::new(satellite.clone()),
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            CoordinatorConfig::with_role(role),
            cache,
            ledger,
            channel,
            clock,
        ));
        Harness {
            coordinator,
            satellite,
            authority,
        }
    }

    #[tokio::test]
    async fn test_connected_mileage_is_optimistic_then_delivered() {
        let h = harness(ProcessRole::Connected, true);

        let receipt = h.coordinator.update_mileage(50_300).unwrap();
        assert_eq!(h.coordinator.cache().current().unwrap().current_mileage, 50_300);

        assert_eq!(receipt.settle().await, Some(SendOutcome::Delivered));
        assert_eq!(h.authority.inbox().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_sets_status() {
        let h = harness(ProcessRole::Connected, false);

        let receipt = h.coordinator.update_mileage(50_300).unwrap();
        assert_eq!(receipt.settle().await, Some(SendOutcome::Queued));

        let status = h.coordinator.sync_status();
        assert!(!status.is_peer_reachable);
        assert!(status.status_message.is_some());
        assert_eq!(h.satellite.durable_backlog(), 1);
    }

    #[test]
    fn test_handoff_only_uses_ledger() {
        let h = harness(ProcessRole::HandoffOnly, false);

        let first = h.coordinator.mark_service_done(Some(Uuid::from_u128(7)), "Oil Change").unwrap();
        let second = h.coordinator.mark_service_done(Some(Uuid::from_u128(7)), "Oil Change").unwrap();

        assert!(matches!(first.delivery, Delivery::Ledger(EnqueueOutcome::Added { .. })));
        assert!(matches!(second.delivery, Delivery::Ledger(EnqueueOutcome::Duplicate { .. })));
        assert!(h.coordinator.cache().current().unwrap().services.is_empty());
        assert_eq!(h.coordinator.sync_status().pending_actions, 1);
    }

    #[test]
    fn test_connected_without_runtime_goes_durable() {
        let h = harness(ProcessRole::Connected, false);
        let receipt = h.coordinator.update_mileage(50_300).unwrap();
        assert!(matches!(receipt.delivery, Delivery::Durable(SendOutcome::Queued)));
    }

    #[test]
    fn test_no_vehicle() {
        let h = harness(ProcessRole::Connected, true);
        h.coordinator
            .cache()
            .apply_context(ApplicationContext::empty(T0 + 1));

        assert!(matches!(
            h.coordinator.update_mileage(1),
            Err(SyncError::NoVehicle)
        ));
    }

    #[tokio::test]
    async fn test_start_replays_waiting_context() {
        let h = harness(ProcessRole::Connected, true);
        let fresh = civic(T0 + 10);
        let payload = encode_context(&ApplicationContext::with_snapshot(fresh.clone(), T0 + 10)).unwrap();
        h.authority.update_application_context(payload).await.unwrap();

        assert_eq!(h.coordinator.start(), Some(ReplaceOutcome::Applied));
        assert_eq!(h.coordinator.cache().current(), Some(fresh));
    }

    #[tokio::test]
    async fn test_run_applies_events_until_shutdown() {
        let h = harness(ProcessRole::Connected, false);
        let bus = Arc::new(InMemoryEventBus::new());
        let subscription = bus.subscribe(EventFilter::all());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let coordinator = Arc::clone(&h.coordinator);
        let task = tokio::spawn(async move { coordinator.run(subscription, shutdown_rx).await });

        let fresh = civic(T0 + 10);
        let payload = encode_context(&ApplicationContext::with_snapshot(fresh.clone(), T0 + 10)).unwrap();
        bus.publish(SyncEvent::ReachabilityChanged { reachable: true });
        bus.publish(SyncEvent::ApplicationContextReceived { payload });

        for _ in 0..50 {
            if h.coordinator.cache().last_synced_at() == Some(T0 + 10) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(h.coordinator.cache().current(), Some(fresh));
        assert!(h.coordinator.channel().is_peer_reachable());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
