//! # Test Harness
//!
//! Builds satellites and an authority with production keys, so processes
//! that share a store see each other's snapshot and ledger entries.
//!
//! Events are pumped by hand instead of through spawned loops, which keeps
//! every scenario deterministic.

use std::sync::Arc;

use ms_02_action_ledger::{DeferredActionLedger, LedgerConfig};
use ms_03_transport_channel::{ChannelConfig, LoopbackTransport, TransportChannel};
use ms_04_snapshot_cache::{CacheConfig, LocalSnapshotCache};
use ms_05_sync_coordinator::{
    AuthorityReconciler, CoordinatorConfig, MockCanonicalStore, ProcessRole, SyncCoordinator,
};
use shared_bus::{EventFilter, EventPublisher, EventSubscriber, InMemoryEventBus, Subscription, SyncEvent};
use shared_storage::{InMemoryKVStore, KeyValueStore, ManualClock, TimeSource};
use shared_types::{ServiceStatus, ServiceSummary, Timestamp, VehicleSnapshot};
use uuid::Uuid;

/// Vehicle used by every scenario.
pub const VEHICLE: Uuid = Uuid::from_u128(0xC1C1C);

/// Service with a stable ID.
pub const OIL_CHANGE: Uuid = Uuid::from_u128(0x011);

/// Start of test time.
pub const T0: Timestamp = 1_700_000_000_000;

/// Canonical vehicle with two services.
pub fn civic(mileage: u32, produced_at: Timestamp) -> VehicleSnapshot {
    VehicleSnapshot::new(VEHICLE, "Civic", mileage, produced_at).with_services(vec![
        ServiceSummary::new(OIL_CHANGE, "Oil Change", ServiceStatus::Overdue, "Overdue by 300 mi"),
        ServiceSummary::new(
            Uuid::from_u128(0x022),
            "Tire Rotation",
            ServiceStatus::DueSoon,
            "Due in 12 days",
        ),
    ])
}

/// One process: its services plus the bus its transport publishes to.
pub struct Process<S> {
    /// Coordinator or reconciler.
    pub service: Arc<S>,
    /// Bus subscription standing in for the event loop.
    pub events: Subscription,
}

impl<S> Process<S> {
    /// Take every event waiting on the bus.
    pub fn pending_events(&mut self) -> Vec<SyncEvent> {
        self.events.drain()
    }
}

impl Process<SyncCoordinator> {
    /// Apply waiting events, like one turn of `SyncCoordinator::run`.
    pub fn pump(&mut self) -> usize {
        let events = self.pending_events();
        for event in &events {
            self.service.handle_event(event);
        }
        events.len()
    }
}

impl Process<AuthorityReconciler> {
    /// Apply waiting events, like one turn of `AuthorityReconciler::run`.
    pub async fn pump(&mut self) -> usize {
        let events = self.pending_events();
        for event in &events {
            self.service.handle_event(event).await;
        }
        events.len()
    }
}

fn attach(transport: &LoopbackTransport) -> Subscription {
    let bus = Arc::new(InMemoryEventBus::new());
    transport.attach_bus(bus.clone() as Arc<dyn EventPublisher>);
    bus.subscribe(EventFilter::all())
}

/// Satellite on `store` talking through `transport`.
pub fn satellite(
    role: ProcessRole,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
    transport: LoopbackTransport,
) -> Process<SyncCoordinator> {
    let events = attach(&transport);
    let ledger = Arc::new(DeferredActionLedger::new(
        LedgerConfig::default(),
        store.clone(),
        clock.clone(),
    ));
    let cache = Arc::new(LocalSnapshotCache::open(
        CacheConfig::default(),
        store,
        clock.clone(),
    ));
    let channel = Arc::new(TransportChannel::new(
        ChannelConfig::default(),
        Arc::new(transport),
    ));
    let service = Arc::new(SyncCoordinator::new(
        CoordinatorConfig::with_role(role),
        cache,
        ledger,
        channel,
        clock,
    ));
    Process { service, events }
}

/// Authority on `store` talking through `transport`.
pub fn authority(
    canonical: Arc<MockCanonicalStore>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
    transport: LoopbackTransport,
) -> Process<AuthorityReconciler> {
    let events = attach(&transport);
    let ledger = Arc::new(DeferredActionLedger::new(
        LedgerConfig::default(),
        store.clone(),
        clock.clone(),
    ));
    let channel = Arc::new(TransportChannel::new(
        ChannelConfig::default(),
        Arc::new(transport),
    ));
    let service = Arc::new(AuthorityReconciler::new(
        canonical, ledger, channel, store, clock,
    ));
    Process { service, events }
}

/// Handheld (authority plus on-device widgets) and a wearable.
pub struct World {
    /// Shared clock.
    pub clock: Arc<ManualClock>,
    /// Canonical data behind the authority.
    pub canonical: Arc<MockCanonicalStore>,
    /// Shared region on the handheld.
    pub handheld_store: Arc<InMemoryKVStore>,
    /// The wearable's own store.
    pub wearable_store: Arc<InMemoryKVStore>,
    /// Satellite end of the link.
    pub wearable_link: LoopbackTransport,
    /// Authority end of the link.
    pub authority_link: LoopbackTransport,
}

impl World {
    /// Canonical store holding `civic(mileage, 0)`, link in the given state.
    pub fn new(mileage: u32, reachable: bool) -> Self {
        let canonical = Arc::new(MockCanonicalStore::new());
        canonical.insert(civic(mileage, 0));
        let (wearable_link, authority_link) = LoopbackTransport::pair(reachable);
        Self {
            clock: Arc::new(ManualClock::new(T0)),
            canonical,
            handheld_store: Arc::new(InMemoryKVStore::new()),
            wearable_store: Arc::new(InMemoryKVStore::new()),
            wearable_link,
            authority_link,
        }
    }

    /// The authority process.
    pub fn authority(&self) -> Process<AuthorityReconciler> {
        authority(
            self.canonical.clone(),
            self.handheld_store.clone(),
            self.clock.clone(),
            self.authority_link.clone(),
        )
    }

    /// The wearable process.
    pub fn wearable(&self) -> Process<SyncCoordinator> {
        satellite(
            ProcessRole::Connected,
            self.wearable_store.clone(),
            self.clock.clone(),
            self.wearable_link.clone(),
        )
    }

    /// A fresh view of the handheld's ledger, as another process would open it.
    pub fn handheld_ledger(&self) -> DeferredActionLedger {
        DeferredActionLedger::new(
            LedgerConfig::default(),
            self.handheld_store.clone(),
            self.clock.clone(),
        )
    }

    /// A widget process on the handheld. Widgets never use the link.
    pub fn widget(&self) -> Process<SyncCoordinator> {
        let (unused, _peer) = LoopbackTransport::pair(false);
        satellite(
            ProcessRole::HandoffOnly,
            self.handheld_store.clone(),
            self.clock.clone(),
            unused,
        )
    }
}
