//! # Sync Container
//!
//! Builds the subsystems for one process and hands each its collaborators.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: shared store, clock, event bus
//! Level 1: DeferredActionLedger, TransportChannel
//! Level 2: LocalSnapshotCache (satellites only)
//! Level 3: SyncCoordinator (satellite) or AuthorityReconciler (authority)
//! ```
//!
//! The event bus is created here but the transport is built by the caller,
//! so the caller attaches the bus to its transport adapter.

use std::sync::Arc;

use tracing::info;

use ms_02_action_ledger::DeferredActionLedger;
use ms_03_transport_channel::{Transport, TransportChannel};
use ms_04_snapshot_cache::LocalSnapshotCache;
use ms_05_sync_coordinator::{AuthorityReconciler, CanonicalStore, SyncCoordinator};
use shared_bus::InMemoryEventBus;
use shared_storage::{FileBackedKVStore, KeyValueStore, StorageError, SystemTimeSource, TimeSource};

use crate::container::config::RuntimeConfig;

/// The service that owns writes in this process.
#[derive(Clone)]
pub enum Endpoint {
    /// Wearable or widget.
    Satellite(Arc<SyncCoordinator>),
    /// Primary handheld.
    Authority(Arc<AuthorityReconciler>),
}

/// Central container holding all subsystem instances.
pub struct SyncContainer {
    // =========================================================================
    // SHARED INFRASTRUCTURE
    // =========================================================================
    /// Shared durable region.
    pub store: Arc<dyn KeyValueStore>,

    /// Wall clock.
    pub clock: Arc<dyn TimeSource>,

    /// Bus carrying transport callbacks to the event loop.
    pub event_bus: Arc<InMemoryEventBus>,

    // =========================================================================
    // SUBSYSTEMS
    // =========================================================================
    /// Deferred action ledger (ms-02).
    pub ledger: Arc<DeferredActionLedger>,

    /// Transport channel (ms-03).
    pub channel: Arc<TransportChannel>,

    /// Coordinator or reconciler (ms-05).
    pub endpoint: Endpoint,

    /// Runtime configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl SyncContainer {
    /// Satellite container on the file-backed store under `config.data_dir`.
    pub fn new(config: RuntimeConfig, transport: Arc<dyn Transport>) -> Result<Self, StorageError> {
        let store = Arc::new(FileBackedKVStore::open(config.store_path())?);
        Ok(Self::with_store(
            config,
            store,
            Arc::new(SystemTimeSource),
            transport,
        ))
    }

    /// Satellite container on an explicit store and clock.
    pub fn with_store(
        config: RuntimeConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        info!(role = %config.role, "[runtime] Initializing satellite subsystems");

        let (event_bus, ledger, channel) = Self::infrastructure(&config, &store, &clock, transport);

        let cache = Arc::new(LocalSnapshotCache::open(
            config.cache.clone(),
            Arc::clone(&store),
            Arc::clone(&clock),
        ));
        let coordinator = Arc::new(SyncCoordinator::new(
            config.coordinator(),
            cache,
            Arc::clone(&ledger),
            Arc::clone(&channel),
            Arc::clone(&clock),
        ));

        Self {
            store,
            clock,
            event_bus,
            ledger,
            channel,
            endpoint: Endpoint::Satellite(coordinator),
            config,
        }
    }

    /// Authority container on the file-backed store under `config.data_dir`.
    pub fn authority(
        config: RuntimeConfig,
        transport: Arc<dyn Transport>,
        canonical: Arc<dyn CanonicalStore>,
    ) -> Result<Self, StorageError> {
        let store = Arc::new(FileBackedKVStore::open(config.store_path())?);
        Ok(Self::authority_with_store(
            config,
            store,
            Arc::new(SystemTimeSource),
            transport,
            canonical,
        ))
    }

    /// Authority container on an explicit store and clock.
    pub fn authority_with_store(
        config: RuntimeConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
        transport: Arc<dyn Transport>,
        canonical: Arc<dyn CanonicalStore>,
    ) -> Self {
        info!("[runtime] Initializing authority subsystems");

        let (event_bus, ledger, channel) = Self::infrastructure(&config, &store, &clock, transport);

        let reconciler = Arc::new(AuthorityReconciler::new(
            canonical,
            Arc::clone(&ledger),
            Arc::clone(&channel),
            Arc::clone(&store),
            Arc::clone(&clock),
        ));

        Self {
            store,
            clock,
            event_bus,
            ledger,
            channel,
            endpoint: Endpoint::Authority(reconciler),
            config,
        }
    }

    fn infrastructure(
        config: &RuntimeConfig,
        store: &Arc<dyn KeyValueStore>,
        clock: &Arc<dyn TimeSource>,
        transport: Arc<dyn Transport>,
    ) -> (
        Arc<InMemoryEventBus>,
        Arc<DeferredActionLedger>,
        Arc<TransportChannel>,
    ) {
        let event_bus = Arc::new(InMemoryEventBus::new());
        let ledger = Arc::new(DeferredActionLedger::new(
            config.ledger.clone(),
            Arc::clone(store),
            Arc::clone(clock),
        ));
        let channel = Arc::new(TransportChannel::new(config.channel.clone(), transport));
        (event_bus, ledger, channel)
    }

    /// The satellite coordinator, if this is a satellite container.
    pub fn coordinator(&self) -> Option<&Arc<SyncCoordinator>> {
        match &self.endpoint {
            Endpoint::Satellite(coordinator) => Some(coordinator),
            Endpoint::Authority(_) => None,
        }
    }

    /// The reconciler, if this is an authority container.
    pub fn reconciler(&self) -> Option<&Arc<AuthorityReconciler>> {
        match &self.endpoint {
            Endpoint::Authority(reconciler) => Some(reconciler),
            Endpoint::Satellite(_) => None,
        }
    }
}
