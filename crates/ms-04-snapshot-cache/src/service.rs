//! # Local Snapshot Cache Service
//!
//! Single writer, many readers: writes take the `entry` write lock for the
//! whole mutate/persist cycle, reads take the read lock.

use ms_01_snapshot_codec::{decode_snapshot, encode_snapshot, ApplicationContext};
use parking_lot::RwLock;
use shared_storage::{BatchOperation, KeyValueStore, TimeSource};
use shared_types::{Timestamp, VehicleSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::domain::{CacheEntry, CacheError, OptimisticOverlay, ReplaceOutcome};

/// Persisted satellite view with an optimistic overlay.
pub struct LocalSnapshotCache {
    config: CacheConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn TimeSource>,
    entry: RwLock<CacheEntry>,
}

impl LocalSnapshotCache {
    /// Open the cache, restoring whatever the store holds.
    ///
    /// An unreadable store or payload leaves the cache empty.
    pub fn open(
        config: CacheConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        let snapshot = read_snapshot(store.as_ref(), &config.snapshot_key);
        let overlay = match &snapshot {
            Some(s) => {
                let overlay = read_overlay(store.as_ref(), &config.overlay_key);
                if overlay.is_empty() || overlay.is_based_on(s) {
                    overlay
                } else {
                    info!(
                        produced_at = s.produced_at,
                        overlay_base = ?overlay.base_produced_at,
                        "[ms-04] Persisted overlay predates snapshot, discarded"
                    );
                    if let Err(e) = store.delete(&config.overlay_key) {
                        warn!(error = %e, "[ms-04] Failed to delete superseded overlay");
                    }
                    OptimisticOverlay::default()
                }
            }
            None => OptimisticOverlay::default(),
        };
        if let Some(s) = &snapshot {
            info!(
                vehicle_id = %s.vehicle_id,
                produced_at = s.produced_at,
                overlay = !overlay.is_empty(),
                "[ms-04] Cache restored"
            );
        }
        Self {
            config,
            store,
            clock,
            entry: RwLock::new(CacheEntry { snapshot, overlay }),
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// The snapshot the UI should show, overlay applied.
    pub fn current(&self) -> Option<VehicleSnapshot> {
        self.entry.read().view()
    }

    /// Raw entry: authoritative snapshot and overlay.
    pub fn entry(&self) -> CacheEntry {
        self.entry.read().clone()
    }

    /// Whether the cached snapshot is older than the staleness threshold.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(self.clock.now())
    }

    /// `is_stale` evaluated at `now`. No snapshot is never stale.
    pub fn is_stale_at(&self, now: Timestamp) -> bool {
        self.last_synced_at()
            .map(|produced_at| now.saturating_sub(produced_at) > self.config.stale_after_ms())
            .unwrap_or(false)
    }

    /// Age of the cached snapshot.
    pub fn staleness(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.last_synced_at()
            .map(|produced_at| Duration::from_millis(now.saturating_sub(produced_at)))
    }

    /// `produced_at` of the cached snapshot.
    pub fn last_synced_at(&self) -> Option<Timestamp> {
        self.entry.read().snapshot.as_ref().map(|s| s.produced_at)
    }

    /// Whether unconfirmed local edits are showing.
    pub fn has_overlay(&self) -> bool {
        !self.entry.read().overlay.is_empty()
    }

    // =========================================================================
    // Authoritative merges
    // =========================================================================

    /// Merge an authoritative snapshot. Discards the overlay when applied.
    pub fn replace(&self, snapshot: VehicleSnapshot) -> ReplaceOutcome {
        let mut entry = self.entry.write();

        if let Some(cached) = &entry.snapshot {
            if snapshot.produced_at <= cached.produced_at {
                debug!(
                    incoming = snapshot.produced_at,
                    cached = cached.produced_at,
                    "[ms-04] Snapshot not newer than cache, ignored"
                );
                return ReplaceOutcome::Stale;
            }
        }

        if let Err(e) = self.persist_snapshot(&snapshot) {
            warn!(error = %e, "[ms-04] Snapshot kept in memory only");
        }
        if !entry.overlay.is_empty() {
            debug!("[ms-04] Optimistic overlay superseded");
        }
        info!(
            vehicle_id = %snapshot.vehicle_id,
            produced_at = snapshot.produced_at,
            "[ms-04] Snapshot replaced"
        );
        *entry = CacheEntry {
            snapshot: Some(snapshot),
            overlay: OptimisticOverlay::default(),
        };
        ReplaceOutcome::Applied
    }

    /// Merge an application context. A context without a snapshot means the
    /// authority has no vehicle; it clears the cache if it is newer.
    pub fn apply_context(&self, context: ApplicationContext) -> ReplaceOutcome {
        if let Some(snapshot) = context.snapshot {
            return self.replace(snapshot);
        }

        let mut entry = self.entry.write();
        if let Some(cached) = &entry.snapshot {
            if context.pushed_at <= cached.produced_at {
                return ReplaceOutcome::Stale;
            }
        }

        let cleared = self.store.atomic_batch_write(vec![
            BatchOperation::delete(self.config.snapshot_key.as_str()),
            BatchOperation::delete(self.config.overlay_key.as_str()),
        ]);
        if let Err(e) = cleared {
            warn!(error = %e, "[ms-04] Failed to clear persisted snapshot");
        }
        info!("[ms-04] Authority reports no vehicle, cache cleared");
        *entry = CacheEntry::default();
        ReplaceOutcome::Applied
    }

    /// Re-read the snapshot another process wrote to the shared store and
    /// merge it with `replace` semantics. `None` when nothing readable is stored.
    pub fn reload(&self) -> Option<ReplaceOutcome> {
        let snapshot = read_snapshot(self.store.as_ref(), &self.config.snapshot_key)?;
        Some(self.replace(snapshot))
    }

    // =========================================================================
    // Optimistic edits
    // =========================================================================

    /// Show `new_mileage` before the authority confirms it. Clears the
    /// estimated flag; services and `produced_at` are untouched.
    pub fn apply_optimistic_mileage(&self, new_mileage: u32) -> Result<VehicleSnapshot, CacheError> {
        let mut entry = self.entry.write();
        let Some(base) = entry.snapshot.as_ref().map(|s| s.produced_at) else {
            return Err(CacheError::NoSnapshot);
        };
        entry.overlay.mileage = Some(new_mileage);
        entry.overlay.base_produced_at = Some(base);
        self.persist_overlay_logged(&entry.overlay);
        debug!(new_mileage, "[ms-04] Optimistic mileage applied");
        entry.view().ok_or(CacheError::NoSnapshot)
    }

    /// Hide services matching `service_id` (or, without an ID, `service_name`).
    /// Returns how many services were hidden.
    pub fn apply_optimistic_service_removal(
        &self,
        service_id: Option<Uuid>,
        service_name: &str,
    ) -> Result<usize, CacheError> {
        let mut entry = self.entry.write();
        let Some(snapshot) = &entry.snapshot else {
            return Err(CacheError::NoSnapshot);
        };

        let keys: Vec<_> = snapshot
            .services
            .iter()
            .filter(|s| s.matches(service_id, service_name))
            .map(|s| snapshot.key_of(s))
            .filter(|k| !entry.overlay.removed_services.contains(k))
            .collect();

        if keys.is_empty() {
            debug!(service_name, "[ms-04] No visible service matched removal");
            return Ok(0);
        }

        let removed = keys.len();
        let base = snapshot.produced_at;
        entry.overlay.removed_services.extend(keys);
        entry.overlay.base_produced_at = Some(base);
        self.persist_overlay_logged(&entry.overlay);
        debug!(service_name, removed, "[ms-04] Optimistic service removal applied");
        Ok(removed)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Write the snapshot and drop any persisted overlay in one batch.
    fn persist_snapshot(&self, snapshot: &VehicleSnapshot) -> Result<(), CacheError> {
        let bytes = encode_snapshot(snapshot).map_err(|e| CacheError::Encode(e.to_string()))?;
        self.store.atomic_batch_write(vec![
            BatchOperation::put(self.config.snapshot_key.as_str(), bytes),
            BatchOperation::delete(self.config.overlay_key.as_str()),
        ])?;
        Ok(())
    }

    fn persist_overlay(&self, overlay: &OptimisticOverlay) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(overlay).map_err(|e| CacheError::Encode(e.to_string()))?;
        self.store.put(&self.config.overlay_key, &bytes)?;
        Ok(())
    }

    fn persist_overlay_logged(&self, overlay: &OptimisticOverlay) {
        if let Err(e) = self.persist_overlay(overlay) {
            warn!(error = %e, "[ms-04] Overlay kept in memory only");
        }
    }
}

fn read_snapshot(store: &dyn KeyValueStore, key: &str) -> Option<VehicleSnapshot> {
    match store.get(key) {
        Ok(Some(bytes)) => match decode_snapshot(&bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "[ms-04] Persisted snapshot unreadable, treating as absent");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, "[ms-04] Store unavailable, no cached data");
            None
        }
    }
}

fn read_overlay(store: &dyn KeyValueStore, key: &str) -> OptimisticOverlay {
    match store.get(key) {
        Ok(Some(bytes)) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(error = %e, "[ms-04] Persisted overlay unreadable, discarded");
            OptimisticOverlay::default()
        }),
        Ok(None) => OptimisticOverlay::default(),
        Err(e) => {
            warn!(error = %e, "[ms-04] Overlay unavailable");
            OptimisticOverlay::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_storage::{FileBackedKVStore, InMemoryKVStore, ManualClock};
    use shared_types::{ServiceStatus, ServiceSummary, MINUTE_MS};

    const T0: u64 = 1_700_000_000_000;

    fn civic(mileage: u32, produced_at: Timestamp) -> VehicleSnapshot {
        let mut legacy = ServiceSummary::new(Uuid::nil(), "Wipers", ServiceStatus::Good, "");
        legacy.service_id = None;
        VehicleSnapshot::new(Uuid::from_u128(1), "Civic", mileage, produced_at)
            .with_estimate(mileage + 120)
            .with_services(vec![
                ServiceSummary::new(Uuid::from_u128(7), "Oil Change", ServiceStatus::DueSoon, ""),
                ServiceSummary::new(Uuid::from_u128(8), "Brakes", ServiceStatus::Overdue, ""),
                legacy,
            ])
    }

    fn setup() -> (LocalSnapshotCache, Arc<InMemoryKVStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryKVStore::new());
        let clock = Arc::new(ManualClock::new(T0));
        let cache = LocalSnapshotCache::open(CacheConfig::for_testing(), store.clone(), clock.clone());
        (cache, store, clock)
    }

    #[test]
    fn test_empty_cache() {
        let (cache, _, _) = setup();
        assert_eq!(cache.current(), None);
        assert!(!cache.is_stale());
        assert_eq!(cache.staleness(), None);
        assert_eq!(cache.apply_optimistic_mileage(1), Err(CacheError::NoSnapshot));
        assert_eq!(
            cache.apply_optimistic_service_removal(None, "Oil Change"),
            Err(CacheError::NoSnapshot)
        );
    }

    #[test]
    fn test_staleness_boundary() {
        let (cache, _, clock) = setup();
        cache.replace(civic(50_000, T0));

        assert!(!cache.is_stale_at(T0 + 59 * MINUTE_MS));
        assert!(cache.is_stale_at(T0 + 61 * MINUTE_MS));

        clock.advance(61 * MINUTE_MS);
        assert!(cache.is_stale());
        assert_eq!(cache.staleness(), Some(Duration::from_millis(61 * MINUTE_MS)));
    }

    #[test]
    fn test_optimistic_mileage() {
        let (cache, _, _) = setup();
        cache.replace(civic(50_000, T0));

        let view = cache.apply_optimistic_mileage(50_300).unwrap();

        assert_eq!(view.current_mileage, 50_300);
        assert!(!view.is_estimated);
        assert_eq!(view.services, civic(50_000, T0).services);
        assert_eq!(view.produced_at, T0);
        assert_eq!(cache.current(), Some(view));
    }

    #[test]
    fn test_replace_discards_overlay_even_if_different() {
        let (cache, _, _) = setup();
        cache.replace(civic(50_000, T0));
        cache.apply_optimistic_mileage(50_300).unwrap();
        cache.apply_optimistic_service_removal(Some(Uuid::from_u128(7)), "Oil Change").unwrap();

        let authoritative = civic(50_250, T0 + 1);
        assert_eq!(cache.replace(authoritative.clone()), ReplaceOutcome::Applied);

        assert_eq!(cache.current(), Some(authoritative));
        assert!(!cache.has_overlay());
    }

    #[test]
    fn test_never_regresses() {
        let (cache, _, _) = setup();
        cache.replace(civic(50_000, T0 + 10));

        assert_eq!(cache.replace(civic(49_000, T0)), ReplaceOutcome::Stale);
        assert_eq!(cache.replace(civic(49_000, T0 + 10)), ReplaceOutcome::Stale);
        assert_eq!(cache.current().unwrap().current_mileage, 50_000);
    }

    #[test]
    fn test_service_removal_by_id_then_name() {
        let (cache, _, _) = setup();
        cache.replace(civic(50_000, T0));

        // ID match ignores a stale name
        assert_eq!(
            cache.apply_optimistic_service_removal(Some(Uuid::from_u128(7)), "Renamed").unwrap(),
            1
        );
        // Name match for pre-ID data, even when the tap carries an ID
        assert_eq!(
            cache.apply_optimistic_service_removal(Some(Uuid::from_u128(9)), "Wipers").unwrap(),
            1
        );
        // Already hidden
        assert_eq!(
            cache.apply_optimistic_service_removal(Some(Uuid::from_u128(7)), "Oil Change").unwrap(),
            0
        );

        let names: Vec<_> = cache.current().unwrap().services.into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Brakes".to_string()]);
    }

    #[test]
    fn test_empty_context_clears_when_newer() {
        let (cache, store, _) = setup();
        cache.replace(civic(50_000, T0));

        assert_eq!(cache.apply_context(ApplicationContext::empty(T0)), ReplaceOutcome::Stale);
        assert!(cache.current().is_some());

        assert_eq!(
            cache.apply_context(ApplicationContext::empty(T0 + 1)),
            ReplaceOutcome::Applied
        );
        assert_eq!(cache.current(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_reload_picks_up_other_process_write() {
        let (cache, store, _) = setup();
        cache.replace(civic(50_000, T0));

        let newer = civic(51_000, T0 + 5);
        store
            .put("test.snapshot", &encode_snapshot(&newer).unwrap())
            .unwrap();

        assert_eq!(cache.reload(), Some(ReplaceOutcome::Applied));
        assert_eq!(cache.current(), Some(newer));
    }

    #[test]
    fn test_corrupt_persisted_snapshot_is_absent() {
        let store = Arc::new(InMemoryKVStore::new());
        store.put("test.snapshot", b"garbage").unwrap();
        let cache = LocalSnapshotCache::open(
            CacheConfig::for_testing(),
            store,
            Arc::new(ManualClock::new(T0)),
        );
        assert_eq!(cache.current(), None);
        assert_eq!(cache.reload(), None);
    }

    #[test]
    fn test_storage_failure_degrades_to_memory() {
        let (cache, store, _) = setup();
        store.set_unavailable(true);

        assert_eq!(cache.replace(civic(50_000, T0)), ReplaceOutcome::Applied);
        assert!(cache.apply_optimistic_mileage(50_300).is_ok());
        assert_eq!(cache.current().unwrap().current_mileage, 50_300);
    }

    #[test]
    fn test_snapshot_and_overlay_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.db");
        let clock = Arc::new(ManualClock::new(T0));

        {
            let store = Arc::new(FileBackedKVStore::open(&path).unwrap());
            let cache = LocalSnapshotCache::open(CacheConfig::default(), store, clock.clone());
            cache.replace(civic(50_000, T0));
            cache.apply_optimistic_mileage(50_300).unwrap();
        }

        let store = Arc::new(FileBackedKVStore::open(&path).unwrap());
        let cache = LocalSnapshotCache::open(CacheConfig::default(), store, clock);
        assert_eq!(cache.current().unwrap().current_mileage, 50_300);
        assert!(cache.has_overlay());
        assert_eq!(cache.entry().snapshot.unwrap().current_mileage, 50_000);
    }

    #[test]
    fn test_overlay_from_older_snapshot_discarded_on_open() {
        let (cache, store, clock) = setup();
        cache.replace(civic(50_000, T0));
        cache.apply_optimistic_mileage(50_300).unwrap();
        drop(cache);

        // Another process rewrote the snapshot but left the overlay behind
        store
            .put("test.snapshot", &encode_snapshot(&civic(51_000, T0 + 1)).unwrap())
            .unwrap();

        let cache = LocalSnapshotCache::open(CacheConfig::for_testing(), store.clone(), clock);
        assert_eq!(cache.current().unwrap().current_mileage, 51_000);
        assert!(!cache.has_overlay());
        assert_eq!(store.get("test.overlay").unwrap(), None);
    }
}
