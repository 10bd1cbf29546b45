//! # Durability and Freshness
//!
//! Ledger expiry across process restarts on a real file store, staleness as
//! the UI sees it, old payloads in the shared region, and the rule that the
//! authority's snapshot always replaces local guesses.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::integration::harness::{civic, World, T0, VEHICLE};
    use ms_02_action_ledger::{DeferredActionLedger, EnqueueOutcome, LedgerConfig};
    use ms_03_transport_channel::SendOutcome;
    use ms_04_snapshot_cache::ReplaceOutcome;
    use ms_05_sync_coordinator::Delivery;
    use shared_storage::keys::SNAPSHOT_KEY;
    use shared_storage::{FileBackedKVStore, KeyValueStore, ManualClock};
    use shared_types::{DistanceUnit, MutationIntent, DAY_MS, MINUTE_MS};

    fn open_ledger(path: &std::path::Path, clock: Arc<ManualClock>) -> DeferredActionLedger {
        let store = Arc::new(FileBackedKVStore::open(path).unwrap());
        DeferredActionLedger::new(LedgerConfig::default(), store, clock)
    }

    #[test]
    fn test_expired_handoff_pruned_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.bin");
        let clock = Arc::new(ManualClock::new(T0));

        // Widget process, day 0 and day 3
        {
            let ledger = open_ledger(&path, clock.clone());
            assert!(ledger
                .enqueue(MutationIntent::MileageUpdate {
                    vehicle_id: VEHICLE,
                    new_mileage: 50_100,
                    issued_at: T0,
                })
                .was_added());
            clock.advance(3 * DAY_MS);
            assert!(ledger
                .enqueue(MutationIntent::ServiceCompletion {
                    vehicle_id: VEHICLE,
                    service_id: None,
                    service_name: "Oil Change".into(),
                    mileage_at_service: 50_100,
                    performed_at: T0 + 3 * DAY_MS,
                })
                .was_added());
        }

        // Authority process, just over a week after the first tap
        clock.set(T0 + 7 * DAY_MS + 1);
        let ledger = open_ledger(&path, clock.clone());
        let first = ledger.drain_all();
        assert_eq!(first.len(), 1);
        assert!(matches!(first[0].intent, MutationIntent::ServiceCompletion { .. }));
        assert_eq!(ledger.metrics().pruned_count(), 1);
        assert_eq!(ledger.drain_all(), first);

        // The pruned document was written back
        let another_process = open_ledger(&path, clock);
        assert_eq!(another_process.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_staleness_reported_to_the_ui() {
        let world = World::new(50_000, true);
        let authority = world.authority();
        let mut wearable = world.wearable();
        authority.service.publish_snapshot().await.unwrap();
        wearable.pump();

        world.clock.advance(59 * MINUTE_MS);
        let status = wearable.service.sync_status();
        assert_eq!(status.last_synced_at, Some(T0));
        assert!(!status.is_stale);

        world.clock.set(T0 + 61 * MINUTE_MS);
        assert!(wearable.service.sync_status().is_stale);

        // Only an authoritative snapshot refreshes it; local edits do not
        wearable.service.update_mileage(50_050).unwrap();
        assert!(wearable.service.sync_status().is_stale);
    }

    #[test]
    fn test_authority_snapshot_replaces_optimistic_mileage() {
        // No async runtime here: the mutation takes the durable path
        let world = World::new(50_000, false);
        let wearable = world.wearable();
        let cache = wearable.service.cache();
        assert_eq!(
            cache.replace(civic(50_000, T0).with_estimate(50_120)),
            ReplaceOutcome::Applied
        );

        let receipt = wearable.service.update_mileage(50_300).unwrap();
        assert!(matches!(receipt.delivery, Delivery::Durable(SendOutcome::Queued)));

        let shown = cache.current().unwrap();
        assert_eq!(shown.current_mileage, 50_300);
        assert!(!shown.is_estimated);
        assert_eq!(shown.services, civic(0, 0).services);

        // Authority disagrees with the guess and still wins
        assert_eq!(cache.replace(civic(50_250, T0 + 1)), ReplaceOutcome::Applied);
        let shown = cache.current().unwrap();
        assert_eq!(shown.current_mileage, 50_250);
        assert!(!cache.has_overlay());

        // An older snapshot arriving late never regresses the cache
        assert_eq!(cache.replace(civic(49_000, T0)), ReplaceOutcome::Stale);
        assert_eq!(cache.current().unwrap().current_mileage, 50_250);
    }

    #[tokio::test]
    async fn test_widget_guess_gone_after_authority_publishes() {
        let world = World::new(50_000, false);
        let authority = world.authority();
        authority.service.publish_snapshot().await.unwrap();

        {
            let widget = world.widget();
            widget.service.update_mileage(50_300).unwrap();
            assert_eq!(widget.service.cache().current().unwrap().current_mileage, 50_300);
        }

        world.clock.advance(MINUTE_MS);
        assert_eq!(authority.service.drain_deferred_actions().applied, 1);
        // The owner corrects the reading on the handheld itself
        world.canonical.insert(civic(51_000, 0));
        let published = authority.service.publish_snapshot().await.unwrap().unwrap();

        let widget = world.widget();
        widget.service.start();
        let shown = widget.service.cache().current().unwrap();
        assert_eq!(shown.current_mileage, 51_000);
        assert_eq!(shown.produced_at, published.produced_at);
        assert!(!widget.service.cache().has_overlay());
    }

    #[tokio::test]
    async fn test_legacy_snapshot_in_shared_region() {
        let world = World::new(50_000, false);
        let legacy = format!(
            r#"{{
                "vehicleID": "{VEHICLE}",
                "displayName": "Civic",
                "currentMileage": 50000,
                "producedAt": {T0},
                "services": [
                    {{"name": "Oil Change", "status": "overdue", "dueDescription": "Overdue by 300 mi"}}
                ]
            }}"#
        );
        world
            .handheld_store
            .put(SNAPSHOT_KEY, legacy.as_bytes())
            .unwrap();

        let widget = world.widget();
        let shown = widget.service.cache().current().unwrap();
        assert_eq!(shown.distance_unit, DistanceUnit::Miles);
        assert_eq!(shown.services[0].service_id, None);

        // No service ID on this build: the name identifies the service
        let receipt = widget.service.mark_service_done(None, "Oil Change").unwrap();
        assert!(matches!(
            receipt.delivery,
            Delivery::Ledger(EnqueueOutcome::Added { .. })
        ));
        assert!(widget.service.cache().current().unwrap().services.is_empty());

        let report = world.authority().service.drain_deferred_actions();
        assert_eq!(report.applied, 1);
        let canonical = world.canonical.vehicle(VEHICLE).unwrap();
        assert!(canonical.services.iter().all(|s| s.name != "Oil Change"));
    }
}
