//! # Repeated Completions
//!
//! The same maintenance item marked done twice before the authority
//! confirms either tap must reach the canonical data once.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{World, OIL_CHANGE, VEHICLE};
    use ms_02_action_ledger::EnqueueOutcome;
    use ms_03_transport_channel::SendOutcome;
    use ms_04_snapshot_cache::ReplaceOutcome;
    use ms_05_sync_coordinator::Delivery;
    use shared_types::MINUTE_MS;

    #[tokio::test]
    async fn test_two_widgets_complete_same_service() {
        let world = World::new(50_000, false);
        let authority = world.authority();
        authority.service.publish_snapshot().await.unwrap();

        // Two display surfaces, each its own short-lived process
        let first = world.widget();
        let second = world.widget();
        assert!(first.service.cache().current().is_some());
        assert!(second.service.cache().current().is_some());

        let receipt = first
            .service
            .mark_service_done(Some(OIL_CHANGE), "Oil Change")
            .unwrap();
        assert!(matches!(
            receipt.delivery,
            Delivery::Ledger(EnqueueOutcome::Added { .. })
        ));
        let shown = first.service.cache().current().unwrap();
        assert!(shown.services.iter().all(|s| s.service_id != Some(OIL_CHANGE)));

        let receipt = second
            .service
            .mark_service_done(Some(OIL_CHANGE), "Oil Change")
            .unwrap();
        assert!(matches!(
            receipt.delivery,
            Delivery::Ledger(EnqueueOutcome::Duplicate { .. })
        ));
        assert_eq!(world.handheld_ledger().pending_count(), 1);

        // Handheld app comes to the foreground
        world.clock.advance(10 * MINUTE_MS);
        let report = authority.service.drain_deferred_actions();
        assert_eq!(report.applied, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(world.canonical.applied_count(), 1);
        assert_eq!(world.handheld_ledger().pending_count(), 0);

        let canonical = world.canonical.vehicle(VEHICLE).unwrap();
        assert_eq!(canonical.services.len(), 1);

        // The next timeline refresh picks up the confirmed state
        authority.service.publish_snapshot().await.unwrap();
        assert_eq!(second.service.cache().reload(), Some(ReplaceOutcome::Applied));
        let entry = second.service.cache().entry();
        assert!(entry.overlay.is_empty());
        assert_eq!(entry.snapshot.unwrap().services.len(), 1);
    }

    #[tokio::test]
    async fn test_wearable_double_tap_sends_once() {
        let world = World::new(50_000, true);
        let mut authority = world.authority();
        let mut wearable = world.wearable();
        authority.service.publish_snapshot().await.unwrap();
        wearable.pump();

        world.wearable_link.set_reachable(false);
        wearable.pump();
        authority.pump().await;

        let first = wearable
            .service
            .mark_service_done(Some(OIL_CHANGE), "Oil Change")
            .unwrap();
        assert_eq!(first.settle().await, Some(SendOutcome::Queued));

        let second = wearable
            .service
            .mark_service_done(Some(OIL_CHANGE), "Oil Change")
            .unwrap();
        assert_eq!(second.settle().await, Some(SendOutcome::Deduplicated));
        assert_eq!(world.wearable_link.durable_backlog(), 1);

        world.wearable_link.set_reachable(true);
        authority.pump().await;

        assert_eq!(world.authority_link.inbox().len(), 1);
        assert_eq!(world.canonical.applied_count(), 1);

        // Confirmation clears the tracked intent: a later tap is sent again
        wearable.pump();
        assert_eq!(wearable.service.channel().in_flight_count(), 0);
    }
}
