//! # Offline Mutation and Reconnect
//!
//! The wearable edits while the handheld is out of range; the edit shows up
//! immediately, is delivered once the link returns, and the authority's
//! follow-up snapshot replaces the local guess.

#[cfg(test)]
mod tests {
    use crate::integration::harness::{World, T0, VEHICLE};
    use ms_03_transport_channel::config::DEFAULT_FALLBACK_STATUS;
    use ms_03_transport_channel::SendOutcome;
    use shared_bus::SyncEvent;
    use shared_types::MINUTE_MS;

    #[tokio::test]
    async fn test_unreachable_edit_delivered_after_reconnect() {
        let world = World::new(50_000, true);
        let mut authority = world.authority();
        let mut wearable = world.wearable();

        // Initial sync while paired
        authority.service.publish_snapshot().await.unwrap();
        assert_eq!(wearable.pump(), 1);
        assert_eq!(wearable.service.cache().last_synced_at(), Some(T0));

        // Walk out of range
        world.wearable_link.set_reachable(false);
        wearable.pump();
        authority.pump().await;
        assert!(!wearable.service.sync_status().is_peer_reachable);

        world.clock.advance(5 * MINUTE_MS);
        let receipt = wearable.service.update_mileage(50_300).unwrap();
        assert_eq!(receipt.settle().await, Some(SendOutcome::Queued));

        // The UI already shows the new reading
        let shown = wearable.service.cache().current().unwrap();
        assert_eq!(shown.current_mileage, 50_300);
        assert!(!shown.is_estimated);
        assert_eq!(shown.services.len(), 2);
        let status = wearable.service.sync_status();
        assert_eq!(status.status_message.as_deref(), Some(DEFAULT_FALLBACK_STATUS));
        assert!(world.authority_link.inbox().is_empty());
        assert_eq!(world.wearable_link.durable_backlog(), 1);

        // Back in range: the durable queue flushes to the authority
        world.clock.advance(MINUTE_MS);
        world.wearable_link.set_reachable(true);
        authority.pump().await;

        let canonical = world.canonical.vehicle(VEHICLE).unwrap();
        assert_eq!(canonical.current_mileage, 50_300);
        assert_eq!(world.canonical.applied_count(), 1);

        // The authority's push lands on the wearable
        wearable.pump();
        let entry = wearable.service.cache().entry();
        assert!(entry.overlay.is_empty());
        let snapshot = entry.snapshot.unwrap();
        assert!(snapshot.produced_at > T0);
        assert_eq!(snapshot.current_mileage, 50_300);

        let status = wearable.service.sync_status();
        assert!(status.is_peer_reachable);
        assert!(status.status_message.is_none());
        assert!(!status.is_stale);
    }

    #[tokio::test]
    async fn test_refused_live_message_is_retried_on_resume() {
        let world = World::new(50_000, true);
        let mut authority = world.authority();
        let mut wearable = world.wearable();
        authority.service.publish_snapshot().await.unwrap();
        wearable.pump();

        world.canonical.set_failing(VEHICLE, true);
        let receipt = wearable.service.update_mileage(51_000).unwrap();
        assert_eq!(receipt.settle().await, Some(SendOutcome::Delivered));
        authority.pump().await;

        // Parked on the handheld, nothing published
        assert_eq!(world.canonical.applied_count(), 0);
        assert_eq!(world.handheld_ledger().pending_count(), 1);
        assert_eq!(wearable.pump(), 0);
        assert!(wearable.service.cache().has_overlay());

        world.canonical.set_failing(VEHICLE, false);
        world.clock.advance(MINUTE_MS);
        authority
            .service
            .handle_event(&SyncEvent::AuthorityResumed)
            .await;

        assert_eq!(world.canonical.applied_count(), 1);
        assert_eq!(world.handheld_ledger().pending_count(), 0);
        wearable.pump();
        assert!(!wearable.service.cache().has_overlay());
        assert_eq!(wearable.service.cache().current().unwrap().current_mileage, 51_000);
    }
}
