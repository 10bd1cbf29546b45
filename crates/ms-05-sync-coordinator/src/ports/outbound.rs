//! # Outbound Ports
//!
//! The authority's persistence engine. Its query and aggregation logic (due
//! dates, urgency, cost totals) stays behind this trait; the sync layer only
//! applies mutations and asks for snapshots.

use parking_lot::RwLock;
use shared_types::{MutationIntent, SharedSettings, VehicleSnapshot};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::domain::ApplyError;

/// Canonical store - outbound port (authority only).
pub trait CanonicalStore: Send + Sync {
    /// Apply a satellite-originated mutation.
    fn apply(&self, intent: &MutationIntent) -> Result<(), ApplyError>;

    /// Build the snapshot for the pinned default vehicle, or the store's
    /// first vehicle when none is pinned. `None` when there are no vehicles.
    fn snapshot(&self, settings: &SharedSettings) -> Option<VehicleSnapshot>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock canonical store for testing.
///
/// Mileage updates overwrite the odometer and clear the estimate; service
/// completions remove the service. Vehicles can be made to fail.
#[derive(Default)]
pub struct MockCanonicalStore {
    vehicles: RwLock<BTreeMap<Uuid, VehicleSnapshot>>,
    failing: RwLock<HashSet<Uuid>>,
    applied: AtomicU64,
}

impl MockCanonicalStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a vehicle.
    pub fn insert(&self, snapshot: VehicleSnapshot) {
        self.vehicles.write().insert(snapshot.vehicle_id, snapshot);
    }

    /// Make mutations for `vehicle_id` fail (or succeed again).
    pub fn set_failing(&self, vehicle_id: Uuid, failing: bool) {
        let mut set = self.failing.write();
        if failing {
            set.insert(vehicle_id);
        } else {
            set.remove(&vehicle_id);
        }
    }

    /// Canonical state of one vehicle.
    pub fn vehicle(&self, vehicle_id: Uuid) -> Option<VehicleSnapshot> {
        self.vehicles.read().get(&vehicle_id).cloned()
    }

    /// Mutations applied so far.
    pub fn applied_count(&self) -> u64 {
        self.applied.load(Ordering::SeqCst)
    }
}

impl CanonicalStore for MockCanonicalStore {
    fn apply(&self, intent: &MutationIntent) -> Result<(), ApplyError> {
        let vehicle_id = intent.vehicle_id();
        if self.failing.read().contains(&vehicle_id) {
            return Err(ApplyError::Unavailable("Mock failure".to_string()));
        }

        let mut vehicles = self.vehicles.write();
        let vehicle = vehicles
            .get_mut(&vehicle_id)
            .ok_or(ApplyError::UnknownVehicle(vehicle_id))?;

        match intent {
            MutationIntent::MileageUpdate { new_mileage, .. } => {
                vehicle.current_mileage = *new_mileage;
                vehicle.estimated_mileage = None;
                vehicle.is_estimated = false;
            }
            MutationIntent::ServiceCompletion {
                service_id,
                service_name,
                ..
            } => {
                vehicle
                    .services
                    .retain(|s| !s.matches(*service_id, service_name));
            }
        }
        self.applied.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn snapshot(&self, settings: &SharedSettings) -> Option<VehicleSnapshot> {
        let vehicles = self.vehicles.read();
        let mut snapshot = settings
            .default_vehicle_id
            .and_then(|id| vehicles.get(&id))
            .or_else(|| vehicles.values().next())
            .cloned()?;
        snapshot.distance_unit = settings.distance_unit;
        Some(snapshot)
    }
}
