//! # Cache Entities

use serde::{Deserialize, Serialize};
use shared_types::{ServiceKey, Timestamp, VehicleSnapshot};
use std::collections::BTreeSet;

/// Locally applied, unconfirmed edits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimisticOverlay {
    /// Mileage entered on this satellite.
    #[serde(default)]
    pub mileage: Option<u32>,
    /// Services marked done on this satellite.
    #[serde(default)]
    pub removed_services: BTreeSet<ServiceKey>,
    /// `produced_at` of the snapshot these edits were made on top of.
    #[serde(default)]
    pub base_produced_at: Option<Timestamp>,
}

impl OptimisticOverlay {
    /// Whether the overlay changes nothing.
    pub fn is_empty(&self) -> bool {
        self.mileage.is_none() && self.removed_services.is_empty()
    }

    /// Whether these edits were made on top of `snapshot`. An overlay found
    /// next to any other snapshot has already been superseded.
    pub fn is_based_on(&self, snapshot: &VehicleSnapshot) -> bool {
        self.base_produced_at == Some(snapshot.produced_at)
    }

    /// `snapshot` as the UI should see it.
    pub fn apply(&self, snapshot: &VehicleSnapshot) -> VehicleSnapshot {
        let mut view = snapshot.clone();
        if let Some(mileage) = self.mileage {
            view.current_mileage = mileage;
            view.is_estimated = false;
        }
        if !self.removed_services.is_empty() {
            let vehicle_id = snapshot.vehicle_id;
            view.services
                .retain(|s| !self.removed_services.contains(&s.key(vehicle_id)));
        }
        view
    }
}

/// Last authoritative snapshot plus the optimistic overlay on top of it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheEntry {
    /// Last authoritative snapshot, if any.
    pub snapshot: Option<VehicleSnapshot>,
    /// Unconfirmed local edits.
    pub overlay: OptimisticOverlay,
}

impl CacheEntry {
    /// The overlaid view.
    pub fn view(&self) -> Option<VehicleSnapshot> {
        self.snapshot.as_ref().map(|s| self.overlay.apply(s))
    }
}

/// Result of an authoritative merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The cache now reflects the new state; any overlay was discarded.
    Applied,
    /// Not newer than what is cached; ignored.
    Stale,
}
