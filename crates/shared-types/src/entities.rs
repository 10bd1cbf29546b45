//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Vehicle**: `VehicleSnapshot`, `DistanceUnit`
//! - **Service**: `ServiceSummary`, `ServiceStatus`, `ServiceKey`

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Timestamp;

// =============================================================================
// CLUSTER A: VEHICLE
// =============================================================================

/// Distance unit the snapshot's odometer values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DistanceUnit {
    /// Statute miles. Payloads produced before the unit existed are miles.
    #[default]
    Miles,
    /// Kilometers.
    Kilometers,
}

impl DistanceUnit {
    /// Short label for display surfaces.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
        }
    }
}

/// Immutable, timestamped copy of one vehicle's state and its services.
///
/// `produced_at` strictly increases with each push from the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    /// Vehicle identity.
    pub vehicle_id: Uuid,
    /// Display name ("2019 Civic"). Never blank; blank names do not decode.
    pub display_name: String,
    /// Last odometer reading recorded on the authority.
    pub current_mileage: u32,
    /// Mileage projected from driving habits, if the authority estimated one.
    pub estimated_mileage: Option<u32>,
    /// True when the UI should present `estimated_mileage` instead of `current_mileage`.
    /// Meaningless without an estimate; the codec clears it in that case.
    pub is_estimated: bool,
    /// Services in display order.
    pub services: Vec<ServiceSummary>,
    /// When the authority built this snapshot.
    pub produced_at: Timestamp,
    /// Unit of every odometer value in the snapshot.
    pub distance_unit: DistanceUnit,
}

impl VehicleSnapshot {
    /// Create a snapshot with no services and no estimate.
    pub fn new(
        vehicle_id: Uuid,
        display_name: impl Into<String>,
        current_mileage: u32,
        produced_at: Timestamp,
    ) -> Self {
        Self {
            vehicle_id,
            display_name: display_name.into(),
            current_mileage,
            estimated_mileage: None,
            is_estimated: false,
            services: Vec::new(),
            produced_at,
            distance_unit: DistanceUnit::default(),
        }
    }

    /// Builder-style service list.
    pub fn with_services(mut self, services: Vec<ServiceSummary>) -> Self {
        self.services = services;
        self
    }

    /// Builder-style estimate.
    pub fn with_estimate(mut self, estimated_mileage: u32) -> Self {
        self.estimated_mileage = Some(estimated_mileage);
        self.is_estimated = true;
        self
    }

    /// Mileage the UI should display.
    pub fn display_mileage(&self) -> u32 {
        match (self.is_estimated, self.estimated_mileage) {
            (true, Some(estimate)) => estimate,
            _ => self.current_mileage,
        }
    }

    /// Identity of a service within this snapshot.
    pub fn key_of(&self, service: &ServiceSummary) -> ServiceKey {
        service.key(self.vehicle_id)
    }

    /// Find a service by identity.
    pub fn service(&self, key: &ServiceKey) -> Option<&ServiceSummary> {
        self.services.iter().find(|s| &self.key_of(s) == key)
    }

    /// Services that are overdue or due soon, most urgent first.
    pub fn attention_needed(&self) -> Vec<&ServiceSummary> {
        let mut urgent: Vec<_> = self
            .services
            .iter()
            .filter(|s| matches!(s.status, ServiceStatus::Overdue | ServiceStatus::DueSoon))
            .collect();
        urgent.sort_by_key(|s| s.status.urgency_rank());
        urgent
    }
}

// =============================================================================
// CLUSTER B: SERVICE
// =============================================================================

/// Urgency bucket computed by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceStatus {
    /// Past due by date or mileage.
    Overdue,
    /// Inside the reminder window.
    DueSoon,
    /// Not due yet.
    Good,
    /// No schedule information.
    Neutral,
}

impl ServiceStatus {
    /// Lower is more urgent.
    pub fn urgency_rank(&self) -> u8 {
        match self {
            ServiceStatus::Overdue => 0,
            ServiceStatus::DueSoon => 1,
            ServiceStatus::Good => 2,
            ServiceStatus::Neutral => 3,
        }
    }
}

/// One maintenance item as shown on a satellite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSummary {
    /// Stable service identity, absent in data produced before IDs existed.
    pub service_id: Option<Uuid>,
    /// Service name ("Oil Change"). Never blank; blank names do not decode.
    pub name: String,
    /// Urgency bucket.
    pub status: ServiceStatus,
    /// Human due description ("Due in 450 mi").
    pub due_description: String,
    /// Odometer reading at which the service falls due.
    pub due_mileage: Option<u32>,
    /// Days until due; negative when overdue.
    pub days_remaining: Option<i32>,
}

impl ServiceSummary {
    /// Create a summary with a stable identity.
    pub fn new(
        service_id: Uuid,
        name: impl Into<String>,
        status: ServiceStatus,
        due_description: impl Into<String>,
    ) -> Self {
        Self {
            service_id: Some(service_id),
            name: name.into(),
            status,
            due_description: due_description.into(),
            due_mileage: None,
            days_remaining: None,
        }
    }

    /// Identity of this service when owned by `vehicle_id`.
    ///
    /// Prefers the stable ID; falls back to vehicle + name for pre-ID data.
    pub fn key(&self, vehicle_id: Uuid) -> ServiceKey {
        match self.service_id {
            Some(id) => ServiceKey::Id(id),
            None => ServiceKey::Composite {
                vehicle_id,
                name: self.name.clone(),
            },
        }
    }

    /// Whether this service is the one a completion intent refers to.
    ///
    /// IDs are compared when both sides have one; otherwise the name is.
    pub fn matches(&self, service_id: Option<Uuid>, service_name: &str) -> bool {
        match (service_id, self.service_id) {
            (Some(wanted), Some(own)) => wanted == own,
            _ => self.name == service_name,
        }
    }
}

/// Stable identity of a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKey {
    /// Stable service ID.
    Id(Uuid),
    /// Fallback for data produced before service IDs existed.
    Composite {
        /// Owning vehicle.
        vehicle_id: Uuid,
        /// Service name.
        name: String,
    },
}
