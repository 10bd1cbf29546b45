//! # Wire Structs
//!
//! Serde mirror of the JSON layout. Everything introduced after schema
//! version 1 is `#[serde(default)]`, and enum-like fields are carried as
//! strings so values from a newer authority degrade instead of failing.

use serde::{Deserialize, Serialize};
use shared_types::{DistanceUnit, ServiceStatus, ServiceSummary, Timestamp, VehicleSnapshot};
use tracing::debug;
use uuid::Uuid;

use super::errors::DecodeError;
use super::SCHEMA_VERSION;

fn legacy_version() -> u16 {
    1
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireSnapshot {
    #[serde(default = "legacy_version")]
    pub schema_version: u16,
    #[serde(rename = "vehicleID")]
    pub vehicle_id: Uuid,
    pub display_name: String,
    pub current_mileage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_mileage: Option<u32>,
    #[serde(default)]
    pub is_estimated: bool,
    #[serde(default)]
    pub services: Vec<WireService>,
    pub produced_at: Timestamp,
    #[serde(default)]
    pub distance_unit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireService {
    #[serde(rename = "serviceID", default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub due_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_mileage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireContext {
    #[serde(default = "legacy_version")]
    pub schema_version: u16,
    pub pushed_at: Timestamp,
    #[serde(default)]
    pub snapshot: Option<WireSnapshot>,
}

/// Keyed mutation message; `type` is the routing key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum WireMessage {
    #[serde(rename = "mileageUpdate", rename_all = "camelCase")]
    MileageUpdate {
        #[serde(rename = "vehicleID")]
        vehicle_id: Uuid,
        new_mileage: u32,
        timestamp: Timestamp,
    },
    #[serde(rename = "markServiceDone", rename_all = "camelCase")]
    MarkServiceDone {
        #[serde(rename = "vehicleID")]
        vehicle_id: Uuid,
        #[serde(rename = "serviceID", default, skip_serializing_if = "Option::is_none")]
        service_id: Option<Uuid>,
        service_name: String,
        mileage_at_service: u32,
        performed_date: Timestamp,
    },
}

// =============================================================================
// Enum string mapping
// =============================================================================

fn unit_to_wire(unit: DistanceUnit) -> &'static str {
    match unit {
        DistanceUnit::Miles => "miles",
        DistanceUnit::Kilometers => "kilometers",
    }
}

fn unit_from_wire(raw: Option<&str>) -> DistanceUnit {
    match raw {
        None => DistanceUnit::default(),
        Some("miles") => DistanceUnit::Miles,
        Some("kilometers") => DistanceUnit::Kilometers,
        Some(other) => {
            debug!(unit = other, "[ms-01] Unknown distance unit, using default");
            DistanceUnit::default()
        }
    }
}

fn status_to_wire(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Overdue => "overdue",
        ServiceStatus::DueSoon => "dueSoon",
        ServiceStatus::Good => "good",
        ServiceStatus::Neutral => "neutral",
    }
}

fn status_from_wire(raw: Option<&str>) -> ServiceStatus {
    match raw {
        Some("overdue") => ServiceStatus::Overdue,
        Some("dueSoon") => ServiceStatus::DueSoon,
        Some("good") => ServiceStatus::Good,
        Some("neutral") | None => ServiceStatus::Neutral,
        Some(other) => {
            debug!(status = other, "[ms-01] Unknown service status, using neutral");
            ServiceStatus::Neutral
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&VehicleSnapshot> for WireSnapshot {
    fn from(s: &VehicleSnapshot) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            vehicle_id: s.vehicle_id,
            display_name: s.display_name.clone(),
            current_mileage: s.current_mileage,
            estimated_mileage: s.estimated_mileage,
            is_estimated: s.is_estimated,
            services: s.services.iter().map(WireService::from).collect(),
            produced_at: s.produced_at,
            distance_unit: Some(unit_to_wire(s.distance_unit).to_string()),
        }
    }
}

impl From<&ServiceSummary> for WireService {
    fn from(s: &ServiceSummary) -> Self {
        Self {
            service_id: s.service_id,
            name: s.name.clone(),
            status: Some(status_to_wire(s.status).to_string()),
            due_description: s.due_description.clone(),
            due_mileage: s.due_mileage,
            days_remaining: s.days_remaining,
        }
    }
}

impl TryFrom<WireSnapshot> for VehicleSnapshot {
    type Error = DecodeError;

    fn try_from(w: WireSnapshot) -> Result<Self, Self::Error> {
        if w.display_name.trim().is_empty() {
            return Err(DecodeError::InvalidValue("displayName is empty".into()));
        }
        if w.schema_version > SCHEMA_VERSION {
            debug!(
                version = w.schema_version,
                "[ms-01] Snapshot from newer schema, ignoring unknown fields"
            );
        }

        let services = w
            .services
            .into_iter()
            .map(ServiceSummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(VehicleSnapshot {
            vehicle_id: w.vehicle_id,
            display_name: w.display_name,
            current_mileage: w.current_mileage,
            estimated_mileage: w.estimated_mileage,
            // A flag without a value cannot be displayed.
            is_estimated: w.is_estimated && w.estimated_mileage.is_some(),
            services,
            produced_at: w.produced_at,
            distance_unit: unit_from_wire(w.distance_unit.as_deref()),
        })
    }
}

impl TryFrom<WireService> for ServiceSummary {
    type Error = DecodeError;

    fn try_from(w: WireService) -> Result<Self, Self::Error> {
        if w.name.trim().is_empty() {
            return Err(DecodeError::InvalidValue("service name is empty".into()));
        }
        Ok(ServiceSummary {
            service_id: w.service_id,
            name: w.name,
            status: status_from_wire(w.status.as_deref()),
            due_description: w.due_description,
            due_mileage: w.due_mileage,
            days_remaining: w.days_remaining,
        })
    }
}
