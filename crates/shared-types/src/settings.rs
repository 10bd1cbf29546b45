//! # Shared Settings
//!
//! Small settings block the authority writes into the shared durable region.
//! Satellites and display surfaces only read it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::DistanceUnit;

/// Settings visible to every process on the device.
///
/// Every field has a default so blocks written by older builds still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SharedSettings {
    /// Preferred distance unit for display.
    pub distance_unit: DistanceUnit,
    /// Vehicle pinned for glanceable surfaces; `None` means "first vehicle".
    pub default_vehicle_id: Option<Uuid>,
}
