//! # Mutation Intents
//!
//! Mutations a satellite asks the authority to perform. Each intent has a
//! dedup identity so repeated requests collapse to one pending mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::ServiceKey;
use crate::Timestamp;

/// A satellite-originated mutation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationIntent {
    /// New odometer reading entered on a satellite.
    MileageUpdate {
        /// Target vehicle.
        vehicle_id: Uuid,
        /// Reading entered by the user.
        new_mileage: u32,
        /// When the reading was entered.
        issued_at: Timestamp,
    },
    /// A maintenance item was marked done on a satellite.
    ServiceCompletion {
        /// Target vehicle.
        vehicle_id: Uuid,
        /// Stable service ID when the satellite knew it.
        service_id: Option<Uuid>,
        /// Service name, used for matching when no ID is present.
        service_name: String,
        /// Odometer reading at the time of service.
        mileage_at_service: u32,
        /// When the service was performed.
        performed_at: Timestamp,
    },
}

impl MutationIntent {
    /// Identity used to collapse repeated intents.
    ///
    /// Mileage updates collapse per vehicle (latest wins); completions collapse
    /// per service ID, falling back to vehicle + service name.
    pub fn dedup_key(&self) -> DedupKey {
        match self {
            MutationIntent::MileageUpdate { vehicle_id, .. } => DedupKey::Mileage(*vehicle_id),
            MutationIntent::ServiceCompletion {
                vehicle_id,
                service_id,
                service_name,
                ..
            } => DedupKey::Service(match service_id {
                Some(id) => ServiceKey::Id(*id),
                None => ServiceKey::Composite {
                    vehicle_id: *vehicle_id,
                    name: service_name.clone(),
                },
            }),
        }
    }

    /// Vehicle the intent targets.
    pub fn vehicle_id(&self) -> Uuid {
        match self {
            MutationIntent::MileageUpdate { vehicle_id, .. }
            | MutationIntent::ServiceCompletion { vehicle_id, .. } => *vehicle_id,
        }
    }

    /// Routing key carried on the wire.
    pub fn message_key(&self) -> MessageKey {
        match self {
            MutationIntent::MileageUpdate { .. } => MessageKey::MileageUpdate,
            MutationIntent::ServiceCompletion { .. } => MessageKey::MarkServiceDone,
        }
    }

    /// Whether a newer intent with the same identity replaces this one.
    pub fn latest_wins(&self) -> bool {
        matches!(self, MutationIntent::MileageUpdate { .. })
    }
}

/// Dedup identity of a `MutationIntent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DedupKey {
    /// One pending mileage update per vehicle.
    Mileage(Uuid),
    /// One pending completion per service.
    Service(ServiceKey),
}

/// Routing key of a mutation message, dispatched on by the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    /// `mileageUpdate`
    MileageUpdate,
    /// `markServiceDone`
    MarkServiceDone,
}

impl MessageKey {
    /// Wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::MileageUpdate => "mileageUpdate",
            MessageKey::MarkServiceDone => "markServiceDone",
        }
    }
}

impl std::fmt::Display for MessageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
