//! # Codec
//!
//! Pure encode/decode functions. No I/O, no shared state.

use shared_types::{MutationIntent, VehicleSnapshot};
use tracing::warn;

use crate::domain::wire::{WireContext, WireMessage, WireSnapshot};
use crate::domain::{ApplicationContext, DecodeError, EncodeError, SCHEMA_VERSION};

/// Encode a snapshot for storage or transmission.
pub fn encode_snapshot(snapshot: &VehicleSnapshot) -> Result<Vec<u8>, EncodeError> {
    Ok(serde_json::to_vec(&WireSnapshot::from(snapshot))?)
}

/// Decode a snapshot.
///
/// Payloads written by older schema versions decode with defaults for the
/// fields they lack. Structurally invalid payloads fail.
pub fn decode_snapshot(bytes: &[u8]) -> Result<VehicleSnapshot, DecodeError> {
    let wire: WireSnapshot = serde_json::from_slice(bytes).map_err(|e| {
        let err = DecodeError::from(e);
        warn!(error = %err, "[ms-01] Snapshot payload rejected");
        err
    })?;
    VehicleSnapshot::try_from(wire)
}

/// Encode an application context push.
pub fn encode_context(context: &ApplicationContext) -> Result<Vec<u8>, EncodeError> {
    let wire = WireContext {
        schema_version: SCHEMA_VERSION,
        pushed_at: context.pushed_at,
        snapshot: context.snapshot.as_ref().map(WireSnapshot::from),
    };
    Ok(serde_json::to_vec(&wire)?)
}

/// Decode an application context push. `snapshot: null` means "no vehicle".
pub fn decode_context(bytes: &[u8]) -> Result<ApplicationContext, DecodeError> {
    let wire: WireContext = serde_json::from_slice(bytes)?;
    let snapshot = wire.snapshot.map(VehicleSnapshot::try_from).transpose()?;
    Ok(ApplicationContext {
        snapshot,
        pushed_at: wire.pushed_at,
    })
}

/// Encode a mutation as a keyed message.
pub fn encode_intent(intent: &MutationIntent) -> Result<Vec<u8>, EncodeError> {
    let wire = match intent.clone() {
        MutationIntent::MileageUpdate {
            vehicle_id,
            new_mileage,
            issued_at,
        } => WireMessage::MileageUpdate {
            vehicle_id,
            new_mileage,
            timestamp: issued_at,
        },
        MutationIntent::ServiceCompletion {
            vehicle_id,
            service_id,
            service_name,
            mileage_at_service,
            performed_at,
        } => WireMessage::MarkServiceDone {
            vehicle_id,
            service_id,
            service_name,
            mileage_at_service,
            performed_date: performed_at,
        },
    };
    Ok(serde_json::to_vec(&wire)?)
}

/// Decode a keyed mutation message. Unknown keys fail with `InvalidValue`.
pub fn decode_intent(bytes: &[u8]) -> Result<MutationIntent, DecodeError> {
    let wire: WireMessage = serde_json::from_slice(bytes)?;
    Ok(match wire {
        WireMessage::MileageUpdate {
            vehicle_id,
            new_mileage,
            timestamp,
        } => MutationIntent::MileageUpdate {
            vehicle_id,
            new_mileage,
            issued_at: timestamp,
        },
        WireMessage::MarkServiceDone {
            vehicle_id,
            service_id,
            service_name,
            mileage_at_service,
            performed_date,
        } => {
            if service_id.is_none() && service_name.trim().is_empty() {
                return Err(DecodeError::InvalidValue(
                    "markServiceDone needs serviceID or serviceName".into(),
                ));
            }
            MutationIntent::ServiceCompletion {
                vehicle_id,
                service_id,
                service_name,
                mileage_at_service,
                performed_at: performed_date,
            }
        }
    })
}
