//! # Application Context
//!
//! The authority → satellite push. Always a full replacement, never a delta.

use shared_types::{Timestamp, VehicleSnapshot};

/// Full-replacement state push from the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationContext {
    /// Current snapshot, or `None` when the authority has no vehicle.
    pub snapshot: Option<VehicleSnapshot>,
    /// When the authority pushed this context.
    pub pushed_at: Timestamp,
}

impl ApplicationContext {
    /// Context carrying a snapshot.
    pub fn with_snapshot(snapshot: VehicleSnapshot, pushed_at: Timestamp) -> Self {
        Self {
            snapshot: Some(snapshot),
            pushed_at,
        }
    }

    /// Context announcing "no vehicle".
    pub fn empty(pushed_at: Timestamp) -> Self {
        Self {
            snapshot: None,
            pushed_at,
        }
    }
}
