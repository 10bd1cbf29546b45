//! # Cache Configuration

use serde::{Deserialize, Serialize};
use shared_storage::keys::{OVERLAY_KEY, SNAPSHOT_KEY};
use shared_types::{Timestamp, HOUR_MS};
use std::time::Duration;

/// Age after which a snapshot is flagged stale.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(HOUR_MS);

/// Local snapshot cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Key of the last known snapshot (codec bytes).
    pub snapshot_key: String,

    /// Key of the optimistic overlay (JSON).
    pub overlay_key: String,

    /// Staleness threshold.
    pub stale_after: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            snapshot_key: SNAPSHOT_KEY.to_string(),
            overlay_key: OVERLAY_KEY.to_string(),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }
}

impl CacheConfig {
    /// Create a config for testing (isolated keys).
    pub fn for_testing() -> Self {
        Self {
            snapshot_key: "test.snapshot".to_string(),
            overlay_key: "test.overlay".to_string(),
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    /// Threshold in timestamp units.
    pub fn stale_after_ms(&self) -> Timestamp {
        u64::try_from(self.stale_after.as_millis()).unwrap_or(u64::MAX)
    }
}
