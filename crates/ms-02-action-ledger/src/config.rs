//! # Ledger Configuration

use serde::{Deserialize, Serialize};
use shared_storage::keys::LEDGER_KEY;
use shared_types::{Timestamp, DAY_MS};
use std::time::Duration;

/// Default time a pending record survives without being consumed.
pub const DEFAULT_TTL: Duration = Duration::from_millis(7 * DAY_MS);

/// Deferred action ledger configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Key of the ledger document in the shared store.
    pub storage_key: String,

    /// Records older than this are pruned on read.
    pub ttl: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            storage_key: LEDGER_KEY.to_string(),
            ttl: DEFAULT_TTL,
        }
    }
}

impl LedgerConfig {
    /// Create a config for testing (isolated key).
    pub fn for_testing() -> Self {
        Self {
            storage_key: "test.ledger".to_string(),
            ttl: DEFAULT_TTL,
        }
    }

    /// TTL in timestamp units.
    pub fn ttl_ms(&self) -> Timestamp {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}
