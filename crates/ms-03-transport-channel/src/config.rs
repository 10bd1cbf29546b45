//! # Channel Configuration

use serde::{Deserialize, Serialize};

/// Status shown while mutations wait in the durable queue.
pub const DEFAULT_FALLBACK_STATUS: &str = "Will sync when your paired device is nearby";

/// Transport channel configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Status string set when a send falls back to the durable queue.
    pub fallback_status_message: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            fallback_status_message: DEFAULT_FALLBACK_STATUS.to_string(),
        }
    }
}

impl ChannelConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self {
            fallback_status_message: "queued".to_string(),
        }
    }
}
