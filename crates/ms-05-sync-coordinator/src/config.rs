//! # Coordinator Configuration

use serde::{Deserialize, Serialize};

/// How this process reaches the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ProcessRole {
    /// Talks to the authority over a transport (wearable app).
    #[default]
    Connected,
    /// Can only hand off through the shared ledger (widget button process).
    HandoffOnly,
}

/// Sync coordinator configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Delivery path for mutations.
    pub role: ProcessRole,
}

impl CoordinatorConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Config for a process with the given role.
    pub fn with_role(role: ProcessRole) -> Self {
        Self { role }
    }
}
