//! # Runtime Configuration
//!
//! Aggregates the subsystem configs for one process and loads overrides
//! from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MS_DATA_DIR` | `./data` | Directory holding the shared store image |
//! | `MS_PROCESS_ROLE` | `wearable` | `authority`, `wearable` or `widget` |
//! | `MS_STALE_AFTER_SECS` | `3600` | Cache staleness threshold |
//! | `MS_LEDGER_TTL_SECS` | `604800` | Deferred action time-to-live |

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ms_02_action_ledger::LedgerConfig;
use ms_03_transport_channel::ChannelConfig;
use ms_04_snapshot_cache::CacheConfig;
use ms_05_sync_coordinator::{CoordinatorConfig, ProcessRole};
use thiserror::Error;

/// File name of the shared store image inside the data directory.
pub const STORE_FILE_NAME: &str = "shared-region.bin";

/// Which end of the link this process is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeRole {
    /// Primary handheld: owns canonical data, drains the ledger.
    Authority,
    /// Companion wearable: transport-connected satellite.
    #[default]
    Wearable,
    /// Glanceable display surface: ledger handoff only.
    Widget,
}

impl NodeRole {
    /// Lower-case name used in env vars and log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeRole::Authority => "authority",
            NodeRole::Wearable => "wearable",
            NodeRole::Widget => "widget",
        }
    }

    /// Delivery path for a satellite with this role.
    pub fn process_role(&self) -> ProcessRole {
        match self {
            NodeRole::Widget => ProcessRole::HandoffOnly,
            NodeRole::Authority | NodeRole::Wearable => ProcessRole::Connected,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authority" => Ok(NodeRole::Authority),
            "wearable" => Ok(NodeRole::Wearable),
            "widget" => Ok(NodeRole::Widget),
            other => Err(ConfigError::UnknownRole(other.to_string())),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `MS_PROCESS_ROLE` names no known role.
    #[error("unknown process role '{0}' (expected authority, wearable or widget)")]
    UnknownRole(String),

    /// A numeric variable did not parse.
    #[error("{var} must be a whole number of seconds, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },

    /// A duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// The data directory path is empty.
    #[error("data directory must not be empty")]
    EmptyDataDir,
}

/// Complete configuration for one sync process.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Process role.
    pub role: NodeRole,
    /// Directory holding the shared store image.
    pub data_dir: PathBuf,
    /// Ledger configuration.
    pub ledger: LedgerConfig,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// Channel configuration.
    pub channel: ChannelConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            role: NodeRole::default(),
            data_dir: PathBuf::from("./data"),
            ledger: LedgerConfig::default(),
            cache: CacheConfig::default(),
            channel: ChannelConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from `MS_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(role) = lookup("MS_PROCESS_ROLE") {
            config.role = role.parse()?;
        }
        if let Some(dir) = lookup("MS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = seconds(&lookup, "MS_STALE_AFTER_SECS")? {
            config.cache.stale_after = secs;
        }
        if let Some(secs) = seconds(&lookup, "MS_LEDGER_TTL_SECS")? {
            config.ledger.ttl = secs;
        }

        Ok(config)
    }

    /// Config for tests: in-memory friendly keys, given role.
    pub fn for_testing(role: NodeRole) -> Self {
        Self {
            role,
            data_dir: PathBuf::from("./test-data"),
            ledger: LedgerConfig::for_testing(),
            cache: CacheConfig::for_testing(),
            channel: ChannelConfig::for_testing(),
        }
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.cache.stale_after.is_zero() {
            return Err(ConfigError::ZeroDuration("MS_STALE_AFTER_SECS"));
        }
        if self.ledger.ttl.is_zero() {
            return Err(ConfigError::ZeroDuration("MS_LEDGER_TTL_SECS"));
        }
        Ok(())
    }

    /// Coordinator config for this role.
    pub fn coordinator(&self) -> CoordinatorConfig {
        CoordinatorConfig::with_role(self.role.process_role())
    }

    /// Path of the shared store image.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidNumber { var, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.role, NodeRole::Wearable);
        assert_eq!(config.cache.stale_after, Duration::from_secs(3600));
        assert_eq!(config.ledger.ttl, Duration::from_secs(7 * 24 * 3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("MS_PROCESS_ROLE", "Widget"),
            ("MS_DATA_DIR", "/var/maintsync"),
            ("MS_STALE_AFTER_SECS", "120"),
            ("MS_LEDGER_TTL_SECS", "86400"),
        ]))
        .unwrap();

        assert_eq!(config.role, NodeRole::Widget);
        assert_eq!(config.store_path(), PathBuf::from("/var/maintsync").join(STORE_FILE_NAME));
        assert_eq!(config.cache.stale_after, Duration::from_secs(120));
        assert_eq!(config.ledger.ttl, Duration::from_secs(86400));
        assert_eq!(config.coordinator().role, ProcessRole::HandoffOnly);
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            RuntimeConfig::from_lookup(lookup(&[("MS_PROCESS_ROLE", "toaster")])).unwrap_err(),
            ConfigError::UnknownRole("toaster".to_string())
        );
        assert!(matches!(
            RuntimeConfig::from_lookup(lookup(&[("MS_LEDGER_TTL_SECS", "a week")])),
            Err(ConfigError::InvalidNumber { var: "MS_LEDGER_TTL_SECS", .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_durations() {
        let config = RuntimeConfig::from_lookup(lookup(&[("MS_STALE_AFTER_SECS", "0")])).unwrap();
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroDuration("MS_STALE_AFTER_SECS"))
        );

        let mut config = RuntimeConfig::default();
        config.data_dir = PathBuf::new();
        assert_eq!(config.validate(), Err(ConfigError::EmptyDataDir));
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(NodeRole::Wearable.process_role(), ProcessRole::Connected);
        assert_eq!(NodeRole::Widget.process_role(), ProcessRole::HandoffOnly);
        assert_eq!(NodeRole::Authority.to_string(), "authority");
    }
}
