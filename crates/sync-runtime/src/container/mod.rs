//! # Sync Container
//!
//! Configuration plus the dependency-injected set of subsystems for one
//! process.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeRole, RuntimeConfig};
pub use subsystems::{Endpoint, SyncContainer};
