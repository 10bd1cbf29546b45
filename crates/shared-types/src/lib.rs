//! # Shared Types Crate
//!
//! Data model shared by the authority (primary handheld) and every satellite
//! process (wearable app, glanceable display surfaces).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: snapshot, service and intent types are defined here.
//! - **Authority Owns Snapshots**: only the authority constructs canonical
//!   `VehicleSnapshot` values; satellites cache and overlay them.
//! - **Stable Identity**: services are identified by `ServiceKey`, intents by
//!   `DedupKey`, so repeated taps collapse to one pending mutation.

pub mod entities;
pub mod intents;
pub mod settings;

pub use entities::*;
pub use intents::*;
pub use settings::*;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// One minute in milliseconds.
pub const MINUTE_MS: Timestamp = 60 * 1000;

/// One hour in milliseconds.
pub const HOUR_MS: Timestamp = 60 * MINUTE_MS;

/// One day in milliseconds.
pub const DAY_MS: Timestamp = 24 * HOUR_MS;
