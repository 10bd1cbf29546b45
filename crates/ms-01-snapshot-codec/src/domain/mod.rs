//! # Domain Module
//!
//! Codec types: the application-context envelope, errors and wire structs.

pub mod context;
pub mod errors;
pub(crate) mod wire;

pub use context::*;
pub use errors::*;

/// Schema version written by this build.
///
/// Version 1 payloads predate `distanceUnit`, the mileage estimate,
/// `serviceID` and `daysRemaining`.
pub const SCHEMA_VERSION: u16 = 2;
