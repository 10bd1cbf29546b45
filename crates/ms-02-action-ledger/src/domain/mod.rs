//! # Domain Module
//!
//! Ledger records, outcomes, errors and counters.

pub mod entities;
pub mod errors;
pub mod metrics;

pub use entities::*;
pub use errors::*;
pub use metrics::*;
