//! # Domain Module

pub mod errors;
pub mod metrics;
pub mod outcomes;

pub use errors::*;
pub use metrics::*;
pub use outcomes::*;
