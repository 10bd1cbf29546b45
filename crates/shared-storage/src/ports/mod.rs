//! # Ports Module
//!
//! Outbound dependencies of every component that touches the shared region.

pub mod outbound;

pub use outbound::*;
