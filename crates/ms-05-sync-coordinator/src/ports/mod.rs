//! # Ports

pub mod outbound;

pub use outbound::{CanonicalStore, MockCanonicalStore};
