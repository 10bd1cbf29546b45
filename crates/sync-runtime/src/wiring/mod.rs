//! # Wiring
//!
//! Connects the container's event bus to the single-writer service.

pub mod event_loop;

pub use event_loop::SyncRuntime;
