//! # MS-04 Local Snapshot Cache
//!
//! The satellite's single in-memory source of UI truth, persisted to the
//! local store so it survives restarts and works fully offline.
//!
//! **Subsystem ID:** 04
//! **Architecture:** Hexagonal (domain + service over the `KeyValueStore` port)
//!
//! ## Overlay Rules
//!
//! - Optimistic edits (new mileage, removed services) live in an overlay on
//!   top of the last authoritative snapshot.
//! - An authoritative `replace` discards the overlay wholesale. There is no
//!   field-level merge; the authority always wins.
//! - A snapshot no newer than the cached one is ignored, so the cache never
//!   regresses.
//! - Staleness (`now - produced_at > 1h`) is a UI flag only.
//!
//! ## Module Structure
//!
//! ```text
//! ms-04-snapshot-cache/
//! ├── config.rs      # CacheConfig
//! ├── domain/        # CacheEntry, OptimisticOverlay, ReplaceOutcome, CacheError
//! └── service.rs     # LocalSnapshotCache
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

// Re-exports
pub use config::CacheConfig;
pub use domain::{CacheEntry, CacheError, OptimisticOverlay, ReplaceOutcome};
pub use service::LocalSnapshotCache;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
