//! # MS-05 Sync Coordinator
//!
//! Orchestrates the other subsystems on both ends of the link.
//!
//! **Subsystem ID:** 05
//! **Architecture:** Hexagonal (domain, `CanonicalStore` port, application services)
//!
//! ## Satellite Side (`SyncCoordinator`)
//!
//! ```text
//! update_mileage / mark_service_done
//!   1. build MutationIntent
//!   2. LocalSnapshotCache::apply_optimistic_*      (UI updates now)
//!   3. Connected   → spawn TransportChannel::send  (never awaited by the caller)
//!      HandoffOnly → DeferredActionLedger::enqueue
//! ```
//!
//! Transport callbacks arrive on the event bus and are applied by `run`,
//! the single writer of the cache.
//!
//! ## Authority Side (`AuthorityReconciler`)
//!
//! On resume: drain the ledger, apply records in enqueue order, remove only
//! the ones that applied (failures retry until the TTL prunes them), then
//! publish a fresh snapshot.
//!
//! ## Module Structure
//!
//! ```text
//! ms-05-sync-coordinator/
//! ├── config.rs         # CoordinatorConfig, ProcessRole
//! ├── domain/           # MutationReceipt, SyncStatus, DrainReport, errors
//! ├── ports/            # CanonicalStore (outbound) + mock
//! └── application/      # SyncCoordinator, AuthorityReconciler
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use application::{AuthorityReconciler, SyncCoordinator};
pub use config::{CoordinatorConfig, ProcessRole};
pub use domain::{ApplyError, Delivery, DrainReport, MutationReceipt, SyncError, SyncStatus};
pub use ports::{CanonicalStore, MockCanonicalStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
