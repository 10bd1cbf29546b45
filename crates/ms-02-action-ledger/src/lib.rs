//! # MS-02 Deferred Action Ledger
//!
//! Durable, at-least-once handoff of satellite-originated mutations to an
//! authority that cannot be reached synchronously (a widget button running
//! in a short-lived process, for example).
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (domain + service over the `KeyValueStore` port)
//!
//! ## Semantics
//!
//! - `enqueue` collapses intents by dedup identity: mileage updates supersede
//!   (latest wins), repeated service completions are no-ops.
//! - `drain_all` prunes records older than the TTL on every read and
//!   persists the pruned ledger before returning the remainder.
//! - Records come back in enqueue order (ascending sequence number).
//! - Every load/mutate/store cycle runs inside one exclusive critical section.
//! - Storage failures on `enqueue` are logged and counted, never raised.
//!
//! ## Module Structure
//!
//! ```text
//! ms-02-action-ledger/
//! ├── config.rs      # LedgerConfig
//! ├── domain/        # PendingActionRecord, EnqueueOutcome, LedgerError, LedgerMetrics
//! └── service.rs     # DeferredActionLedger
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod service;

// Re-exports
pub use config::LedgerConfig;
pub use domain::{EnqueueOutcome, LedgerError, LedgerMetrics, PendingActionRecord};
pub use service::DeferredActionLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
