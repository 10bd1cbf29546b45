//! # Application Layer
//!
//! Services orchestrating the cache, ledger and channel.

pub mod coordinator;
pub mod reconciler;

pub use coordinator::SyncCoordinator;
pub use reconciler::AuthorityReconciler;
