//! # Domain Errors

use ms_03_transport_channel::TransportError;
use ms_04_snapshot_cache::CacheError;
use shared_storage::StorageError;
use thiserror::Error;
use uuid::Uuid;

/// Coordinator errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// No vehicle is cached, so there is nothing to mutate.
    #[error("No vehicle available")]
    NoVehicle,

    /// Cache operation failed.
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Transport operation failed.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shared store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// An inbound payload could not be decoded.
    #[error("Unreadable payload")]
    Unreadable,

    /// The canonical store refused a mutation.
    #[error("Apply error: {0}")]
    Apply(#[from] ApplyError),
}

/// Errors from applying a mutation to the canonical store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplyError {
    /// The vehicle does not exist on the authority.
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(Uuid),

    /// The canonical store is temporarily unable to write.
    #[error("Canonical store unavailable: {0}")]
    Unavailable(String),

    /// The mutation is invalid for the current canonical state.
    #[error("Rejected: {0}")]
    Rejected(String),
}
