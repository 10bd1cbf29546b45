//! # Domain Errors

use shared_storage::StorageError;
use thiserror::Error;

/// Cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    /// No snapshot is cached, so there is nothing to overlay.
    #[error("No cached snapshot")]
    NoSnapshot,

    /// The local store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A value could not be encoded for storage.
    #[error("Encode error: {0}")]
    Encode(String),
}
