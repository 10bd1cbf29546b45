//! # Domain Errors

use shared_storage::StorageError;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The shared store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The ledger document could not be serialized.
    #[error("Encode error: {0}")]
    Encode(String),
}
