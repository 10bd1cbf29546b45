//! # Storage Errors

use thiserror::Error;

/// The shared durable region could not be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The region could not be opened (missing entitlement, bad path).
    #[error("Shared storage unavailable: {message}")]
    Unavailable {
        /// Underlying reason.
        message: String,
    },

    /// An I/O operation on an opened region failed.
    #[error("Storage I/O error: {message}")]
    Io {
        /// Underlying reason.
        message: String,
    },

    /// The region's on-disk image could not be parsed.
    #[error("Storage image corrupt: {message}")]
    Corrupt {
        /// Underlying reason.
        message: String,
    },
}

impl StorageError {
    pub(crate) fn io(e: impl std::fmt::Display) -> Self {
        StorageError::Io {
            message: e.to_string(),
        }
    }
}
