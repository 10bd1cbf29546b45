//! # Outbound Ports (Driven Ports)
//!
//! Interfaces the host process implements for the sync layer.

use shared_types::Timestamp;

use crate::errors::StorageError;

/// The shared key-value region every sync process on a device reads and writes.
///
/// Production: `FileBackedKVStore` in the device's shared container directory.
/// Testing: `InMemoryKVStore`.
///
/// Methods take `&self`; implementations synchronize internally so one handle
/// can be shared by the cache and the ledger of a process.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Overwrite `key` with `value`.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Apply `operations` as one write: another process observes all of them
    /// or none (the cache replaces its snapshot and drops its overlay this way).
    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StorageError>;

    /// Whether `key` currently holds a value.
    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key)?.is_some())
    }
}

/// One step of an `atomic_batch_write`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Store `value` under `key`.
    Put {
        /// Target key.
        key: String,
        /// Bytes to store.
        value: Vec<u8>,
    },
    /// Remove `key`.
    Delete {
        /// Target key.
        key: String,
    },
}

impl BatchOperation {
    /// `Put` step.
    pub fn put(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `Delete` step.
    pub fn delete(key: impl Into<String>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Wall clock, injected so TTL and staleness can be tested with a manual clock.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}
