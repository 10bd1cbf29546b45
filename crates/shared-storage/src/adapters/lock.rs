//! # Region Lock
//!
//! Uses `fs2` for cross-platform advisory locking (flock on Unix, LockFile on
//! Windows) so that processes sharing the region never interleave a
//! read-modify-write of the store image.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::errors::StorageError;

/// Held advisory lock on a region's lock file; released on drop (RAII).
pub(crate) struct RegionLock {
    file: File,
    path: PathBuf,
}

impl RegionLock {
    /// Block until a shared (reader) lock is held.
    pub(crate) fn shared(path: &Path) -> Result<Self, StorageError> {
        let file = Self::open(path)?;
        file.lock_shared().map_err(StorageError::io)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Block until an exclusive (writer) lock is held.
    pub(crate) fn exclusive(path: &Path) -> Result<Self, StorageError> {
        let file = Self::open(path)?;
        file.lock_exclusive().map_err(StorageError::io)?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    fn open(path: &Path) -> Result<File, StorageError> {
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StorageError::Unavailable {
                message: format!("cannot open lock file {}: {}", path.display(), e),
            })
    }
}

impl Drop for RegionLock {
    fn drop(&mut self) {
        // fs2::FileExt::unlock is stable
        #[allow(clippy::incompatible_msrv)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release region lock");
        }
    }
}
