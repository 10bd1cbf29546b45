use crate::errors::StorageError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(feature = "locking")]
use super::lock::RegionLock;

type StoreImage = BTreeMap<String, Vec<u8>>;

/// File-backed key-value store shared between processes on one device.
///
/// Every operation re-reads the on-disk image, because other processes may
/// have written since the last call. Writes go through a temp file and an
/// atomic rename, under an exclusive region lock.
pub struct FileBackedKVStore {
    path: PathBuf,
    #[cfg_attr(not(feature = "locking"), allow(dead_code))]
    lock_path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or create) the store image at `path`.
    ///
    /// Fails with `StorageError::Unavailable` when the containing directory
    /// cannot be created, which is how a missing shared container surfaces.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Unavailable {
                message: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        match std::fs::metadata(&path) {
            Ok(metadata) => tracing::info!(
                "[shared-storage] Found existing store: {} ({} bytes)",
                path.display(),
                metadata.len()
            ),
            Err(_) => tracing::info!("[shared-storage] No existing store at {}", path.display()),
        }

        let lock_path = path.with_extension("lock");
        Ok(Self { path, lock_path })
    }

    /// Location of the store image.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreImage, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(StoreImage::new()),
            Err(e) => return Err(StorageError::io(e)),
        };
        if bytes.is_empty() {
            return Ok(StoreImage::new());
        }
        bincode::deserialize(&bytes).map_err(|e| StorageError::Corrupt {
            message: e.to_string(),
        })
    }

    fn save(&self, image: &StoreImage) -> Result<(), StorageError> {
        let bytes = bincode::serialize(image).map_err(StorageError::io)?;

        // Write atomically via temp file
        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(StorageError::io)?;
        file.write_all(&bytes).map_err(StorageError::io)?;
        file.sync_all().map_err(StorageError::io)?;
        std::fs::rename(&temp_path, &self.path).map_err(StorageError::io)?;

        Ok(())
    }

    fn read<R>(&self, f: impl FnOnce(&StoreImage) -> R) -> Result<R, StorageError> {
        #[cfg(feature = "locking")]
        let _guard = RegionLock::shared(&self.lock_path)?;
        let image = self.load()?;
        Ok(f(&image))
    }

    fn modify(&self, f: impl FnOnce(&mut StoreImage)) -> Result<(), StorageError> {
        #[cfg(feature = "locking")]
        let _guard = RegionLock::exclusive(&self.lock_path)?;
        let mut image = self.load()?;
        f(&mut image);
        self.save(&image)
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.read(|image| image.get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.modify(|image| {
            image.insert(key.to_string(), value.to_vec());
        })
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.modify(|image| {
            image.remove(key);
        })
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StorageError> {
        self.modify(|image| {
            for op in operations {
                match op {
                    BatchOperation::Put { key, value } => {
                        image.insert(key, value);
                    }
                    BatchOperation::Delete { key } => {
                        image.remove(&key);
                    }
                }
            }
        })
    }
}
