use crate::errors::StorageError;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory key-value store for unit tests.
///
/// Can be switched into an "unavailable" mode to exercise the degraded paths
/// taken when the shared region cannot be opened.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: RwLock<HashMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl InMemoryKVStore {
    /// Create an empty, available store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with `StorageError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable {
                message: "in-memory store switched off".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_available()?;
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.check_available()?;
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        self.data.write().remove(key);
        Ok(())
    }

    fn atomic_batch_write(&self, operations: Vec<BatchOperation>) -> Result<(), StorageError> {
        self.check_available()?;
        // Single write guard: no reader observes a partial batch
        let mut data = self.data.write();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOperation::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_kv_store() {
        let store = InMemoryKVStore::new();

        store.put("key1", b"value1").unwrap();
        store.put("key2", b"value2").unwrap();

        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));
        assert_eq!(store.get("key2").unwrap(), Some(b"value2".to_vec()));
        assert_eq!(store.get("key3").unwrap(), None);

        assert!(store.exists("key1").unwrap());
        assert!(!store.exists("key3").unwrap());
    }

    #[test]
    fn test_in_memory_kv_batch_write() {
        let store = InMemoryKVStore::new();
        store.put("c", b"old").unwrap();

        let ops = vec![
            BatchOperation::put("a", b"1".to_vec()),
            BatchOperation::put("b", b"2".to_vec()),
            BatchOperation::delete("c"),
        ];
        store.atomic_batch_write(ops).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
        assert_eq!(store.get("b").unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get("c").unwrap(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let store = InMemoryKVStore::new();
        store.put("a", b"1").unwrap();
        store.set_unavailable(true);

        assert!(matches!(store.get("a"), Err(StorageError::Unavailable { .. })));
        assert!(store.put("b", b"2").is_err());

        store.set_unavailable(false);
        assert_eq!(store.get("a").unwrap(), Some(b"1".to_vec()));
    }
}
