//! The storage backend boundary.
//!
//! The extension's persistent storage (browser `storage.local` or whatever
//! the host provides) is an external collaborator; the store only assumes
//! whole-value get/set/delete semantics. Values are opaque bytes; the
//! canonical codec is applied above this boundary.

use async_trait::async_trait;
use dps_types::error::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Whole-value keyed storage, read-many / write-whole.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    /// Gets a value by key.
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;

    /// Sets a key to a value, replacing any previous value.
    async fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Deletes a key-value pair. Deleting an absent key is not an error.
    async fn delete(&self, key: &[u8]) -> Result<(), StoreError>;
}

/// An in-memory adapter for tests and the extension's session cache.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Vec<u8>, Vec<u8>>>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("memory storage poisoned".into()))
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &[u8]) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_get_set_delete() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(b"k").await.unwrap(), None);

        storage.set(b"k", b"v1").await.unwrap();
        assert_eq!(storage.get(b"k").await.unwrap(), Some(b"v1".to_vec()));

        storage.set(b"k", b"v2").await.unwrap();
        assert_eq!(storage.get(b"k").await.unwrap(), Some(b"v2".to_vec()));

        storage.delete(b"k").await.unwrap();
        assert_eq!(storage.get(b"k").await.unwrap(), None);
        // Idempotent delete.
        storage.delete(b"k").await.unwrap();
    }
}
