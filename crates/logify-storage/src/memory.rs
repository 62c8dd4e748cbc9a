//! In-memory storage backend.

use crate::{KeyValueStorage, StorageResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local key-value store. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: Mutex::new(data),
        }
    }

    /// Synchronous read, for assertions.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }
}

#[async_trait]
impl KeyValueStorage for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().remove(key).is_some())
    }

    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        let mut data = self.data.lock();
        for key in keys {
            data.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();

        storage.set("user", "alice").await.unwrap();
        assert_eq!(storage.get("user").await.unwrap(), Some("alice".to_string()));
        assert!(storage.has("user").await.unwrap());
        assert!(!storage.has("appMode").await.unwrap());

        assert!(storage.remove("user").await.unwrap());
        assert!(!storage.remove("user").await.unwrap());
        assert_eq!(storage.get("user").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_remove_ignores_missing() {
        let storage = MemoryStorage::with_entries([("appMode", "offline"), ("user", "bob"), ("other", "x")]);

        storage.multi_remove(&["appMode", "user", "logoutPending"]).await.unwrap();

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.peek("other"), Some("x".to_string()));
    }
}
