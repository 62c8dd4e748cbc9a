//! Storage trait definitions.

use crate::StorageResult;
use async_trait::async_trait;

/// Durable string key-value store.
///
/// Each single-key operation is atomic. `set` and `remove` may complete
/// asynchronously with respect to the caller; callers that need ordering
/// must await them.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Retrieve a value, `None` if the key is absent.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value. Returns whether the key existed.
    async fn remove(&self, key: &str) -> StorageResult<bool>;

    /// Delete several keys as one batch. Absent keys are ignored.
    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Check if a key exists
    async fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
