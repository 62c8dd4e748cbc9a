//! Durable key-value storage for the Logify app state.
//!
//! Backends:
//! - [`MemoryStorage`]: process-local map, for tests and ephemeral runs
//! - [`FileStorage`]: one JSON object on disk, rewritten atomically per operation

mod file;
mod keys;
mod memory;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use traits::KeyValueStorage;

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend not ready or refusing operations
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Stored data could not be decoded or encoded
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared handle to a storage backend.
pub type SharedStorage = Arc<dyn KeyValueStorage>;

/// Open the file-backed store at `path`.
pub fn create_file_storage(path: &Path) -> SharedStorage {
    Arc::new(FileStorage::new(path))
}
