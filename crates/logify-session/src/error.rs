//! Session error types.

use logify_storage::StorageError;
use thiserror::Error;

/// Session store error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Durable storage failed a read or write
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// A persisted value is outside its domain
    #[error("Invalid persisted value for {key}: {value:?}")]
    InvalidPersistedValue { key: String, value: String },

    /// Logout cleared memory but the persisted keys could not be deleted
    #[error("Logout left persisted session keys behind: {0}")]
    LogoutPartialFailure(StorageError),

    /// Login was attempted without a user identifier
    #[error("User identifier must not be empty")]
    EmptyUser,

    /// The store was used before `initialize` completed
    #[error("Session store used before initialization")]
    NotInitialized,

    /// The persistence worker has shut down
    #[error("Session persistence worker is not running")]
    WorkerStopped,
}

impl SessionError {
    /// Failures that leave in-memory state usable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable(_)
                | Self::InvalidPersistedValue { .. }
                | Self::LogoutPartialFailure(_)
        )
    }
}

/// Result type alias using SessionError.
pub type SessionResult<T> = Result<T, SessionError>;
