//! # Logify session core
//!
//! Holds the current principal and connectivity mode, writes every change
//! through to durable key-value storage, and rehydrates it at startup.
//!
//! ```text
//! ┌──────────────┐  mutate   ┌──────────────────┐  FIFO  ┌──────────────────┐
//! │   callers    │──────────▶│   SessionStore   │───────▶│ persistence task │
//! │ (CLI, UI...) │◀──────────│ (in-memory state)│        │     (worker)     │
//! └──────────────┘ snapshot  └──────────────────┘        └────────┬─────────┘
//!                                                                 ▼
//!                                                        ┌──────────────────┐
//!                                                        │ KeyValueStorage  │
//!                                                        └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use logify_session::{AppMode, SessionStore};
//! use logify_storage::MemoryStorage;
//!
//! let store = Arc::new(SessionStore::new(Arc::new(MemoryStorage::new())));
//! store.initialize().await;
//!
//! store.login("alice")?;
//! assert_eq!(store.mode()?, AppMode::Online);
//!
//! store.logout().await?;
//! assert_eq!(store.user()?, None);
//! ```

mod config;
mod error;
mod mode;
mod persistence;
mod state;
mod store;
pub mod theme;

pub use config::SessionStoreConfig;
pub use error::{SessionError, SessionResult};
pub use mode::AppMode;
pub use persistence::QueueStatus;
pub use state::{SessionState, OFFLINE_USER};
pub use store::SessionStore;
pub use theme::{Palette, Theme, ThemeStore};
