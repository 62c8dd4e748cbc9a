//! CLI command implementations.

mod env;
mod session;
mod theme;

pub use env::env;
pub use session::{login, logout, offline, set_mode, status};
pub use theme::theme;

use anyhow::{Context, Result};
use logify_config::Paths;
use logify_session::SessionStore;
use logify_storage::create_file_storage;
use std::sync::Arc;
use tracing::debug;

/// Open the file-backed session store and rehydrate it.
pub async fn open_session(paths: &Paths) -> Result<Arc<SessionStore>> {
    paths
        .ensure_dirs()
        .context("Failed to create Logify directories")?;

    let state_file = paths.app_state_file();
    debug!(path = %state_file.display(), "Opening session storage");

    let store = Arc::new(SessionStore::new(create_file_storage(&state_file)));
    store.initialize().await;
    Ok(store)
}
