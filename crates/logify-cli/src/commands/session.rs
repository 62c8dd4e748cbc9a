//! Session commands.

use crate::output::{self, row, OutputFormat};
use anyhow::{bail, Result};
use logify_session::{AppMode, SessionError, SessionState, SessionStore};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

/// Session state as shown to the user.
#[derive(Debug, Serialize)]
struct SessionView {
    mode: AppMode,
    user: Option<String>,
    signed_in: bool,
    offline_user: bool,
    failed_writes: u64,
}

impl SessionView {
    fn new(store: &SessionStore, state: SessionState) -> Self {
        Self {
            mode: state.mode,
            signed_in: state.is_signed_in(),
            offline_user: state.is_offline_user(),
            user: state.user,
            failed_writes: store.queue_status().failed_writes,
        }
    }
}

impl fmt::Display for SessionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user = match (&self.user, self.offline_user) {
            (Some(_), true) => "offline user".to_string(),
            (Some(u), false) => u.clone(),
            (None, _) => "none".to_string(),
        };
        writeln!(f, "{}", row("Mode", self.mode.as_str()))?;
        write!(f, "{}", row("User", &user))?;
        if self.failed_writes > 0 {
            write!(f, "\n{}", row("Failed writes", &self.failed_writes.to_string()))?;
        }
        Ok(())
    }
}

/// Show the current session.
pub async fn status(store: &SessionStore, format: OutputFormat) -> Result<()> {
    let state = store.snapshot()?;
    output::print(&SessionView::new(store, state), format);
    Ok(())
}

/// Sign in as `user` and switch online.
pub async fn login(store: &SessionStore, user: &str, format: OutputFormat) -> Result<()> {
    let user = user.trim();
    if user.is_empty() {
        bail!("User is required");
    }

    if store.user()?.as_deref() == Some(user) && store.mode()? == AppMode::Online {
        output::print_success(&format!("Already logged in as {}", user), format);
        return Ok(());
    }

    store.login(user)?;
    store.flush().await?;
    info!(user, "Logged in");
    output::print_success(&format!("Logged in as {}", user), format);
    Ok(())
}

/// Continue offline with the placeholder user.
pub async fn offline(store: &SessionStore, format: OutputFormat) -> Result<()> {
    store.enter_offline()?;
    store.flush().await?;
    output::print_success("Continuing offline", format);
    Ok(())
}

/// Switch the connectivity mode without touching the user.
pub async fn set_mode(store: &SessionStore, mode: AppMode, format: OutputFormat) -> Result<()> {
    store.set_mode(mode)?;
    store.flush().await?;
    output::print_success(&format!("Mode set to {}", mode), format);
    Ok(())
}

/// Log out and clear the stored session.
pub async fn logout(store: &SessionStore, format: OutputFormat) -> Result<()> {
    let was_signed_in = store.user()?.is_some();

    match store.logout().await {
        Ok(()) if was_signed_in => output::print_success("Logged out successfully", format),
        Ok(()) => output::print_success("Not logged in", format),
        Err(SessionError::LogoutPartialFailure(e)) => {
            warn!(error = %e, "Stored session could not be cleared");
            output::print_error(
                "Logged out, but the stored session could not be cleared. It will be cleared on next start.",
                format,
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
