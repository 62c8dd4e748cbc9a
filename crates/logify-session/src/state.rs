//! In-memory session state.

use crate::AppMode;
use serde::{Deserialize, Serialize};

/// Placeholder principal used when the app runs offline.
pub const OFFLINE_USER: &str = "offline-user";

/// Current principal and connectivity mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub mode: AppMode,
    pub user: Option<String>,
}

impl SessionState {
    /// State after a logout: no user, offline.
    pub fn logged_out() -> Self {
        Self {
            mode: AppMode::Offline,
            user: None,
        }
    }

    /// True when the user is the offline placeholder.
    pub fn is_offline_user(&self) -> bool {
        self.user.as_deref() == Some(OFFLINE_USER)
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

/// Empty identifiers count as absent.
pub(crate) fn normalize_user(user: Option<String>) -> Option<String> {
    user.filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_online_without_user() {
        let state = SessionState::default();
        assert_eq!(state.mode, AppMode::Online);
        assert!(!state.is_signed_in());
    }

    #[test]
    fn logged_out_is_offline_without_user() {
        let state = SessionState::logged_out();
        assert_eq!(state.mode, AppMode::Offline);
        assert_eq!(state.user, None);
    }

    #[test]
    fn offline_user_detection() {
        let state = SessionState {
            mode: AppMode::Offline,
            user: Some(OFFLINE_USER.to_string()),
        };
        assert!(state.is_offline_user());
        assert!(state.is_signed_in());
    }

    #[test]
    fn empty_user_normalizes_to_none() {
        assert_eq!(normalize_user(Some(String::new())), None);
        assert_eq!(normalize_user(Some("bob".into())), Some("bob".into()));
        assert_eq!(normalize_user(None), None);
    }
}
