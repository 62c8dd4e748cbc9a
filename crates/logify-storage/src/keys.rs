//! Storage key constants.

/// Keys used for the persisted app state.
pub struct StorageKeys;

impl StorageKeys {
    /// Connectivity mode, `"online"` or `"offline"`.
    pub const APP_MODE: &'static str = "appMode";

    /// Current user identifier.
    pub const USER: &'static str = "user";

    /// Tombstone written before a logout purge and removed with it.
    pub const LOGOUT_PENDING: &'static str = "logoutPending";

    /// Every key owned by the session.
    pub const SESSION_KEYS: [&'static str; 3] =
        [Self::APP_MODE, Self::USER, Self::LOGOUT_PENDING];
}
