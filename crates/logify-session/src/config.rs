//! Session store tuning.

use std::time::Duration;

/// Retry behavior for the logout purge.
///
/// Delay before attempt `n` (n >= 2) is `backoff_base * 2^(n - 2)`, capped
/// at `backoff_max`. With the defaults: 50ms, 100ms, 200ms, 400ms.
#[derive(Debug, Clone)]
pub struct SessionStoreConfig {
    /// Total purge attempts, including the first.
    pub purge_max_attempts: u32,
    /// Delay before the first retry.
    pub backoff_base: Duration,
    /// Upper bound on any single delay.
    pub backoff_max: Duration,
}

impl Default for SessionStoreConfig {
    fn default() -> Self {
        Self {
            purge_max_attempts: 5,
            backoff_base: Duration::from_millis(50),
            backoff_max: Duration::from_secs(2),
        }
    }
}

impl SessionStoreConfig {
    /// Delay to wait after `failed_attempts` consecutive failures.
    pub fn backoff_for(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(16);
        self.backoff_base
            .saturating_mul(1u32 << exponent)
            .min(self.backoff_max)
    }
}
