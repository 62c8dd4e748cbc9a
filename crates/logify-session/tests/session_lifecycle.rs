//! Session lifecycle across restarts and storage failures.

use async_trait::async_trait;
use logify_session::{
    AppMode, SessionError, SessionState, SessionStore, SessionStoreConfig, OFFLINE_USER,
};
use logify_storage::{
    FileStorage, KeyValueStorage, MemoryStorage, SharedStorage, StorageError, StorageResult,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Memory storage with switchable failures.
#[derive(Default)]
struct FlakyStorage {
    inner: MemoryStorage,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Fail single-key deletes only.
    fail_removes: AtomicBool,
    /// Delay every read by `SLOW_READ`.
    slow_reads: AtomicBool,
    /// Number of upcoming `multi_remove` calls that fail.
    failing_purges: AtomicU32,
    purge_calls: AtomicU32,
}

const SLOW_READ: Duration = Duration::from_millis(100);

impl FlakyStorage {
    fn unavailable() -> StorageError {
        StorageError::Unavailable("injected failure".to_string())
    }
}

#[async_trait]
impl KeyValueStorage for FlakyStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.slow_reads.load(Ordering::SeqCst) {
            tokio::time::sleep(SLOW_READ).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> StorageResult<bool> {
        if self.fail_writes.load(Ordering::SeqCst) || self.fail_removes.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.remove(key).await
    }

    async fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        self.purge_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_purges.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_purges.store(remaining - 1, Ordering::SeqCst);
            return Err(Self::unavailable());
        }
        self.inner.multi_remove(keys).await
    }
}

fn fast_config(attempts: u32) -> SessionStoreConfig {
    SessionStoreConfig {
        purge_max_attempts: attempts,
        backoff_base: Duration::from_millis(1),
        backoff_max: Duration::from_millis(4),
    }
}

async fn restart(storage: &SharedStorage) -> SessionState {
    let store = SessionStore::new(storage.clone());
    store.initialize().await
}

#[tokio::test]
async fn rehydration_is_idempotent_for_valid_pairs() {
    let modes = [AppMode::Online, AppMode::Offline];
    let users = [None, Some("alice"), Some(OFFLINE_USER)];

    for mode in modes {
        for user in users {
            let storage = MemoryStorage::new();
            storage.set("appMode", mode.as_str()).await.unwrap();
            if let Some(u) = user {
                storage.set("user", u).await.unwrap();
            }
            let store = SessionStore::new(Arc::new(storage));

            let first = store.initialize().await;
            let second = store.initialize().await;

            assert_eq!(first, second, "mode={mode} user={user:?}");
            assert_eq!(first.mode, mode);
            assert_eq!(first.user.as_deref(), user);
        }
    }
}

#[tokio::test]
async fn first_run_on_file_storage_uses_defaults() {
    let dir = tempdir().unwrap();
    let storage: SharedStorage = Arc::new(FileStorage::new(dir.path().join("app_state.json")));

    let state = restart(&storage).await;
    assert_eq!(state.mode, AppMode::Online);
    assert_eq!(state.user, None);
}

#[tokio::test]
async fn invalid_persisted_mode_defaults_to_online() {
    let storage: SharedStorage =
        Arc::new(MemoryStorage::with_entries([("appMode", "bogus"), ("user", "zoe")]));

    let state = restart(&storage).await;
    assert_eq!(state.mode, AppMode::Online);
    assert_eq!(state.user.as_deref(), Some("zoe"));
}

#[tokio::test]
async fn logout_survives_restart_on_file_storage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("app_state.json");
    let storage: SharedStorage = Arc::new(FileStorage::new(&path));

    let store = SessionStore::new(storage.clone());
    store.initialize().await;
    store.login("alice").unwrap();
    store.flush().await.unwrap();
    assert_eq!(restart(&storage).await.user.as_deref(), Some("alice"));

    store.logout().await.unwrap();
    assert_eq!(store.snapshot().unwrap(), SessionState::logged_out());
    store.shutdown().await.unwrap();

    let reopened: SharedStorage = Arc::new(FileStorage::new(&path));
    let state = restart(&reopened).await;
    assert_eq!(state.mode, AppMode::Offline);
    assert_eq!(state.user, None);
}

#[tokio::test]
async fn writes_scheduled_before_logout_do_not_resurrect_user() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.initialize().await;

    store.login("alice").unwrap();
    store.set_user(Some("mallory".to_string())).unwrap();
    store.set_mode(AppMode::Online).unwrap();
    store.logout().await.unwrap();
    store.flush().await.unwrap();

    assert_eq!(storage.get("user").await.unwrap(), None);
    assert_eq!(restart(&storage).await, SessionState::logged_out());
}

#[tokio::test]
async fn offline_entry_sets_sentinel_regardless_of_prior_state() {
    for prior in ["fresh", "login", "offline_mode", "no_user"] {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(storage.clone());
        store.initialize().await;
        match prior {
            "login" => store.login("alice").unwrap(),
            "offline_mode" => store.set_mode(AppMode::Offline).unwrap(),
            "no_user" => store.set_user(None).unwrap(),
            _ => {}
        }

        store.enter_offline().unwrap();
        assert_eq!(store.mode().unwrap(), AppMode::Offline);
        assert_eq!(store.user().unwrap().as_deref(), Some(OFFLINE_USER));

        store.flush().await.unwrap();
        let state = restart(&storage).await;
        assert_eq!(state.mode, AppMode::Offline);
        assert_eq!(state.user.as_deref(), Some(OFFLINE_USER));
    }
}

#[tokio::test]
async fn write_after_mutate_is_eventually_durable() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.initialize().await;

    store.set_user(Some("bob".to_string())).unwrap();

    let mut delay = Duration::from_millis(1);
    let mut persisted = None;
    for _ in 0..10 {
        persisted = storage.get("user").await.unwrap();
        if persisted.is_some() {
            break;
        }
        tokio::time::sleep(delay).await;
        delay *= 2;
    }
    assert_eq!(persisted.as_deref(), Some("bob"));
}

#[tokio::test]
async fn unreadable_storage_falls_back_to_defaults() {
    let flaky = Arc::new(FlakyStorage::default());
    flaky.inner.set("appMode", "offline").await.unwrap();
    flaky.inner.set("user", "alice").await.unwrap();
    flaky.fail_reads.store(true, Ordering::SeqCst);

    let store = SessionStore::new(flaky.clone());
    let state = store.initialize().await;

    assert_eq!(state, SessionState::default());
    assert!(store.is_initialized());
}

#[tokio::test]
async fn failed_writes_are_absorbed_and_counted() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = SessionStore::new(flaky.clone());
    store.initialize().await;
    flaky.fail_writes.store(true, Ordering::SeqCst);

    store.login("alice").unwrap();
    store.flush().await.unwrap();

    assert_eq!(store.user().unwrap().as_deref(), Some("alice"));
    assert_eq!(store.queue_status().failed_writes, 2);
    assert_eq!(store.queue_status().pending, 0);
}

#[tokio::test]
async fn purge_retries_with_backoff() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = SessionStore::with_config(flaky.clone(), fast_config(4));
    store.initialize().await;
    store.login("alice").unwrap();

    flaky.failing_purges.store(2, Ordering::SeqCst);
    store.logout().await.unwrap();

    assert_eq!(flaky.purge_calls.load(Ordering::SeqCst), 3);
    assert_eq!(flaky.inner.peek("user"), None);
}

#[tokio::test]
async fn partial_logout_failure_is_retried_on_next_start() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = SessionStore::with_config(flaky.clone(), fast_config(2));
    store.initialize().await;
    store.login("alice").unwrap();

    flaky.failing_purges.store(u32::MAX, Ordering::SeqCst);
    flaky.fail_removes.store(true, Ordering::SeqCst);
    let err = store.logout().await.unwrap_err();
    assert!(matches!(err, SessionError::LogoutPartialFailure(_)));
    assert!(err.is_recoverable());

    // Memory is authoritative even though storage still holds the user.
    assert_eq!(store.snapshot().unwrap(), SessionState::logged_out());
    store.shutdown().await.unwrap();
    assert_eq!(flaky.inner.peek("user"), Some("alice".to_string()));
    assert_eq!(flaky.inner.peek("logoutPending"), Some("true".to_string()));

    // Storage recovers; the next start finishes the purge.
    flaky.failing_purges.store(0, Ordering::SeqCst);
    flaky.fail_removes.store(false, Ordering::SeqCst);
    let restarted = SessionStore::new(flaky.clone());
    let state = restarted.initialize().await;
    assert_eq!(state, SessionState::logged_out());

    restarted.flush().await.unwrap();
    assert_eq!(flaky.inner.peek("user"), None);
    assert_eq!(flaky.inner.peek("logoutPending"), None);
    assert_eq!(flaky.inner.peek("appMode"), Some("offline".to_string()));

    let shared: SharedStorage = flaky.clone();
    assert_eq!(restart(&shared).await, SessionState::logged_out());
}

#[tokio::test]
async fn store_is_shareable_across_tasks() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = Arc::new(SessionStore::new(storage.clone()));
    store.initialize().await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.login(format!("user-{i}")) })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    store.flush().await.unwrap();

    // Storage matches whichever login the store applied last.
    let in_memory = store.user().unwrap();
    assert_eq!(storage.get("user").await.unwrap(), in_memory);
}

#[tokio::test]
async fn login_after_failed_logout_survives_restart() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = SessionStore::with_config(flaky.clone(), fast_config(1));
    store.initialize().await;
    store.login("alice").unwrap();

    flaky.failing_purges.store(1, Ordering::SeqCst);
    let err = store.logout().await.unwrap_err();
    assert!(matches!(err, SessionError::LogoutPartialFailure(_)));

    store.login("bob").unwrap();
    store.shutdown().await.unwrap();
    assert_eq!(flaky.inner.peek("logoutPending"), None);

    let shared: SharedStorage = flaky.clone();
    let state = restart(&shared).await;
    assert_eq!(state.mode, AppMode::Online);
    assert_eq!(state.user.as_deref(), Some("bob"));
}

#[tokio::test]
async fn outstanding_purge_finishes_before_next_write() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = SessionStore::with_config(flaky.clone(), fast_config(2));
    store.initialize().await;
    store.login("alice").unwrap();

    // Nothing can be deleted through logout and its trailing mode write.
    flaky.failing_purges.store(u32::MAX, Ordering::SeqCst);
    flaky.fail_removes.store(true, Ordering::SeqCst);
    assert!(store.logout().await.is_err());
    store.flush().await.unwrap();
    assert_eq!(flaky.inner.peek("user"), Some("alice".to_string()));
    assert_eq!(flaky.inner.peek("logoutPending"), Some("true".to_string()));

    // Single-key deletes recover; the next write finishes the purge first.
    flaky.fail_removes.store(false, Ordering::SeqCst);
    store.set_mode(AppMode::Online).unwrap();
    store.flush().await.unwrap();

    assert_eq!(flaky.inner.peek("user"), None);
    assert_eq!(flaky.inner.peek("logoutPending"), None);
    assert_eq!(flaky.inner.peek("appMode"), Some("online".to_string()));

    let shared: SharedStorage = flaky.clone();
    let state = restart(&shared).await;
    assert_eq!(state, store.snapshot().unwrap());
}

#[tokio::test]
async fn logout_after_shutdown_is_rejected_without_clearing() {
    let storage: SharedStorage = Arc::new(MemoryStorage::new());
    let store = SessionStore::new(storage.clone());
    store.initialize().await;
    store.login("erin").unwrap();
    store.shutdown().await.unwrap();

    assert!(matches!(store.logout().await, Err(SessionError::WorkerStopped)));
    assert_eq!(store.user().unwrap().as_deref(), Some("erin"));
    assert_eq!(restart(&storage).await.user.as_deref(), Some("erin"));
}

#[tokio::test]
async fn reinitialize_keeps_changes_made_while_reading() {
    let flaky = Arc::new(FlakyStorage::default());
    let store = Arc::new(SessionStore::new(flaky.clone()));
    store.initialize().await;
    store.login("alice").unwrap();

    flaky.slow_reads.store(true, Ordering::SeqCst);
    let reinit = tokio::spawn({
        let store = store.clone();
        async move { store.initialize().await }
    });

    // Let the second initialize get past its flush and into the slow reads.
    tokio::time::sleep(SLOW_READ / 4).await;
    store.set_user(Some("late".to_string())).unwrap();

    let state = reinit.await.unwrap();
    assert_eq!(state.user.as_deref(), Some("late"));
    assert_eq!(store.user().unwrap().as_deref(), Some("late"));

    flaky.slow_reads.store(false, Ordering::SeqCst);
    store.flush().await.unwrap();
    assert_eq!(flaky.inner.peek("user"), Some("late".to_string()));
}
