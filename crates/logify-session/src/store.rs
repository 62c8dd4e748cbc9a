//! Session store: the single source of truth for the current principal and
//! connectivity mode.
//!
//! # Lifecycle
//!
//! 1. Construct once per process with [`SessionStore::new`] and share it
//!    (usually behind an `Arc`) with everything that needs the session.
//! 2. Await [`SessionStore::initialize`]. It starts the persistence worker and
//!    rehydrates `mode` and `user` from durable storage. Until it completes,
//!    every accessor and mutation returns [`SessionError::NotInitialized`].
//! 3. Mutate with [`set_mode`](SessionStore::set_mode),
//!    [`set_user`](SessionStore::set_user), [`login`](SessionStore::login) and
//!    [`enter_offline`](SessionStore::enter_offline). These update memory
//!    synchronously and enqueue the write-through; they do not wait for it.
//! 4. [`logout`](SessionStore::logout) clears memory and awaits the purge of
//!    all persisted session keys.
//!
//! # Ordering
//!
//! Mutations enqueue their persistence tasks while holding the state lock, so
//! the queue order equals the order in which callers observed the changes.
//! A logout purge therefore always lands after every write scheduled before
//! it, and before every write scheduled after it.

use crate::persistence::{PersistTask, PersistenceQueue, QueueStatus};
use crate::state::normalize_user;
use crate::{AppMode, SessionError, SessionResult, SessionState, SessionStoreConfig, OFFLINE_USER};
use logify_storage::{SharedStorage, StorageKeys, StorageResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, instrument, warn};

/// Session store handle.
pub struct SessionStore {
    storage: SharedStorage,
    queue: PersistenceQueue,
    /// `None` until `initialize` completes.
    state: RwLock<Option<SessionState>>,
    /// Bumped under the state write lock by every accepted change.
    revision: AtomicU64,
    changes: watch::Sender<Option<SessionState>>,
}

impl SessionStore {
    /// Create an uninitialized store over `storage`.
    pub fn new(storage: SharedStorage) -> Self {
        Self::with_config(storage, SessionStoreConfig::default())
    }

    pub fn with_config(storage: SharedStorage, config: SessionStoreConfig) -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            storage,
            queue: PersistenceQueue::new(config),
            state: RwLock::new(None),
            revision: AtomicU64::new(0),
            changes,
        }
    }

    // ========================================================================
    // Startup
    // ========================================================================

    /// Start the persistence worker and rehydrate from durable storage.
    ///
    /// Never fails: unreadable or invalid values fall back to the defaults
    /// (`Online`, no user) and are logged. Calling it again first waits for
    /// pending writes, then re-reads storage. Changes made while that read is
    /// in flight win over what it returns.
    ///
    /// A leftover logout tombstone means an earlier purge did not finish; it
    /// is retried here and the store comes up logged out.
    #[instrument(name = "session_initialize", skip(self))]
    pub async fn initialize(&self) -> SessionState {
        let seen = self.revision.load(Ordering::SeqCst);
        if self.queue.start(self.storage.clone()) {
            debug!("session store starting");
        } else if let Err(e) = self.flush_queue().await {
            warn!(error = %e, "Could not drain pending writes before rehydrating");
        }

        let loaded = self.rehydrate().await;

        let state = {
            let mut guard = self.state.write();
            match guard.clone() {
                Some(current) if self.revision.load(Ordering::SeqCst) != seen => {
                    debug!("Session changed during rehydration, keeping in-memory state");
                    current
                }
                _ => {
                    *guard = Some(loaded.clone());
                    self.changes.send_replace(Some(loaded.clone()));
                    loaded
                }
            }
        };

        info!(mode = %state.mode, has_user = state.user.is_some(), "Session rehydrated");
        state
    }

    async fn rehydrate(&self) -> SessionState {
        match self.storage.get(StorageKeys::LOGOUT_PENDING).await {
            Ok(Some(_)) => return self.resume_purge().await,
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "Failed to read logout tombstone");
            }
        }

        let mode = match self.storage.get(StorageKeys::APP_MODE).await {
            Ok(Some(raw)) => raw.parse::<AppMode>().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring invalid persisted app mode");
                AppMode::Online
            }),
            Ok(None) => AppMode::Online,
            Err(e) => {
                warn!(error = %SessionError::from(e), "Failed to read app mode, using default");
                AppMode::Online
            }
        };

        let user = match self.storage.get(StorageKeys::USER).await {
            Ok(user) => normalize_user(user),
            Err(e) => {
                warn!(error = %SessionError::from(e), "Failed to read user, using default");
                None
            }
        };

        SessionState { mode, user }
    }

    async fn resume_purge(&self) -> SessionState {
        warn!("Found unfinished logout, purging stale session keys");
        match self.schedule_purge() {
            Ok(rx) => match rx.await {
                Ok(Ok(())) => info!("Unfinished logout completed"),
                Ok(Err(e)) => warn!(error = %e, "Stale session keys still present"),
                Err(_) => warn!("Persistence worker stopped during purge"),
            },
            Err(e) => warn!(error = %e, "Could not schedule purge"),
        }
        SessionState::logged_out()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionResult<SessionState> {
        self.state.read().clone().ok_or(SessionError::NotInitialized)
    }

    pub fn mode(&self) -> SessionResult<AppMode> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.mode)
            .ok_or(SessionError::NotInitialized)
    }

    pub fn user(&self) -> SessionResult<Option<String>> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.user.clone())
            .ok_or(SessionError::NotInitialized)
    }

    /// Watch state changes. Yields `None` until the store is initialized.
    pub fn subscribe(&self) -> watch::Receiver<Option<SessionState>> {
        self.changes.subscribe()
    }

    pub fn queue_status(&self) -> QueueStatus {
        self.queue.status()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Set the mode and schedule its write. Last write wins.
    pub fn set_mode(&self, mode: AppMode) -> SessionResult<()> {
        self.mutate("set_mode", |state| {
            let next = SessionState {
                mode,
                user: state.user.clone(),
            };
            (next, vec![PersistTask::WriteMode(mode)])
        })
    }

    /// Set or clear the user and schedule the write or delete.
    pub fn set_user(&self, user: Option<String>) -> SessionResult<()> {
        let user = normalize_user(user);
        self.mutate("set_user", |state| {
            let task = match &user {
                Some(u) => PersistTask::WriteUser(u.clone()),
                None => PersistTask::RemoveUser,
            };
            let next = SessionState {
                mode: state.mode,
                user,
            };
            (next, vec![task])
        })
    }

    /// Online login flow: adopt `user` and switch to `Online`.
    ///
    /// A blank identifier is rejected with [`SessionError::EmptyUser`] and
    /// leaves the session untouched.
    pub fn login(&self, user: impl Into<String>) -> SessionResult<()> {
        let user = user.into();
        if user.trim().is_empty() {
            return Err(SessionError::EmptyUser);
        }
        self.mutate("login", |_| {
            let next = SessionState {
                mode: AppMode::Online,
                user: Some(user.clone()),
            };
            (
                next,
                vec![
                    PersistTask::WriteUser(user),
                    PersistTask::WriteMode(AppMode::Online),
                ],
            )
        })
    }

    /// Offline entry flow: switch to `Offline` with the placeholder user.
    pub fn enter_offline(&self) -> SessionResult<()> {
        self.mutate("enter_offline", |_| {
            let next = SessionState {
                mode: AppMode::Offline,
                user: Some(OFFLINE_USER.to_string()),
            };
            (
                next,
                vec![
                    PersistTask::WriteMode(AppMode::Offline),
                    PersistTask::WriteUser(OFFLINE_USER.to_string()),
                ],
            )
        })
    }

    /// Clear the user, force `Offline`, and purge persisted session keys.
    ///
    /// Memory is cleared once the purge is scheduled and stays cleared even
    /// when the purge fails ([`SessionError::LogoutPartialFailure`]). If the
    /// purge cannot be scheduled at all, memory is left untouched. The
    /// `Offline` mode is written after the purge, so a restart comes up
    /// offline with no user.
    #[instrument(name = "session_logout", skip(self))]
    pub async fn logout(&self) -> SessionResult<()> {
        let purged = {
            let mut guard = self.state.write();
            if guard.is_none() {
                return Err(SessionError::NotInitialized);
            }
            let rx = match self.schedule_purge() {
                Ok(rx) => rx,
                Err(e) => {
                    warn!(error = %e, "Logout could not reach storage");
                    return Err(e);
                }
            };
            let next = SessionState::logged_out();
            *guard = Some(next.clone());
            self.revision.fetch_add(1, Ordering::SeqCst);
            self.changes.send_replace(Some(next));
            rx
        };

        match purged.await {
            Ok(Ok(())) => {
                info!("User logged out, mode reset to offline");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Logout purge failed, in-memory state stays cleared");
                Err(SessionError::LogoutPartialFailure(e))
            }
            Err(_) => Err(SessionError::WorkerStopped),
        }
    }

    // ========================================================================
    // Queue control
    // ========================================================================

    /// Wait until every write scheduled so far has been applied.
    pub async fn flush(&self) -> SessionResult<()> {
        if !self.is_initialized() {
            return Err(SessionError::NotInitialized);
        }
        self.flush_queue().await
    }

    /// Apply pending writes, then stop the worker. Later mutations fail with
    /// [`SessionError::WorkerStopped`]; reads keep working.
    pub async fn shutdown(&self) -> SessionResult<()> {
        if !self.is_initialized() {
            return Err(SessionError::NotInitialized);
        }
        let (reply, rx) = oneshot::channel();
        self.queue
            .enqueue(PersistTask::Shutdown { reply })
            .map_err(|_| SessionError::WorkerStopped)?;
        rx.await.map_err(|_| SessionError::WorkerStopped)?;
        info!("Session store shut down");
        Ok(())
    }

    async fn flush_queue(&self) -> SessionResult<()> {
        let (reply, rx) = oneshot::channel();
        self.queue
            .enqueue(PersistTask::Flush { reply })
            .map_err(|_| SessionError::WorkerStopped)?;
        rx.await.map_err(|_| SessionError::WorkerStopped)
    }

    /// Enqueue the purge followed by the `Offline` mode write.
    fn schedule_purge(&self) -> SessionResult<oneshot::Receiver<StorageResult<()>>> {
        let (reply, rx) = oneshot::channel();
        self.queue
            .enqueue(PersistTask::Purge { reply })
            .map_err(|_| SessionError::WorkerStopped)?;
        self.queue
            .enqueue(PersistTask::WriteMode(AppMode::Offline))
            .map_err(|_| SessionError::WorkerStopped)?;
        Ok(rx)
    }

    /// Compute the next state and its tasks under the write lock. The state
    /// only changes if every task was scheduled.
    fn mutate<F>(&self, op: &'static str, f: F) -> SessionResult<()>
    where
        F: FnOnce(&SessionState) -> (SessionState, Vec<PersistTask>),
    {
        let mut guard = self.state.write();
        let current = guard.as_ref().ok_or(SessionError::NotInitialized)?;
        let (next, tasks) = f(current);

        for task in tasks {
            if self.queue.enqueue(task).is_err() {
                warn!(op, "Persistence worker stopped, mutation rejected");
                return Err(SessionError::WorkerStopped);
            }
        }

        debug!(op, mode = %next.mode, has_user = next.user.is_some(), "Session updated");
        *guard = Some(next.clone());
        self.revision.fetch_add(1, Ordering::SeqCst);
        self.changes.send_replace(Some(next));
        Ok(())
    }
}
