//! Write-through persistence queue.
//!
//! Every session mutation becomes a [`PersistTask`] on an unbounded FIFO
//! channel. A single worker task applies them to storage in enqueue order,
//! which gives the store its ordering guarantee: storage always reflects
//! mutations in call order, and a logout purge supersedes every write
//! enqueued before it.
//!
//! A purge that gives up leaves its tombstone behind and stays outstanding.
//! The worker finishes it before applying the next write, so a later login
//! is never discarded by a restart that honors a stale tombstone.
//!
//! ```text
//! set_mode / set_user ──┐
//!                       ├──▶ [ mpsc FIFO ] ──▶ worker ──▶ KeyValueStorage
//! logout (purge) ───────┘                        │
//!                                                └──▶ oneshot reply (purge, flush)
//! ```

use crate::{AppMode, SessionStoreConfig};
use logify_storage::{SharedStorage, StorageKeys, StorageResult};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Value written to the tombstone key while a purge runs.
const TOMBSTONE_VALUE: &str = "true";

/// A unit of persistence work.
#[derive(Debug)]
pub(crate) enum PersistTask {
    WriteMode(AppMode),
    WriteUser(String),
    RemoveUser,
    /// Tombstone, then batch-delete every session key, with retries.
    Purge {
        reply: oneshot::Sender<StorageResult<()>>,
    },
    /// Resolves once every earlier task has been applied.
    Flush { reply: oneshot::Sender<()> },
    /// Resolves after every earlier task, then stops the worker.
    Shutdown { reply: oneshot::Sender<()> },
}

impl PersistTask {
    fn is_write(&self) -> bool {
        matches!(self, Self::WriteMode(_) | Self::WriteUser(_) | Self::RemoveUser)
    }

    fn name(&self) -> &'static str {
        match self {
            Self::WriteMode(_) => "write_mode",
            Self::WriteUser(_) => "write_user",
            Self::RemoveUser => "remove_user",
            Self::Purge { .. } => "purge",
            Self::Flush { .. } => "flush",
            Self::Shutdown { .. } => "shutdown",
        }
    }
}

/// Counters shared between the queue handle and its worker.
#[derive(Debug, Default)]
struct QueueStats {
    pending: AtomicUsize,
    failed_writes: AtomicU64,
    /// Set by the worker before it acknowledges a shutdown.
    stopped: AtomicBool,
}

/// Snapshot of queue counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Tasks enqueued but not yet picked up by the worker.
    pub pending: usize,
    /// Writes or deletes that storage rejected since startup.
    pub failed_writes: u64,
}

/// Handle to the persistence worker.
pub(crate) struct PersistenceQueue {
    sender: mpsc::UnboundedSender<PersistTask>,
    /// Taken by the worker on start.
    receiver: Mutex<Option<mpsc::UnboundedReceiver<PersistTask>>>,
    config: SessionStoreConfig,
    stats: Arc<QueueStats>,
}

impl PersistenceQueue {
    pub(crate) fn new(config: SessionStoreConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(Some(receiver)),
            config,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Spawn the worker. Returns false if it was already started.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(&self, storage: SharedStorage) -> bool {
        let Some(receiver) = self.receiver.lock().take() else {
            return false;
        };

        let config = self.config.clone();
        let stats = self.stats.clone();
        tokio::spawn(run_worker(receiver, storage, config, stats));
        debug!("session persistence worker started");
        true
    }

    /// Enqueue a task. Fails only when the worker has stopped.
    pub(crate) fn enqueue(&self, task: PersistTask) -> Result<(), PersistTask> {
        if self.stats.stopped.load(Ordering::SeqCst) {
            return Err(task);
        }
        self.stats.pending.fetch_add(1, Ordering::SeqCst);
        match self.sender.send(task) {
            Ok(()) => Ok(()),
            Err(mpsc::error::SendError(task)) => {
                self.stats.pending.fetch_sub(1, Ordering::SeqCst);
                Err(task)
            }
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.stats.stopped.load(Ordering::SeqCst) || self.sender.is_closed()
    }

    pub(crate) fn status(&self) -> QueueStatus {
        QueueStatus {
            pending: self.stats.pending.load(Ordering::SeqCst),
            failed_writes: self.stats.failed_writes.load(Ordering::SeqCst),
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<PersistTask>,
    storage: SharedStorage,
    config: SessionStoreConfig,
    stats: Arc<QueueStats>,
) {
    let mut purge_outstanding = false;

    while let Some(task) = receiver.recv().await {
        stats.pending.fetch_sub(1, Ordering::SeqCst);
        let name = task.name();

        if purge_outstanding && task.is_write() {
            purge_outstanding = !finish_purge(&storage).await;
        }

        let stop = apply(task, &storage, &config, &stats, &mut purge_outstanding).await;
        debug!(task = name, "persistence task applied");
        if stop {
            break;
        }
    }

    receiver.close();
    debug!("session persistence worker stopped");
}

/// Apply one task. Returns true when the worker should stop.
async fn apply(
    task: PersistTask,
    storage: &SharedStorage,
    config: &SessionStoreConfig,
    stats: &QueueStats,
    purge_outstanding: &mut bool,
) -> bool {
    match task {
        PersistTask::WriteMode(mode) => {
            if let Err(e) = storage.set(StorageKeys::APP_MODE, mode.as_str()).await {
                stats.failed_writes.fetch_add(1, Ordering::SeqCst);
                warn!(key = StorageKeys::APP_MODE, mode = %mode, error = %e, "Failed to persist app mode");
            }
        }
        PersistTask::WriteUser(user) => {
            if let Err(e) = storage.set(StorageKeys::USER, &user).await {
                stats.failed_writes.fetch_add(1, Ordering::SeqCst);
                warn!(key = StorageKeys::USER, error = %e, "Failed to persist user");
            }
        }
        PersistTask::RemoveUser => {
            if let Err(e) = storage.remove(StorageKeys::USER).await {
                stats.failed_writes.fetch_add(1, Ordering::SeqCst);
                warn!(key = StorageKeys::USER, error = %e, "Failed to remove persisted user");
            }
        }
        PersistTask::Purge { reply } => {
            let result = purge(storage, config).await;
            *purge_outstanding = result.is_err();
            if result.is_err() {
                stats.failed_writes.fetch_add(1, Ordering::SeqCst);
            }
            let _ = reply.send(result);
        }
        PersistTask::Flush { reply } => {
            let _ = reply.send(());
        }
        PersistTask::Shutdown { reply } => {
            stats.stopped.store(true, Ordering::SeqCst);
            let _ = reply.send(());
            return true;
        }
    }
    false
}

/// Write the tombstone, then delete every session key with bounded retries.
///
/// A failed tombstone write does not stop the purge; it only means an
/// unfinished purge will not be resumed on the next start.
pub(crate) async fn purge(storage: &SharedStorage, config: &SessionStoreConfig) -> StorageResult<()> {
    if let Err(e) = storage.set(StorageKeys::LOGOUT_PENDING, TOMBSTONE_VALUE).await {
        warn!(error = %e, "Failed to write logout tombstone");
    }

    let mut failed_attempts = 0u32;
    loop {
        match storage.multi_remove(&StorageKeys::SESSION_KEYS).await {
            Ok(()) => {
                if failed_attempts > 0 {
                    info!(retries = failed_attempts, "Session keys purged after retry");
                }
                return Ok(());
            }
            Err(e) => {
                failed_attempts += 1;
                if failed_attempts >= config.purge_max_attempts {
                    warn!(attempts = failed_attempts, error = %e, "Giving up on session key purge");
                    return Err(e);
                }
                let delay = config.backoff_for(failed_attempts);
                warn!(
                    attempt = failed_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Session key purge failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Single attempt to finish a purge that gave up earlier. Falls back to
/// per-key deletes, tombstone last. Returns true once the stale keys and the
/// tombstone are gone.
async fn finish_purge(storage: &SharedStorage) -> bool {
    if storage.multi_remove(&StorageKeys::SESSION_KEYS).await.is_ok() {
        info!("Outstanding session key purge completed");
        return true;
    }

    for key in [StorageKeys::USER, StorageKeys::APP_MODE, StorageKeys::LOGOUT_PENDING] {
        if let Err(e) = storage.remove(key).await {
            warn!(key, error = %e, "Outstanding purge still failing, tombstone kept");
            return false;
        }
    }
    info!("Outstanding session key purge completed key by key");
    true
}
