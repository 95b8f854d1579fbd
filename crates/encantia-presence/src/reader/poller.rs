//! Reader handle and its background poll loop.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use encantia_common::UserId;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{PresenceError, StoreError};
use crate::store::PresenceStore;

use super::classify::classify;
use super::snapshot::PresenceSnapshot;

/// Lifecycle of a reader's poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Stopped,
    Running,
}

/// State shared between the handle and the poll task.
struct ReaderShared {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
    threshold: Duration,
    watched: RwLock<HashSet<UserId>>,
    snapshot_tx: watch::Sender<PresenceSnapshot>,
    /// Start order of polls; taken before the store read.
    next_seq: AtomicU64,
    /// Sequence of the published snapshot. Only touched under the
    /// channel's write lock.
    published_seq: AtomicU64,
}

impl ReaderShared {
    async fn poll(&self, user_ids: &HashSet<UserId>) -> Result<PresenceSnapshot, StoreError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut ids: Vec<UserId> = user_ids.iter().cloned().collect();
        ids.sort();

        let records = if ids.is_empty() {
            HashMap::new()
        } else {
            match self.store.read_many(&ids).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(error = %e, users = ids.len(), "Presence poll failed, keeping previous snapshot");
                    return Err(e);
                }
            }
        };

        let now = self.clock.now();
        let statuses = ids
            .into_iter()
            .map(|id| {
                let status = classify(records.get(&id), now, self.threshold);
                (id, status)
            })
            .collect();

        let mut fresh = PresenceSnapshot::new(statuses, now, 0);
        let mut superseded = None;
        self.snapshot_tx.send_if_modified(|current| {
            // A poll that started later already published.
            if self.published_seq.load(Ordering::SeqCst) > seq {
                superseded = Some(current.clone());
                return false;
            }
            self.published_seq.store(seq, Ordering::SeqCst);
            fresh.generation = current.generation + 1;
            let changed = !current.same_statuses(&fresh);
            *current = fresh.clone();
            changed
        });

        if let Some(current) = superseded {
            debug!(seq, "Presence poll finished after a newer one, result dropped");
            return Ok(current);
        }

        debug!(
            generation = fresh.generation,
            online = fresh.online_count(),
            users = fresh.len(),
            "Presence snapshot updated"
        );
        Ok(fresh)
    }
}

/// Polls presence rows and exposes the derived snapshot.
///
/// Dropping the reader aborts the poll task.
pub struct PresenceReader {
    shared: Arc<ReaderShared>,
    task: Option<JoinHandle<()>>,
}

impl PresenceReader {
    pub fn new(store: Arc<dyn PresenceStore>, clock: Arc<dyn Clock>, threshold: Duration) -> Self {
        let (snapshot_tx, _) = watch::channel(PresenceSnapshot::default());
        Self {
            shared: Arc::new(ReaderShared {
                store,
                clock,
                threshold,
                watched: RwLock::new(HashSet::new()),
                snapshot_tx,
                next_seq: AtomicU64::new(0),
                published_seq: AtomicU64::new(0),
            }),
            task: None,
        }
    }

    /// Poll `user_ids` once with a single batch read.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// returned for the caller to ignore or log. When a poll started later
    /// has already published, this result is dropped and the newer
    /// snapshot is returned.
    pub async fn poll(&self, user_ids: &HashSet<UserId>) -> Result<PresenceSnapshot, StoreError> {
        self.shared.poll(user_ids).await
    }

    /// Poll the currently watched set once.
    pub async fn poll_watched(&self) -> Result<PresenceSnapshot, StoreError> {
        let ids = self.shared.watched.read().await.clone();
        self.shared.poll(&ids).await
    }

    /// Start polling `user_ids` every `poll_interval`, first poll immediately.
    pub async fn start(
        &mut self,
        user_ids: HashSet<UserId>,
        poll_interval: Duration,
    ) -> Result<(), PresenceError> {
        if poll_interval.is_zero() {
            return Err(PresenceError::InvalidInterval);
        }
        if self.is_running() {
            return Err(PresenceError::AlreadyRunning("presence reader"));
        }

        info!(
            users = user_ids.len(),
            interval_ms = poll_interval.as_millis() as u64,
            "Starting presence reader"
        );
        *self.shared.watched.write().await = user_ids;
        self.task = Some(tokio::spawn(poll_loop(
            Arc::clone(&self.shared),
            poll_interval,
        )));
        Ok(())
    }

    /// Replace the watched set; the next poll uses it.
    pub async fn watch_users(&self, user_ids: HashSet<UserId>) {
        *self.shared.watched.write().await = user_ids;
    }

    pub async fn watched(&self) -> HashSet<UserId> {
        self.shared.watched.read().await.clone()
    }

    /// Cancel the poll loop. The last snapshot stays readable.
    pub async fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            info!("Presence reader stopped");
        }
    }

    pub fn state(&self) -> ReaderState {
        if self.is_running() {
            ReaderState::Running
        } else {
            ReaderState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Latest successful snapshot (empty before the first poll).
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receiver notified whenever a poll changes some user's status.
    pub fn subscribe(&self) -> watch::Receiver<PresenceSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    pub fn threshold(&self) -> Duration {
        self.shared.threshold
    }
}

impl Drop for PresenceReader {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Poll loop
// ---------------------------------------------------------------------------

async fn poll_loop(shared: Arc<ReaderShared>, poll_interval: Duration) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let ids = shared.watched.read().await.clone();
        // Failures are logged inside `poll`; the old snapshot stays.
        let _ = shared.poll(&ids).await;
    }
}
