//! Publisher handle and its background heartbeat loop.

use std::sync::Arc;
use std::time::Duration;

use encantia_common::UserId;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace, warn};

use crate::clock::Clock;
use crate::error::{PresenceError, StoreError};
use crate::record::PresenceRecord;
use crate::store::PresenceStore;

/// Lifecycle of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherState {
    Stopped,
    Running,
}

struct RunningHeartbeat {
    user_id: UserId,
    task: JoinHandle<()>,
}

/// Periodically writes the current user's presence row.
///
/// Dropping the publisher aborts the heartbeat task.
pub struct HeartbeatPublisher {
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
    mark_offline_on_stop: bool,
    running: Option<RunningHeartbeat>,
}

impl HeartbeatPublisher {
    pub fn new(store: Arc<dyn PresenceStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            mark_offline_on_stop: false,
            running: None,
        }
    }

    /// Write a signed-out marker on [`stop`](Self::stop).
    pub fn with_offline_marker(mut self, enabled: bool) -> Self {
        self.mark_offline_on_stop = enabled;
        self
    }

    /// Start heartbeating for `user_id`. The first write happens immediately.
    pub fn start(&mut self, user_id: UserId, interval: Duration) -> Result<(), PresenceError> {
        if interval.is_zero() {
            return Err(PresenceError::InvalidInterval);
        }
        if self.is_running() {
            return Err(PresenceError::AlreadyRunning("heartbeat publisher"));
        }

        info!(user_id = %user_id, interval_ms = interval.as_millis() as u64, "Starting heartbeat");
        let task = tokio::spawn(heartbeat_loop(
            Arc::clone(&self.store),
            Arc::clone(&self.clock),
            user_id.clone(),
            interval,
        ));
        self.running = Some(RunningHeartbeat { user_id, task });
        Ok(())
    }

    /// Cancel the heartbeat task and wait for it to finish.
    ///
    /// With the offline marker enabled, one best-effort signed-out write
    /// follows. Its failure is not an error: staleness covers it.
    pub async fn stop(&mut self) {
        let Some(RunningHeartbeat { user_id, task }) = self.running.take() else {
            return;
        };

        task.abort();
        // No new heartbeat starts after this. A request already sent may
        // still reach the server after the marker; staleness covers that.
        let _ = task.await;
        info!(user_id = %user_id, "Heartbeat stopped");

        if self.mark_offline_on_stop {
            let marker = PresenceRecord::signed_out(user_id.clone(), self.clock.now());
            if let Err(e) = self.store.write_own(&marker).await {
                debug!(user_id = %user_id, error = %e, "Offline marker not written");
            }
        }
    }

    pub fn state(&self) -> PublisherState {
        if self.is_running() {
            PublisherState::Running
        } else {
            PublisherState::Stopped
        }
    }

    /// False once stopped or once the loop ended on authorization loss.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// User the publisher was last started for, until `stop`.
    pub fn user_id(&self) -> Option<&UserId> {
        self.running.as_ref().map(|r| &r.user_id)
    }
}

impl Drop for HeartbeatPublisher {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Heartbeat loop
// ---------------------------------------------------------------------------

async fn heartbeat_loop(
    store: Arc<dyn PresenceStore>,
    clock: Arc<dyn Clock>,
    user_id: UserId,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let record = PresenceRecord::heartbeat(user_id.clone(), clock.now());
        match store.write_own(&record).await {
            Ok(()) => trace!(user_id = %user_id, at = %record.last_seen_at, "Heartbeat written"),
            Err(StoreError::Unauthorized(reason)) => {
                info!(
                    user_id = %user_id,
                    reason = %reason,
                    "Heartbeat rejected, identity no longer valid; publisher stopping"
                );
                break;
            }
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Heartbeat write failed, retrying next tick");
            }
        }
    }
}
