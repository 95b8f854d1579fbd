//! Process-wide presence handle.
//!
//! Owns the store, the heartbeat publisher and the reader. Created once with
//! [`PresenceRuntime::init`] and passed to whoever needs presence.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use encantia_common::UserId;
use tokio::sync::watch;
use tracing::info;

use crate::clock::Clock;
use crate::error::{PresenceError, StoreError};
use crate::publisher::HeartbeatPublisher;
use crate::reader::{PresenceReader, PresenceSnapshot};
use crate::store::PresenceStore;

/// Timing of the presence tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceSettings {
    pub heartbeat_interval: Duration,
    pub liveness_threshold: Duration,
    pub poll_interval: Duration,
    pub mark_offline_on_stop: bool,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(5),
            liveness_threshold: Duration::from_secs(12),
            poll_interval: Duration::from_secs(5),
            mark_offline_on_stop: true,
        }
    }
}

impl PresenceSettings {
    pub fn validate(&self) -> Result<(), PresenceError> {
        if self.heartbeat_interval.is_zero() || self.poll_interval.is_zero() {
            return Err(PresenceError::InvalidInterval);
        }
        if self.liveness_threshold <= self.heartbeat_interval {
            return Err(PresenceError::InvalidThreshold {
                threshold: self.liveness_threshold,
                interval: self.heartbeat_interval,
            });
        }
        Ok(())
    }
}

pub struct PresenceRuntime {
    settings: PresenceSettings,
    store: Arc<dyn PresenceStore>,
    publisher: HeartbeatPublisher,
    reader: PresenceReader,
}

impl PresenceRuntime {
    pub fn init(
        store: Arc<dyn PresenceStore>,
        clock: Arc<dyn Clock>,
        settings: PresenceSettings,
    ) -> Result<Self, PresenceError> {
        settings.validate()?;

        let publisher = HeartbeatPublisher::new(Arc::clone(&store), Arc::clone(&clock))
            .with_offline_marker(settings.mark_offline_on_stop);
        let reader = PresenceReader::new(Arc::clone(&store), clock, settings.liveness_threshold);

        Ok(Self {
            settings,
            store,
            publisher,
            reader,
        })
    }

    pub fn settings(&self) -> &PresenceSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn PresenceStore> {
        &self.store
    }

    /// Begin heartbeating for `user_id`.
    ///
    /// Signing in as a different user first signs the previous one out.
    pub async fn sign_in(&mut self, user_id: UserId) -> Result<(), PresenceError> {
        let current = self.publisher.user_id().cloned();
        match current {
            Some(current) if current == user_id && self.publisher.is_running() => return Ok(()),
            Some(_) => self.publisher.stop().await,
            None => {}
        }
        self.publisher
            .start(user_id, self.settings.heartbeat_interval)
    }

    pub async fn sign_out(&mut self) {
        self.publisher.stop().await;
    }

    pub fn signed_in_user(&self) -> Option<&UserId> {
        self.publisher
            .is_running()
            .then(|| self.publisher.user_id())
            .flatten()
    }

    /// Watch `user_ids`, starting the poll loop on first use, and poll once
    /// right away.
    pub async fn watch(&mut self, user_ids: HashSet<UserId>) -> Result<PresenceSnapshot, PresenceError> {
        if self.reader.is_running() {
            self.reader.watch_users(user_ids).await;
        } else {
            self.reader
                .start(user_ids, self.settings.poll_interval)
                .await?;
        }
        Ok(self.reader.poll_watched().await?)
    }

    /// One poll of the watched set.
    pub async fn poll_now(&self) -> Result<PresenceSnapshot, StoreError> {
        self.reader.poll_watched().await
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        self.reader.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresenceSnapshot> {
        self.reader.subscribe()
    }

    /// Stop both tasks. The publisher goes first so its offline marker is
    /// written before anything else is torn down.
    pub async fn shutdown(&mut self) {
        self.publisher.stop().await;
        self.reader.stop().await;
        info!("Presence runtime shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MonotonicClock;
    use crate::store::MemoryStore;
    use crate::testing::{t0, FlakyStore, SlowStore};

    fn runtime(store: Arc<dyn PresenceStore>) -> PresenceRuntime {
        PresenceRuntime::init(
            store,
            Arc::new(MonotonicClock::starting_at(t0())),
            PresenceSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn settings_require_threshold_above_interval() {
        let settings = PresenceSettings {
            liveness_threshold: Duration::from_secs(5),
            ..PresenceSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PresenceError::InvalidThreshold { .. })
        ));

        let settings = PresenceSettings {
            poll_interval: Duration::ZERO,
            ..PresenceSettings::default()
        };
        assert!(matches!(settings.validate(), Err(PresenceError::InvalidInterval)));
        assert!(PresenceSettings::default().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn signed_in_user_sees_themselves_online() {
        let store = Arc::new(MemoryStore::new());
        let mut rt = runtime(store);
        let alice = UserId::new("alice");

        rt.sign_in(alice.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let snapshot = rt.watch(HashSet::from([alice.clone()])).await.unwrap();
        assert!(snapshot.is_online(&alice));
        assert_eq!(rt.signed_in_user(), Some(&alice));

        rt.shutdown().await;
        assert_eq!(rt.signed_in_user(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_marks_user_offline() {
        let store = Arc::new(MemoryStore::new());
        let mut rt = runtime(store.clone());
        let alice = UserId::new("alice");

        rt.sign_in(alice.clone()).await.unwrap();
        rt.watch(HashSet::from([alice.clone()])).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        rt.sign_out().await;

        assert!(store.get(&alice).await.unwrap().signed_out);
        let snapshot = rt.poll_now().await.unwrap();
        assert!(!snapshot.is_online(&alice));
        rt.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn switching_users_stops_the_previous_heartbeat() {
        let store = Arc::new(FlakyStore::new());
        let mut rt = runtime(store.clone());

        rt.sign_in(UserId::new("alice")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        rt.sign_in(UserId::new("bob")).await.unwrap();
        tokio::time::sleep(Duration::from_secs(20)).await;
        rt.shutdown().await;

        let alice_writes = store
            .written()
            .into_iter()
            .filter(|r| r.user_id.as_str() == "alice")
            .count();
        // One heartbeat plus the offline marker.
        assert_eq!(alice_writes, 2);
        assert_eq!(rt.signed_in_user(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn signing_in_twice_keeps_one_task() {
        let store = Arc::new(FlakyStore::new());
        let mut rt = runtime(store.clone());
        rt.sign_in(UserId::new("alice")).await.unwrap();
        rt.sign_in(UserId::new("alice")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(store.write_attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_updates_the_running_reader() {
        let store = Arc::new(MemoryStore::new());
        let mut rt = runtime(store);

        rt.watch(HashSet::from([UserId::new("alice")])).await.unwrap();
        let snapshot = rt
            .watch(HashSet::from([UserId::new("bob")]))
            .await
            .unwrap();
        assert!(snapshot.status(&UserId::new("bob")).is_some());
        assert!(snapshot.status(&UserId::new("alice")).is_none());
        assert_eq!(rt.snapshot(), snapshot);
    }

    #[tokio::test(start_paused = true)]
    async fn watch_result_survives_a_stalled_background_poll() {
        let store = Arc::new(SlowStore::new("alice", Duration::from_secs(2)));
        let mut rt = runtime(store);

        // Returns at t=2 after the stalled read of alice.
        rt.watch(HashSet::from([UserId::new("alice")])).await.unwrap();
        // The loop tick at t=5 stalls on alice until t=7; switch to bob at t=5.1.
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        let snapshot = rt
            .watch(HashSet::from([UserId::new("bob")]))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rt.snapshot(), snapshot);
        assert!(rt.snapshot().status(&UserId::new("alice")).is_none());
        rt.shutdown().await;
    }
}
