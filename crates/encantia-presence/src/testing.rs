//! Store wrappers for failure injection in unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use encantia_common::UserId;

use crate::error::StoreError;
use crate::record::PresenceRecord;
use crate::store::{MemoryStore, PresenceStore};

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 19, 12, 0, 0).unwrap()
}

pub(crate) fn secs(n: i64) -> chrono::Duration {
    chrono::Duration::seconds(n)
}

/// [`MemoryStore`] with switchable failures and a write log.
#[derive(Default)]
pub(crate) struct FlakyStore {
    pub(crate) inner: MemoryStore,
    fail_reads: AtomicBool,
    unauthorized: AtomicBool,
    /// 1-based write attempts that fail with a network error.
    failing_writes: Mutex<HashSet<usize>>,
    write_attempts: AtomicUsize,
    read_calls: AtomicUsize,
    written: Mutex<Vec<PresenceRecord>>,
}

impl FlakyStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn reject_writes_unauthorized(&self, reject: bool) {
        self.unauthorized.store(reject, Ordering::SeqCst);
    }

    pub(crate) fn fail_write_attempt(&self, attempt: usize) {
        self.failing_writes.lock().unwrap().insert(attempt);
    }

    pub(crate) fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Successful writes, oldest first.
    pub(crate) fn written(&self) -> Vec<PresenceRecord> {
        self.written.lock().unwrap().clone()
    }
}

#[async_trait]
impl PresenceStore for FlakyStore {
    async fn write_own(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        let attempt = self.write_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(StoreError::Unauthorized("HTTP 401 Unauthorized: JWT expired".into()));
        }
        if self.failing_writes.lock().unwrap().contains(&attempt) {
            return Err(StoreError::Network("connection reset".into()));
        }
        self.inner.write_own(record).await?;
        self.written.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn read_many(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Network("timed out".into()));
        }
        self.inner.read_many(user_ids).await
    }
}

/// [`MemoryStore`] whose reads stall whenever one given user is requested.
pub(crate) struct SlowStore {
    pub(crate) inner: MemoryStore,
    slow_user: UserId,
    delay: Duration,
}

impl SlowStore {
    pub(crate) fn new(slow_user: &str, delay: Duration) -> Self {
        Self {
            inner: MemoryStore::new(),
            slow_user: UserId::new(slow_user),
            delay,
        }
    }
}

#[async_trait]
impl PresenceStore for SlowStore {
    async fn write_own(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        self.inner.write_own(record).await
    }

    async fn read_many(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
        if user_ids.contains(&self.slow_user) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.read_many(user_ids).await
    }
}
