//! In-process presence store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use encantia_common::UserId;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::record::PresenceRecord;

use super::PresenceStore;

/// Thread-safe in-memory store. Clones share the same rows.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<UserId, PresenceRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row of one user.
    pub async fn get(&self, user_id: &UserId) -> Option<PresenceRecord> {
        self.records.read().await.get(user_id).cloned()
    }

    /// Number of users that ever wrote a heartbeat.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl PresenceStore for MemoryStore {
    async fn write_own(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        let record = record.clone().validate()?;
        self.records
            .write()
            .await
            .insert(record.user_id.clone(), record);
        Ok(())
    }

    async fn read_many(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| records.get(id).map(|r| (id.clone(), r.clone())))
            .collect())
    }
}
