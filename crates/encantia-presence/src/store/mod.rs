//! Presence store adapter.
//!
//! The publisher and reader only see this narrow interface: an atomic
//! upsert of the caller's own row and a batch read. There is no delete;
//! staleness is inferred from timestamps.

mod memory;
pub mod supabase;

use std::collections::HashMap;

use async_trait::async_trait;
use encantia_common::UserId;

use crate::error::StoreError;
use crate::record::PresenceRecord;

pub use memory::MemoryStore;
pub use supabase::{SupabaseStore, SupabaseStoreConfig};

/// Key-value persistence with one independently writable row per user.
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// Upsert exactly one row keyed by `record.user_id`.
    ///
    /// Blind overwrite: implementations must not read the row first.
    async fn write_own(&self, record: &PresenceRecord) -> Result<(), StoreError>;

    /// Fetch the rows of `user_ids` in as few round trips as possible.
    ///
    /// Users that never wrote a heartbeat are simply missing from the map.
    async fn read_many(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError>;
}
