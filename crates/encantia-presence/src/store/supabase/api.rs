//! PresenceStore implementation for SupabaseStore plus the profiles listing.

use std::collections::HashMap;

use async_trait::async_trait;
use encantia_common::UserId;
use futures_util::future::try_join_all;
use tracing::debug;

use crate::error::StoreError;
use crate::record::{PresenceRecord, ProfileRow};
use crate::store::PresenceStore;

use super::client::{
    in_filter, parse_presence_rows, parse_profile_rows, SupabaseStore, PRESENCE_COLUMNS,
    PROFILE_COLUMNS, READ_CHUNK_SIZE, UPSERT_PREFER,
};

#[async_trait]
impl PresenceStore for SupabaseStore {
    async fn write_own(&self, record: &PresenceRecord) -> Result<(), StoreError> {
        let url = self.table_url(&self.config.presence_table);
        debug!(user_id = %record.user_id, signed_out = record.signed_out, "Presence upsert");

        let response = self
            .http
            .post(&url)
            .headers(self.auth_headers()?)
            .header("Prefer", UPSERT_PREFER)
            .query(&[("on_conflict", "user_id")])
            .json(record)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        check_status(response).await.map(|_| ())
    }

    async fn read_many(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let chunks = user_ids
            .chunks(READ_CHUNK_SIZE)
            .map(|chunk| self.read_chunk(chunk));
        let mut records = HashMap::with_capacity(user_ids.len());
        for part in try_join_all(chunks).await? {
            records.extend(part);
        }
        Ok(records)
    }
}

impl SupabaseStore {
    async fn read_chunk(
        &self,
        user_ids: &[UserId],
    ) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
        let url = self.table_url(&self.config.presence_table);
        debug!(users = user_ids.len(), "Presence batch read");

        let response = self
            .http
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("select", PRESENCE_COLUMNS.to_string()), ("user_id", in_filter(user_ids))])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let json = check_status(response)
            .await?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        parse_presence_rows(json)
    }

    /// Every profile, ordered by name, for the user listing.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileRow>, StoreError> {
        let url = self.table_url(&self.config.profiles_table);
        debug!("Profiles listing");

        let response = self
            .http
            .get(&url)
            .headers(self.auth_headers()?)
            .query(&[("select", PROFILE_COLUMNS), ("order", "name.asc.nullslast")])
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let json = check_status(response)
            .await?
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::Parse(e.to_string()))?;

        parse_profile_rows(json)
    }
}

/// Map non-2xx responses onto the error taxonomy.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let body = text.chars().take(200).collect::<String>();
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(StoreError::Unauthorized(format!("HTTP {status}: {body}")));
    }
    Err(StoreError::Api {
        status: status.as_u16(),
        body,
    })
}
