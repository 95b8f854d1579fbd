//! Supabase store struct, request building, and response parsing.

use std::collections::HashMap;
use std::time::Duration;

use encantia_common::UserId;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::warn;

use crate::error::StoreError;
use crate::record::{PresenceRecord, ProfileRow};

use super::config::SupabaseStoreConfig;

/// Maximum ids per `in.(...)` filter, keeps request URLs well below
/// common proxy limits.
pub const READ_CHUNK_SIZE: usize = 100;

pub(crate) const PRESENCE_COLUMNS: &str = "user_id,last_seen_at,signed_out";
pub(crate) const PROFILE_COLUMNS: &str = "user_id,name,avatar_url,role";
pub(crate) const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Presence store talking to the Supabase REST API.
pub struct SupabaseStore {
    pub(crate) config: SupabaseStoreConfig,
    pub(crate) http: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(config: SupabaseStoreConfig) -> Result<Self, StoreError> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::Config("base_url is empty".into()));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5).min(config.request_timeout))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StoreError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SupabaseStoreConfig {
        &self.config
    }

    /// REST endpoint of a table.
    pub(crate) fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            table
        )
    }

    /// `apikey` plus a bearer token: the user's JWT when signed in,
    /// otherwise the anon key.
    pub(crate) fn auth_headers(&self) -> Result<HeaderMap, StoreError> {
        let bearer = self
            .config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.anon_key);

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.config.anon_key)
                .map_err(|_| StoreError::Config("invalid anon key header".into()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {bearer}"))
                .map_err(|_| StoreError::Config("invalid access token header".into()))?,
        );
        Ok(headers)
    }
}

/// PostgREST `in.(...)` filter with every id double-quoted, so commas and
/// parentheses inside ids cannot break the list.
pub(crate) fn in_filter(user_ids: &[UserId]) -> String {
    let quoted: Vec<String> = user_ids
        .iter()
        .map(|id| {
            let escaped = id.as_str().replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        })
        .collect();
    format!("in.({})", quoted.join(","))
}

/// Decode presence rows. Malformed rows are skipped, a malformed body fails.
pub(crate) fn parse_presence_rows(
    json: serde_json::Value,
) -> Result<HashMap<UserId, PresenceRecord>, StoreError> {
    let rows = match json {
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(StoreError::Parse(format!(
                "expected an array of presence rows, got {}",
                type_name(&other)
            )))
        }
    };

    let mut records = HashMap::with_capacity(rows.len());
    for row in rows {
        let decoded = serde_json::from_value::<PresenceRecord>(row)
            .map_err(|e| StoreError::InvalidRow(e.to_string()))
            .and_then(PresenceRecord::validate);
        match decoded {
            Ok(record) => {
                records.insert(record.user_id.clone(), record);
            }
            Err(e) => warn!(error = %e, "Skipping presence row"),
        }
    }
    Ok(records)
}

/// Decode profile rows. Malformed rows are skipped, a malformed body fails.
pub(crate) fn parse_profile_rows(json: serde_json::Value) -> Result<Vec<ProfileRow>, StoreError> {
    let rows = match json {
        serde_json::Value::Array(rows) => rows,
        other => {
            return Err(StoreError::Parse(format!(
                "expected an array of profile rows, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            match serde_json::from_value::<ProfileRow>(row)
                .map_err(|e| StoreError::InvalidRow(e.to_string()))
                .and_then(ProfileRow::validate)
            {
                Ok(profile) => Some(profile),
                Err(e) => {
                    warn!(error = %e, "Skipping profile row");
                    None
                }
            }
        })
        .collect())
}

fn type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
