//! Row types exchanged with the presence store.
//!
//! Backend rows are decoded into these structs once, at the store
//! boundary. Everything past the adapter works with typed fields only.

use chrono::{DateTime, Utc};
use encantia_common::UserId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Presence record
// ---------------------------------------------------------------------------

/// One row per user: the last heartbeat that user's client wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub user_id: UserId,
    pub last_seen_at: DateTime<Utc>,
    /// Set by the best-effort write on sign-out.
    #[serde(default)]
    pub signed_out: bool,
}

impl PresenceRecord {
    /// A regular heartbeat at `at`.
    pub fn heartbeat(user_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            last_seen_at: at,
            signed_out: false,
        }
    }

    /// The marker written when a client signs out cleanly.
    pub fn signed_out(user_id: UserId, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            last_seen_at: at,
            signed_out: true,
        }
    }

    pub(crate) fn validate(self) -> Result<Self, StoreError> {
        if self.user_id.is_empty() {
            return Err(StoreError::InvalidRow("presence row without user_id".into()));
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Profile row
// ---------------------------------------------------------------------------

/// A row of the `profiles` table as the user listing needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub user_id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl ProfileRow {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            name: None,
            avatar_url: None,
            role: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Name to show next to the badge; falls back to the user id.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self.user_id.as_str(),
        }
    }

    /// Role with blanks normalised to `None`.
    pub fn role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub(crate) fn validate(self) -> Result<Self, StoreError> {
        if self.user_id.is_empty() {
            return Err(StoreError::InvalidRow("profile row without user_id".into()));
        }
        Ok(self)
    }
}
