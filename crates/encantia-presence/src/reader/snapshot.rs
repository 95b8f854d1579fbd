//! Derived presence snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use encantia_common::UserId;

/// Derived status of one user. Never written back to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceStatus {
    pub online: bool,
    /// `None` when the user never wrote a heartbeat.
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Result of one successful poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub(crate) statuses: HashMap<UserId, PresenceStatus>,
    pub(crate) polled_at: Option<DateTime<Utc>>,
    pub(crate) generation: u64,
}

impl PresenceSnapshot {
    pub(crate) fn new(
        statuses: HashMap<UserId, PresenceStatus>,
        polled_at: DateTime<Utc>,
        generation: u64,
    ) -> Self {
        Self {
            statuses,
            polled_at: Some(polled_at),
            generation,
        }
    }

    /// Unknown users are reported offline.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.statuses.get(user_id).is_some_and(|s| s.online)
    }

    pub fn status(&self, user_id: &UserId) -> Option<&PresenceStatus> {
        self.statuses.get(user_id)
    }

    /// The `user -> online` mapping consumed by page-level UI.
    pub fn online_map(&self) -> HashMap<UserId, bool> {
        self.statuses
            .iter()
            .map(|(id, s)| (id.clone(), s.online))
            .collect()
    }

    /// Online users, sorted.
    pub fn online_users(&self) -> Vec<&UserId> {
        let mut users: Vec<&UserId> = self
            .statuses
            .iter()
            .filter(|(_, s)| s.online)
            .map(|(id, _)| id)
            .collect();
        users.sort();
        users
    }

    pub fn online_count(&self) -> usize {
        self.statuses.values().filter(|s| s.online).count()
    }

    /// Time of the poll that produced this snapshot; `None` before the first.
    pub fn polled_at(&self) -> Option<DateTime<Utc>> {
        self.polled_at
    }

    /// Number of successful polls so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    /// Same per-user statuses, ignoring poll bookkeeping.
    pub(crate) fn same_statuses(&self, other: &Self) -> bool {
        self.statuses == other.statuses
    }
}
