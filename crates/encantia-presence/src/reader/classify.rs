//! Liveness classification.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::to_chrono;
use crate::record::PresenceRecord;

use super::snapshot::PresenceStatus;

/// Online iff a record exists, is not a sign-out marker, and
/// `now - last_seen_at < threshold`.
///
/// Timestamps slightly ahead of `now` (writer clock skew) count as fresh.
pub fn is_online(record: Option<&PresenceRecord>, now: DateTime<Utc>, threshold: Duration) -> bool {
    match record {
        Some(record) if !record.signed_out => now - record.last_seen_at < to_chrono(threshold),
        _ => false,
    }
}

/// Full status of one user, absent records included.
pub fn classify(
    record: Option<&PresenceRecord>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> PresenceStatus {
    PresenceStatus {
        online: is_online(record, now, threshold),
        last_seen_at: record.map(|r| r.last_seen_at),
    }
}
