//! Presence timing configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Heartbeat and polling settings.
///
/// `liveness_threshold` must stay strictly above `heartbeat_interval`;
/// at twice the interval or more a single missed tick does not flap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    pub enabled: bool,
    /// Seconds between heartbeat writes (valid range: 1-300).
    pub heartbeat_interval: u32,
    /// Maximum heartbeat age in seconds before a user counts as offline.
    pub liveness_threshold: u32,
    /// Seconds between reader polls (valid range: 1-300).
    pub poll_interval: u32,
    /// Write a signed-out marker when the publisher stops.
    pub mark_offline_on_stop: bool,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            heartbeat_interval: 5,
            liveness_threshold: 12,
            poll_interval: 5,
            mark_offline_on_stop: true,
        }
    }
}

impl PresenceConfig {
    pub fn heartbeat_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.heartbeat_interval))
    }

    pub fn threshold_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.liveness_threshold))
    }

    pub fn poll_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_interval))
    }
}
