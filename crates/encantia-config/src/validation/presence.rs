//! Validation for heartbeat and polling timings.

use tracing::warn;

use crate::schema::EncantiaConfig;

use super::helpers::validate_range;

/// Validate presence timings.
///
/// A threshold at or below the heartbeat interval is an error; one below
/// twice the interval is accepted with a warning since a single late
/// heartbeat will flap the user offline.
pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &EncantiaConfig) {
    let presence = &config.presence;

    validate_range(
        errors,
        "presence.heartbeat_interval",
        presence.heartbeat_interval,
        1,
        300,
    );
    validate_range(
        errors,
        "presence.poll_interval",
        presence.poll_interval,
        1,
        300,
    );
    validate_range(
        errors,
        "presence.liveness_threshold",
        presence.liveness_threshold,
        2,
        3600,
    );

    if presence.liveness_threshold <= presence.heartbeat_interval {
        errors.push(format!(
            "presence.liveness_threshold = {} must be greater than presence.heartbeat_interval = {}",
            presence.liveness_threshold, presence.heartbeat_interval
        ));
    } else if u64::from(presence.liveness_threshold) < 2 * u64::from(presence.heartbeat_interval) {
        warn!(
            threshold = presence.liveness_threshold,
            interval = presence.heartbeat_interval,
            "liveness threshold is below twice the heartbeat interval; a missed tick will flap"
        );
    }
}
