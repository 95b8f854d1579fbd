use std::time::Duration;

use encantia_common::EncantiaError;

/// Failures of the presence store adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend rejected our credentials (signed out, expired token).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid row: {0}")]
    InvalidRow(String),
    #[error("store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Authorization loss ends a heartbeat loop instead of being retried.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Lifecycle and configuration errors of the presence tasks.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error("{0} is already running")]
    AlreadyRunning(&'static str),
    #[error("interval must be greater than zero")]
    InvalidInterval,
    #[error("liveness threshold {threshold:?} must exceed heartbeat interval {interval:?}")]
    InvalidThreshold {
        threshold: Duration,
        interval: Duration,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<StoreError> for EncantiaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Network(msg) => EncantiaError::Network(msg),
            other => EncantiaError::Presence(other.to_string()),
        }
    }
}

impl From<PresenceError> for EncantiaError {
    fn from(err: PresenceError) -> Self {
        match err {
            PresenceError::Store(store) => store.into(),
            other => EncantiaError::Presence(other.to_string()),
        }
    }
}
