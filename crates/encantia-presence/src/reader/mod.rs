//! Presence reader.
//!
//! Polls presence rows for a watched set of users and derives a
//! read-only online/offline snapshot. A failed poll keeps the previous
//! snapshot.

mod classify;
mod poller;
mod snapshot;


pub use classify::{classify, is_online};
pub use poller::{PresenceReader, ReaderState};
pub use snapshot::{PresenceSnapshot, PresenceStatus};
