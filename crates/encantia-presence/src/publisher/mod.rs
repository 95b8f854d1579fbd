//! Heartbeat publisher.
//!
//! Keeps the signed-in user's presence row fresh by blindly upserting
//! `{user_id, last_seen_at: now}` every interval. Only the owner's key is
//! ever written, so publishers of different users never contend.

mod heartbeat;


pub use heartbeat::{HeartbeatPublisher, PublisherState};
