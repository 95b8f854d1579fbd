//! Presence store backed by Supabase (PostgREST).
//!
//! One row per user in the presence table, upserted with
//! `Prefer: resolution=merge-duplicates` on the `user_id` key. Reads use a
//! single `user_id=in.(...)` filter per chunk of ids.

mod api;
mod client;
mod config;

pub use client::{SupabaseStore, READ_CHUNK_SIZE};
pub use config::SupabaseStoreConfig;
