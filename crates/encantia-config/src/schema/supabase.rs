//! Backend (Supabase) connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where presence and profile rows live.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseConfig {
    /// Full base URL, e.g. `https://xyz.supabase.co`. Wins over `project_ref`.
    pub url: String,
    /// Supabase project reference, used when `url` is empty.
    pub project_ref: String,
    /// Anon key (publishable).
    pub anon_key: String,
    pub presence_table: String,
    pub profiles_table: String,
    /// Per-request timeout in seconds (valid range: 1-120).
    pub request_timeout: u32,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("project_ref", &self.project_ref)
            .field("anon_key", &"[REDACTED]")
            .field("presence_table", &self.presence_table)
            .field("profiles_table", &self.profiles_table)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            project_ref: String::new(),
            anon_key: String::new(),
            presence_table: "presence".into(),
            profiles_table: "profiles".into(),
            request_timeout: 10,
        }
    }
}

impl SupabaseConfig {
    /// Base URL of the project, without a trailing slash.
    /// `None` when neither `url` nor `project_ref` is set.
    pub fn base_url(&self) -> Option<String> {
        let url = self.url.trim();
        if !url.is_empty() {
            return Some(url.trim_end_matches('/').to_string());
        }
        let project_ref = self.project_ref.trim();
        if !project_ref.is_empty() {
            return Some(format!("https://{project_ref}.supabase.co"));
        }
        None
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout))
    }
}
