//! Supabase store configuration.

use std::fmt;
use std::time::Duration;

/// Connection settings for [`super::SupabaseStore`].
#[derive(Clone)]
pub struct SupabaseStoreConfig {
    /// Project base URL without trailing slash, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Anon key (publishable), sent as `apikey`.
    pub anon_key: String,
    /// Signed-in user's JWT. Row level security keys writes to it.
    pub access_token: Option<String>,
    pub presence_table: String,
    pub profiles_table: String,
    pub request_timeout: Duration,
}

impl fmt::Debug for SupabaseStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseStoreConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("presence_table", &self.presence_table)
            .field("profiles_table", &self.profiles_table)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for SupabaseStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            anon_key: String::new(),
            access_token: None,
            presence_table: "presence".into(),
            profiles_table: "profiles".into(),
            request_timeout: Duration::from_secs(10),
        }
    }
}
