//! Environment variable overrides for secrets and endpoints.
//!
//! The hosted front end ships these as `NEXT_PUBLIC_SUPABASE_*`; both the
//! plain and the prefixed names are honoured, plain first.

use crate::schema::EncantiaConfig;

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"];
const ANON_KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"];

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: &mut EncantiaConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply overrides using an arbitrary lookup (testable without touching
/// the process environment).
pub fn apply_overrides_from<F>(config: &mut EncantiaConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let first = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| lookup(*k))
            .find(|v| !v.trim().is_empty())
    };

    if let Some(url) = first(&URL_VARS) {
        tracing::debug!("supabase.url overridden from environment");
        config.supabase.url = url;
    }
    if let Some(key) = first(&ANON_KEY_VARS) {
        tracing::debug!("supabase.anon_key overridden from environment");
        config.supabase.anon_key = key;
    }
}
