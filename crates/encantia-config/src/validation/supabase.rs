//! Validation for the backend connection section.

use crate::schema::EncantiaConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_supabase(errors: &mut Vec<String>, config: &EncantiaConfig) {
    let supabase = &config.supabase;

    validate_range(
        errors,
        "supabase.request_timeout",
        supabase.request_timeout,
        1,
        120,
    );
    validate_non_empty(errors, "supabase.presence_table", &supabase.presence_table);
    validate_non_empty(errors, "supabase.profiles_table", &supabase.profiles_table);

    let url = supabase.url.trim();
    if !url.is_empty() && !(url.starts_with("https://") || url.starts_with("http://")) {
        errors.push(format!("supabase.url = {url} must start with http:// or https://"));
    }
}
