//! Presence service configuration.
//!
//! Provides TOML-based configuration with environment overrides and full
//! validation. All config sections use defaults so partial configs work
//! out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use encantia_config::{config_to_json, load_config};
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod env;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    EncantiaConfig, LogLevel, LoggingConfig, PresenceConfig, SupabaseConfig,
    CONFIG_SCHEMA_VERSION,
};

use std::path::Path;

use encantia_common::ConfigError;

/// Load, override and validate the config.
///
/// With `path` the file must exist; without it the platform default is
/// used and created from the template when missing.
pub fn load_config(path: Option<&Path>) -> Result<EncantiaConfig, ConfigError> {
    let mut config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };

    env::apply_env_overrides(&mut config);
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string with secrets redacted.
pub fn config_to_json(config: &EncantiaConfig) -> String {
    let mut redacted = config.clone();
    if !redacted.supabase.anon_key.is_empty() {
        redacted.supabase.anon_key = "[REDACTED]".into();
    }
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
