//! Configuration schema types for the presence service.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled with the defaults documented per field.

mod logging;
mod presence;
mod supabase;

pub use logging::*;
pub use presence::*;
pub use supabase::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncantiaConfig {
    pub supabase: SupabaseConfig,
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
