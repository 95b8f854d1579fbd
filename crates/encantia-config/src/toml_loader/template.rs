//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> &'static str {
    r##"# Encantia presence configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[supabase]
# url = ""                    # full base URL, wins over project_ref
# project_ref = ""            # <ref>.supabase.co
# anon_key = ""               # or set SUPABASE_ANON_KEY
# presence_table = "presence"
# profiles_table = "profiles"
# request_timeout = 10        # 1-120 seconds

[presence]
# enabled = true
# heartbeat_interval = 5      # 1-300 seconds
# liveness_threshold = 12     # must be > heartbeat_interval, ideally >= 2x
# poll_interval = 5           # 1-300 seconds
# mark_offline_on_stop = true

[logging]
# level = "info"              # trace, debug, info, warn, error
"##
}
