//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Hearth presence server configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[server]
# bind = "0.0.0.0"
# port = 8080               # 1-65535
# handshake_timeout = 10    # seconds, 1-60

[presence]
# Clients are told to re-track this often (seconds). Advisory only.
heartbeat_interval_hint = 30
# Entries silent for longer than this are evicted (seconds).
# Must exceed heartbeat_interval_hint; 2-3x tolerates missed beats.
stale_threshold = 75
# sweep_interval = 30       # reaper period, seconds
# send_timeout_ms = 5000    # per socket write
# outbound_buffer = 256     # queued messages per connection

[logging]
# level = "INFO"            # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
