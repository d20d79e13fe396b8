//! Validation for the server listener and presence timings.

use crate::schema::HearthConfig;

use super::helpers::validate_range;

/// Validate listener constraints.
pub(crate) fn validate_server(errors: &mut Vec<String>, config: &HearthConfig) {
    if config.server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
    validate_range(errors, "server.port", config.server.port, 1, 65535);
    validate_range(
        errors,
        "server.handshake_timeout",
        config.server.handshake_timeout,
        1,
        60,
    );
}

/// Validate presence timing constraints.
pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &HearthConfig) {
    let presence = &config.presence;

    validate_range(
        errors,
        "presence.heartbeat_interval_hint",
        presence.heartbeat_interval_hint,
        1,
        3600,
    );
    validate_range(
        errors,
        "presence.stale_threshold",
        presence.stale_threshold,
        2,
        86400,
    );
    validate_range(
        errors,
        "presence.sweep_interval",
        presence.sweep_interval,
        1,
        3600,
    );
    validate_range(
        errors,
        "presence.send_timeout_ms",
        presence.send_timeout_ms,
        100,
        60000,
    );
    validate_range(
        errors,
        "presence.outbound_buffer",
        presence.outbound_buffer,
        8,
        65536,
    );

    // A client that beats on time must never look stale.
    if presence.stale_threshold <= presence.heartbeat_interval_hint {
        errors.push(format!(
            "presence.stale_threshold = {} must exceed presence.heartbeat_interval_hint = {}",
            presence.stale_threshold, presence.heartbeat_interval_hint
        ));
    }

    if !presence.sync_on_subscribe {
        errors.push("presence.sync_on_subscribe cannot be disabled".into());
    }
}
