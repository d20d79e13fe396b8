//! Tests for the full validation pipeline.

use super::*;
use crate::schema::*;

#[test]
fn default_config_validates() {
    let config = HearthConfig::default();
    assert!(validate(&config).is_ok());
}

#[test]
fn catches_port_zero() {
    let mut config = HearthConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_port_too_large() {
    let mut config = HearthConfig::default();
    config.server.port = 70000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_empty_bind() {
    let mut config = HearthConfig::default();
    config.server.bind = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.bind"));
}

#[test]
fn catches_stale_threshold_not_above_heartbeat() {
    let mut config = HearthConfig::default();
    config.presence.heartbeat_interval_hint = 30;
    config.presence.stale_threshold = 30;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must exceed"));
}

#[test]
fn catches_sync_on_subscribe_disabled() {
    let mut config = HearthConfig::default();
    config.presence.sync_on_subscribe = false;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("sync_on_subscribe"));
}

#[test]
fn catches_tiny_outbound_buffer() {
    let mut config = HearthConfig::default();
    config.presence.outbound_buffer = 1;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("presence.outbound_buffer"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = HearthConfig::default();
    config.server.port = 0;
    config.presence.sweep_interval = 0;
    config.presence.send_timeout_ms = 10;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
    assert!(err.contains("presence.sweep_interval"));
    assert!(err.contains("presence.send_timeout_ms"));
}
