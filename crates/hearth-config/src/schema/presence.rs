//! Presence timing and delivery configuration.

use serde::{Deserialize, Serialize};

/// Presence core configuration.
///
/// Durations are whole seconds unless the field name says otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// How often clients are told to re-track. Advisory, never enforced.
    pub heartbeat_interval_hint: u32,
    /// Entries not refreshed for this long are evicted by the reaper.
    pub stale_threshold: u32,
    /// Period of the reaper sweep.
    pub sweep_interval: u32,
    /// Upper bound for one socket write before the connection is dropped.
    pub send_timeout_ms: u32,
    /// Per-connection outbound queue depth, in messages.
    pub outbound_buffer: u32,
    /// Send a full snapshot on subscribe. Must stay `true`.
    pub sync_on_subscribe: bool,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_hint: 30,
            stale_threshold: 75,
            sweep_interval: 30,
            send_timeout_ms: 5000,
            outbound_buffer: 256,
            sync_on_subscribe: true,
        }
    }
}
