//! Presence data model and core settings.

use std::time::Duration;

use chrono::{DateTime, Utc};
use hearth_common::{ClientId, ProtocolError};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Timing and buffering knobs for the presence core.
#[derive(Debug, Clone)]
pub struct PresenceSettings {
    /// Advertised to clients in the welcome frame. Not enforced.
    pub heartbeat_interval_hint: Duration,
    /// Entries older than this are evicted on the next sweep.
    pub stale_threshold: Duration,
    /// Reaper period.
    pub sweep_interval: Duration,
    /// Outbound queue depth per connection.
    pub outbound_buffer: usize,
}

impl Default for PresenceSettings {
    fn default() -> Self {
        Self {
            heartbeat_interval_hint: Duration::from_secs(30),
            stale_threshold: Duration::from_secs(75),
            sweep_interval: Duration::from_secs(30),
            outbound_buffer: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// Presence data
// ---------------------------------------------------------------------------

/// Client-supplied presence metadata.
///
/// Always a JSON object. The core never looks inside; an update replaces the
/// whole object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceState(serde_json::Value);

impl PresenceState {
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(ProtocolError::InvalidState(format!(
                "expected a JSON object, got {}",
                json_kind(&value)
            )))
        }
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// One client's tracked state within a channel.
///
/// The channel is implied by the store that owns the entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub client_id: ClientId,
    pub state: PresenceState,
    /// Server-assigned on every accepted track.
    pub last_seen_at: DateTime<Utc>,
}

/// Result of an accepted track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    /// First entry for this client in the channel.
    Joined,
    /// Existing entry refreshed.
    Updated,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_accepts_objects() {
        let state = PresenceState::from_value(json!({"username": "alice"})).unwrap();
        assert_eq!(state.as_value()["username"], "alice");
    }

    #[test]
    fn state_rejects_non_objects() {
        let err = PresenceState::from_value(json!("alice")).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidState(_)));
        assert!(err.to_string().contains("a string"));

        assert!(PresenceState::from_value(json!(null)).is_err());
        assert!(PresenceState::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn state_is_carried_verbatim() {
        let raw = json!({"username": "alice", "nested": {"avatar": "a.png", "n": [1, 2]}});
        let state = PresenceState::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&state).unwrap(), raw);
        assert_eq!(state.into_value(), raw);
    }

    #[test]
    fn default_settings_tolerate_missed_beats() {
        let settings = PresenceSettings::default();
        assert!(settings.stale_threshold >= settings.heartbeat_interval_hint * 2);
    }
}
