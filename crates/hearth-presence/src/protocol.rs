//! Wire protocol: JSON text frames tagged by `"type"`.
//!
//! ## Client messages
//! - `subscribe`: start receiving a channel's presence, answered by `sync`
//! - `track`: publish or refresh our own state (doubles as the heartbeat)
//! - `unsubscribe`: leave a channel
//!
//! ## Server messages
//! - `welcome`: assigned client id and the advised heartbeat interval
//! - `sync`: full snapshot, only to the subscribing connection
//! - `join` / `update`: one entry added or refreshed
//! - `leave`: one client gone, identity only
//! - `error`: a rejected client message

use chrono::{DateTime, Utc};
use hearth_common::{ClientId, ProtocolError};
use serde::{Deserialize, Serialize};

use crate::types::{PresenceEntry, PresenceState};

/// Messages a client sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe {
        channel: String,
    },
    Track {
        channel: String,
        state: serde_json::Value,
    },
    Unsubscribe {
        channel: String,
    },
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        client_id: ClientId,
        /// Seconds between tracks the client should aim for.
        heartbeat_interval_hint: u64,
    },
    Sync {
        channel: String,
        entries: Vec<PresenceEntry>,
    },
    Join {
        channel: String,
        client_id: ClientId,
        state: PresenceState,
        last_seen_at: DateTime<Utc>,
    },
    Update {
        channel: String,
        client_id: ClientId,
        state: PresenceState,
        last_seen_at: DateTime<Utc>,
    },
    Leave {
        channel: String,
        client_id: ClientId,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ServerMessage {
    pub fn join(channel: &str, entry: &PresenceEntry) -> Self {
        Self::Join {
            channel: channel.to_string(),
            client_id: entry.client_id.clone(),
            state: entry.state.clone(),
            last_seen_at: entry.last_seen_at,
        }
    }

    pub fn update(channel: &str, entry: &PresenceEntry) -> Self {
        Self::Update {
            channel: channel.to_string(),
            client_id: entry.client_id.clone(),
            state: entry.state.clone(),
            last_seen_at: entry.last_seen_at,
        }
    }

    pub fn leave(channel: &str, client_id: &ClientId) -> Self {
        Self::Leave {
            channel: channel.to_string(),
            client_id: client_id.clone(),
        }
    }

    pub fn error(err: &ProtocolError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    /// Wire name of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::Sync { .. } => "sync",
            Self::Join { .. } => "join",
            Self::Update { .. } => "update",
            Self::Leave { .. } => "leave",
            Self::Error { .. } => "error",
        }
    }
}

/// Parse one inbound text frame.
pub fn parse_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::InvalidMessage(e.to_string()))
}

/// Encode one outbound message as a JSON string.
pub fn encode(message: &ServerMessage) -> Result<String, serde_json::Error> {
    serde_json::to_string(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn parse_subscribe() {
        let msg = parse_client_message(r#"{"type":"subscribe","channel":"fire-1"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                channel: "fire-1".into()
            }
        );
    }

    #[test]
    fn parse_track_keeps_state_verbatim() {
        let msg = parse_client_message(
            r#"{"type":"track","channel":"fire-1","state":{"username":"alice","online_at":"2024-01-01T00:00:00Z"}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::Track { channel, state } => {
                assert_eq!(channel, "fire-1");
                assert_eq!(state["username"], "alice");
                assert_eq!(state["online_at"], "2024-01-01T00:00:00Z");
            }
            other => panic!("expected Track, got {other:?}"),
        }
    }

    #[test]
    fn parse_unsubscribe() {
        let msg = parse_client_message(r#"{"type":"unsubscribe","channel":"fire-1"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unsubscribe { channel } if channel == "fire-1"));
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = parse_client_message(r#"{"type":"shout","channel":"fire-1"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = parse_client_message("not json").unwrap_err();
        assert_eq!(err.code(), "invalid_message");
    }

    #[test]
    fn encode_join_has_flat_fields() {
        let entry = PresenceEntry {
            client_id: ClientId::from("x"),
            state: PresenceState::from_value(json!({"username": "alice"})).unwrap(),
            last_seen_at: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let json: Value =
            serde_json::from_str(&encode(&ServerMessage::join("fire-1", &entry)).unwrap()).unwrap();
        assert_eq!(json["type"], "join");
        assert_eq!(json["channel"], "fire-1");
        assert_eq!(json["client_id"], "x");
        assert_eq!(json["state"]["username"], "alice");
        assert_eq!(json["last_seen_at"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn encode_sync_with_no_entries() {
        let msg = ServerMessage::Sync {
            channel: "fire-1".into(),
            entries: vec![],
        };
        let json: Value = serde_json::from_str(&encode(&msg).unwrap()).unwrap();
        assert_eq!(json["type"], "sync");
        assert_eq!(json["entries"], json!([]));
    }

    #[test]
    fn encode_leave_carries_identity_only() {
        let msg = ServerMessage::leave("fire-1", &ClientId::from("x"));
        let json: Value = serde_json::from_str(&encode(&msg).unwrap()).unwrap();
        assert_eq!(json, json!({"type": "leave", "channel": "fire-1", "client_id": "x"}));
    }

    #[test]
    fn encode_error_uses_protocol_code() {
        let msg = ServerMessage::error(&ProtocolError::NotSubscribed("fire-1".into()));
        let json: Value = serde_json::from_str(&encode(&msg).unwrap()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "not_subscribed");
        assert!(json["message"].as_str().unwrap().contains("fire-1"));
    }

    #[test]
    fn encode_welcome() {
        let msg = ServerMessage::Welcome {
            client_id: ClientId::from("x"),
            heartbeat_interval_hint: 30,
        };
        let json: Value = serde_json::from_str(&encode(&msg).unwrap()).unwrap();
        assert_eq!(json["type"], "welcome");
        assert_eq!(json["heartbeat_interval_hint"], 30);
        assert_eq!(msg.kind(), "welcome");
    }
}
