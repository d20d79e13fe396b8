use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// A message arrived that the connection's current state does not allow.
///
/// Reported to the offending connection only; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("not subscribed to channel '{0}'")]
    NotSubscribed(String),

    #[error("session is closed")]
    SessionClosed,

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid presence state: {0}")]
    InvalidState(String),
}

impl ProtocolError {
    /// Stable machine-readable code sent in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotSubscribed(_) => "not_subscribed",
            Self::SessionClosed => "session_closed",
            Self::InvalidMessage(_) => "invalid_message",
            Self::InvalidState(_) => "invalid_state",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum HearthError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Presence(#[from] PresenceError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(String),
}
