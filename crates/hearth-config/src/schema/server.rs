//! Listener configuration for the WebSocket server.

use serde::{Deserialize, Serialize};

/// Where and how the server accepts connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface address to bind.
    pub bind: String,
    /// TCP port (valid range: 1-65535).
    pub port: u32,
    /// Seconds allowed for the WebSocket handshake (valid range: 1-60).
    pub handshake_timeout: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            handshake_timeout: 10,
        }
    }
}

impl ServerConfig {
    /// `bind:port` string suitable for `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
