//! Accept loop and config wiring.

use std::future::Future;
use std::time::Duration;

use hearth_common::HearthError;
use hearth_config::HearthConfig;
use hearth_presence::{PresenceHub, PresenceSettings};
use tokio::net::TcpListener;

use crate::connection::handle_connection;

/// Transport-level timeouts applied to every connection.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub handshake_timeout: Duration,
    pub send_timeout: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            handshake_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_millis(5000),
        }
    }
}

impl ServerOptions {
    pub fn from_config(config: &HearthConfig) -> Self {
        Self {
            handshake_timeout: Duration::from_secs(config.server.handshake_timeout.into()),
            send_timeout: Duration::from_millis(config.presence.send_timeout_ms.into()),
        }
    }
}

/// Presence core settings from the `[presence]` section.
pub fn settings_from_config(config: &HearthConfig) -> PresenceSettings {
    let presence = &config.presence;
    PresenceSettings {
        heartbeat_interval_hint: Duration::from_secs(presence.heartbeat_interval_hint.into()),
        stale_threshold: Duration::from_secs(presence.stale_threshold.into()),
        sweep_interval: Duration::from_secs(presence.sweep_interval.into()),
        outbound_buffer: presence.outbound_buffer as usize,
    }
}

/// Accept connections until `shutdown` resolves.
///
/// Starts the hub's reaper and stops it on the way out. Connections already
/// accepted keep running until their clients disconnect.
pub async fn serve<F>(
    listener: TcpListener,
    hub: PresenceHub,
    options: ServerOptions,
    shutdown: F,
) -> Result<(), HearthError>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    tracing::info!("hearth-server listening on {}", addr);

    let reaper = hub.spawn_reaper();
    tokio::pin!(shutdown);

    // Accept loop.
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let hub = hub.clone();
                    let options = options.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, peer, hub, options).await;
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }

    reaper.abort();
    tracing::info!(
        channels = hub.channel_count(),
        connections = hub.connection_count(),
        "hearth-server stopped"
    );
    Ok(())
}

/// Resolves on Ctrl-C.
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_presence_section() {
        let mut config = HearthConfig::default();
        config.presence.stale_threshold = 90;
        config.presence.outbound_buffer = 64;

        let settings = settings_from_config(&config);
        assert_eq!(settings.stale_threshold, Duration::from_secs(90));
        assert_eq!(settings.heartbeat_interval_hint, Duration::from_secs(30));
        assert_eq!(settings.sweep_interval, Duration::from_secs(30));
        assert_eq!(settings.outbound_buffer, 64);
    }

    #[test]
    fn options_follow_config() {
        let mut config = HearthConfig::default();
        config.server.handshake_timeout = 3;
        config.presence.send_timeout_ms = 250;

        let options = ServerOptions::from_config(&config);
        assert_eq!(options.handshake_timeout, Duration::from_secs(3));
        assert_eq!(options.send_timeout, Duration::from_millis(250));
    }

    #[test]
    fn default_options_match_default_config() {
        let from_config = ServerOptions::from_config(&HearthConfig::default());
        let defaults = ServerOptions::default();
        assert_eq!(from_config.handshake_timeout, defaults.handshake_timeout);
        assert_eq!(from_config.send_timeout, defaults.send_timeout);
    }
}
