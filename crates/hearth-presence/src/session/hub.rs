//! The presence hub: shared entry point that hands out sessions.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hearth_common::ClientId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::channel::ChannelRegistry;
use crate::clock::{Clock, SystemClock};
use crate::connection::ConnectionHandle;
use crate::protocol::ServerMessage;
use crate::reaper;
use crate::types::{PresenceEntry, PresenceSettings};

use super::Session;

/// Owns the channel registry and settings. Clone freely; clones share state.
#[derive(Clone)]
pub struct PresenceHub {
    registry: ChannelRegistry,
    settings: Arc<PresenceSettings>,
    connections: Arc<AtomicUsize>,
}

impl PresenceHub {
    pub fn new(settings: PresenceSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: PresenceSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            registry: ChannelRegistry::new(clock),
            settings: Arc::new(settings),
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open a session for a new connection.
    ///
    /// Returns the session and the receiver its transport must drain. The
    /// `welcome` frame is already queued on the receiver.
    pub fn connect(&self) -> (Session, mpsc::Receiver<ServerMessage>) {
        let client_id = ClientId::new();
        let (handle, rx) = ConnectionHandle::new(client_id.clone(), self.settings.outbound_buffer);

        let welcome = ServerMessage::Welcome {
            client_id: client_id.clone(),
            heartbeat_interval_hint: self.settings.heartbeat_interval_hint.as_secs(),
        };
        if let Err(e) = handle.deliver(welcome) {
            warn!(client = %client_id, error = %e, "failed to queue welcome");
        }

        let open = self.connections.fetch_add(1, Ordering::Relaxed) + 1;
        info!(client = %client_id, connections = open, "session opened");

        (Session::new(self.clone(), handle), rx)
    }

    /// Start the background reaper with the configured interval and threshold.
    pub fn spawn_reaper(&self) -> JoinHandle<()> {
        reaper::spawn_reaper(
            self.registry.clone(),
            self.settings.sweep_interval,
            self.settings.stale_threshold,
        )
    }

    /// Run one sweep now. Returns the number of evicted entries.
    pub async fn sweep(&self) -> usize {
        reaper::sweep(&self.registry, self.settings.stale_threshold).await
    }

    /// Current entries of `channel`, ordered by client id.
    pub async fn presence(&self, channel: &str) -> Vec<PresenceEntry> {
        self.registry.snapshot(channel).await
    }

    pub fn channel_count(&self) -> usize {
        self.registry.channel_count()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn settings(&self) -> &PresenceSettings {
        &self.settings
    }

    pub(crate) fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub(crate) fn session_closed(&self) -> usize {
        self.connections.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }
}

impl Default for PresenceHub {
    fn default() -> Self {
        Self::new(PresenceSettings::default())
    }
}

impl std::fmt::Debug for PresenceHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceHub")
            .field("channels", &self.channel_count())
            .field("connections", &self.connection_count())
            .finish()
    }
}
