//! Session manager: one `Session` per live connection.
//!
//! A session routes a connection's subscribe, track and unsubscribe messages
//! to the owning channel workers and remembers which channels it holds, so
//! closing (or dropping) it can leave all of them at once.

mod hub;


pub use hub::PresenceHub;

use std::collections::BTreeSet;

use hearth_common::{ClientId, PresenceError, ProtocolError};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::channel::ChannelCommand;
use crate::connection::ConnectionHandle;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::types::{PresenceState, TrackOutcome};

/// Lifecycle of a connection as seen by the presence core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Open, holding no channels.
    Connected,
    /// Holding at least one channel.
    Subscribed,
    /// Terminal. Every further message is rejected.
    Closed,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session {
    hub: PresenceHub,
    handle: ConnectionHandle,
    channels: BTreeSet<String>,
    closed: bool,
}

impl Session {
    fn new(hub: PresenceHub, handle: ConnectionHandle) -> Self {
        Self {
            hub,
            handle,
            channels: BTreeSet::new(),
            closed: false,
        }
    }

    pub fn client_id(&self) -> &ClientId {
        self.handle.client_id()
    }

    pub fn state(&self) -> SessionState {
        if self.closed {
            SessionState::Closed
        } else if self.channels.is_empty() {
            SessionState::Connected
        } else {
            SessionState::Subscribed
        }
    }

    /// Channels currently held, in name order.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    /// Route one parsed client message.
    pub async fn handle_message(&mut self, message: ClientMessage) -> Result<(), PresenceError> {
        match message {
            ClientMessage::Subscribe { channel } => self.subscribe(&channel).await.map(drop),
            ClientMessage::Track { channel, state } => self.track(&channel, state).await.map(drop),
            ClientMessage::Unsubscribe { channel } => self.unsubscribe(&channel).await.map(drop),
        }
    }

    /// Subscribe to `channel`, creating it if needed. A `sync` frame is queued
    /// to this connection every time, including on a repeated subscribe.
    ///
    /// Returns the number of entries in the snapshot.
    pub async fn subscribe(&mut self, channel: &str) -> Result<usize, PresenceError> {
        self.ensure_open()?;
        if channel.is_empty() {
            return Err(ProtocolError::InvalidMessage("channel name must not be empty".into()).into());
        }

        let (reply, rx) = oneshot::channel();
        self.hub.registry().dispatch(
            channel,
            ChannelCommand::Subscribe {
                handle: self.handle.clone(),
                reply,
            },
        )?;
        // Recorded before waiting so a cancelled subscribe is still undone by close().
        let first = self.channels.insert(channel.to_string());
        let count = await_reply(channel, rx).await?;

        if first {
            info!(client = %self.client_id(), channel, entries = count, "subscribed");
        }
        Ok(count)
    }

    /// Publish or refresh this client's state in `channel`.
    pub async fn track(
        &mut self,
        channel: &str,
        state: serde_json::Value,
    ) -> Result<TrackOutcome, PresenceError> {
        self.ensure_open()?;
        self.ensure_subscribed(channel)?;
        let state = PresenceState::from_value(state)?;

        let (reply, rx) = oneshot::channel();
        self.hub.registry().dispatch(
            channel,
            ChannelCommand::Track {
                client_id: self.client_id().clone(),
                state,
                reply,
            },
        )?;
        await_reply(channel, rx).await?
    }

    /// Leave `channel`. Returns whether this client had an entry there.
    pub async fn unsubscribe(&mut self, channel: &str) -> Result<bool, PresenceError> {
        self.ensure_open()?;
        self.ensure_subscribed(channel)?;
        self.channels.remove(channel);

        let (reply, rx) = oneshot::channel();
        self.hub.registry().dispatch(
            channel,
            ChannelCommand::Unsubscribe {
                client_id: self.client_id().clone(),
                reply: Some(reply),
            },
        )?;
        let existed = await_reply(channel, rx).await?;

        info!(client = %self.client_id(), channel, had_entry = existed, "unsubscribed");
        Ok(existed)
    }

    /// Queue an `error` frame for a rejected message.
    pub fn report(&self, err: &ProtocolError) {
        debug!(client = %self.client_id(), code = err.code(), error = %err, "rejecting client message");
        if let Err(e) = self.handle.deliver(ServerMessage::error(err)) {
            debug!(client = %self.client_id(), error = %e, "could not deliver error frame");
        }
    }

    /// Leave every held channel and mark the session closed.
    ///
    /// Does not wait: the disconnects are queued on each channel worker before
    /// this returns. Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        for channel in std::mem::take(&mut self.channels) {
            let queued = self.hub.registry().dispatch_existing(
                &channel,
                ChannelCommand::Unsubscribe {
                    client_id: self.client_id().clone(),
                    reply: None,
                },
            );
            if !queued {
                warn!(client = %self.client_id(), channel = %channel, "channel gone before disconnect");
            }
        }

        let open = self.hub.session_closed();
        info!(client = %self.client_id(), connections = open, "session closed");
    }

    fn ensure_open(&self) -> Result<(), ProtocolError> {
        if self.closed {
            Err(ProtocolError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn ensure_subscribed(&self, channel: &str) -> Result<(), ProtocolError> {
        if self.channels.contains(channel) {
            Ok(())
        } else {
            Err(ProtocolError::NotSubscribed(channel.to_string()))
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("client_id", self.client_id())
            .field("state", &self.state())
            .field("channels", &self.channels)
            .finish()
    }
}

async fn await_reply<T>(channel: &str, rx: oneshot::Receiver<T>) -> Result<T, PresenceError> {
    rx.await.map_err(|_| {
        error!(channel, "channel worker dropped a reply");
        PresenceError::Internal(format!("no reply from channel '{channel}'"))
    })
}
