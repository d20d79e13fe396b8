//! The single writer for one channel.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use hearth_common::{ClientId, PresenceError, ProtocolError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::broadcaster::{fan_out, send_sync};
use crate::clock::{to_time_delta, Clock};
use crate::connection::ConnectionHandle;
use crate::protocol::ServerMessage;
use crate::store::PresenceStore;
use crate::types::{PresenceEntry, PresenceState, TrackOutcome};

use super::registry::ChannelRegistry;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Operations submitted to a channel worker.
#[derive(Debug)]
pub(crate) enum ChannelCommand {
    /// Register a subscriber and send it a `sync`. Replies with the entry count.
    Subscribe {
        handle: ConnectionHandle,
        reply: oneshot::Sender<usize>,
    },
    /// Upsert a subscriber's state and broadcast `join` or `update`.
    Track {
        client_id: ClientId,
        state: PresenceState,
        reply: oneshot::Sender<Result<TrackOutcome, PresenceError>>,
    },
    /// Drop a subscriber and its entry, broadcasting `leave` if it had one.
    /// Replies with whether an entry existed. Disconnects send no reply.
    Unsubscribe {
        client_id: ClientId,
        reply: Option<oneshot::Sender<bool>>,
    },
    /// Evict entries not refreshed within `stale_threshold`.
    Sweep {
        stale_threshold: Duration,
        reply: oneshot::Sender<Vec<ClientId>>,
    },
    /// Read the current entries.
    Snapshot {
        reply: oneshot::Sender<Vec<PresenceEntry>>,
    },
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

pub(crate) struct ChannelWorker {
    store: PresenceStore,
    subscribers: HashMap<ClientId, ConnectionHandle>,
    rx: mpsc::UnboundedReceiver<ChannelCommand>,
    registry: ChannelRegistry,
    clock: Arc<dyn Clock>,
    generation: u64,
}

impl ChannelWorker {
    pub(crate) fn new(
        channel: &str,
        rx: mpsc::UnboundedReceiver<ChannelCommand>,
        registry: ChannelRegistry,
        clock: Arc<dyn Clock>,
        generation: u64,
    ) -> Self {
        Self {
            store: PresenceStore::new(channel),
            subscribers: HashMap::new(),
            rx,
            registry,
            clock,
            generation,
        }
    }

    /// Process commands until the channel has no entries and no subscribers.
    pub(crate) async fn run(mut self) {
        info!(channel = %self.store.channel(), "channel opened");

        while let Some(command) = self.rx.recv().await {
            self.handle(command);
            if self.is_idle() && self.retire() {
                break;
            }
        }

        info!(channel = %self.store.channel(), "channel closed");
    }

    fn is_idle(&self) -> bool {
        self.store.is_empty() && self.subscribers.is_empty()
    }

    /// Deregister from the registry unless more work is already queued.
    ///
    /// Returns `true` once deregistered. The registry lock is held across the
    /// queue check, so no command can slip in between.
    fn retire(&mut self) -> bool {
        loop {
            let channel = self.store.channel().to_string();
            match self.registry.retire(&channel, self.generation, &mut self.rx) {
                None => return true,
                Some(command) => {
                    self.handle(command);
                    if !self.is_idle() {
                        return false;
                    }
                }
            }
        }
    }

    fn handle(&mut self, command: ChannelCommand) {
        match command {
            ChannelCommand::Subscribe { handle, reply } => {
                let count = self.subscribe(handle);
                let _ = reply.send(count);
            }
            ChannelCommand::Track {
                client_id,
                state,
                reply,
            } => {
                let outcome = self.track(&client_id, state);
                let _ = reply.send(outcome);
            }
            ChannelCommand::Unsubscribe { client_id, reply } => {
                let existed = self.unsubscribe(&client_id);
                if let Some(reply) = reply {
                    let _ = reply.send(existed);
                }
            }
            ChannelCommand::Sweep {
                stale_threshold,
                reply,
            } => {
                let evicted = self.sweep(stale_threshold);
                let _ = reply.send(evicted);
            }
            ChannelCommand::Snapshot { reply } => {
                let _ = reply.send(self.store.snapshot());
            }
        }
    }

    fn subscribe(&mut self, handle: ConnectionHandle) -> usize {
        let client_id = handle.client_id().clone();
        let count = send_sync(&self.store, &handle);
        if self.subscribers.insert(client_id.clone(), handle).is_some() {
            debug!(channel = %self.store.channel(), client = %client_id, "re-subscribed, sync re-sent");
        } else {
            debug!(
                channel = %self.store.channel(),
                client = %client_id,
                subscribers = self.subscribers.len(),
                "subscribed"
            );
        }
        count
    }

    fn track(
        &mut self,
        client_id: &ClientId,
        state: PresenceState,
    ) -> Result<TrackOutcome, PresenceError> {
        if !self.subscribers.contains_key(client_id) {
            return Err(ProtocolError::NotSubscribed(self.store.channel().to_string()).into());
        }

        let now = self.clock.now();
        let joined = self.store.upsert(client_id, state, now);
        let Some(entry) = self.store.get(client_id) else {
            error!(channel = %self.store.channel(), client = %client_id, "entry missing right after upsert");
            return Err(PresenceError::Internal(format!(
                "entry for {client_id} missing after upsert in '{}'",
                self.store.channel()
            )));
        };

        let channel = self.store.channel();
        let (message, outcome) = if joined {
            (ServerMessage::join(channel, entry), TrackOutcome::Joined)
        } else {
            (ServerMessage::update(channel, entry), TrackOutcome::Updated)
        };
        fan_out(channel, self.subscribers.values(), &message);
        Ok(outcome)
    }

    fn unsubscribe(&mut self, client_id: &ClientId) -> bool {
        let existed = self.store.remove(client_id);
        self.subscribers.remove(client_id);

        let channel = self.store.channel();
        if existed {
            fan_out(
                channel,
                self.subscribers.values(),
                &ServerMessage::leave(channel, client_id),
            );
        }
        debug!(channel, client = %client_id, had_entry = existed, "unsubscribed");
        existed
    }

    fn sweep(&mut self, stale_threshold: Duration) -> Vec<ClientId> {
        let cutoff = self.clock.now() - to_time_delta(stale_threshold);
        let evicted = self.store.expire_older_than(cutoff);

        let channel = self.store.channel();
        for client_id in &evicted {
            info!(channel, client = %client_id, "evicting stale presence");
            fan_out(
                channel,
                self.subscribers.values(),
                &ServerMessage::leave(channel, client_id),
            );
        }
        evicted
    }
}
