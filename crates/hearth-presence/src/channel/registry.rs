//! Name -> worker routing table.
//!
//! Commands are pushed onto a worker's unbounded queue while the registry
//! lock is held. A worker deregisters under the same lock only after seeing
//! its queue empty, so a command is never sent to a worker that is exiting.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hearth_common::{ClientId, PresenceError};
use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

use crate::clock::Clock;
use crate::types::PresenceEntry;

use super::worker::{ChannelCommand, ChannelWorker};

struct ChannelSlot {
    tx: mpsc::UnboundedSender<ChannelCommand>,
    generation: u64,
}

struct RegistryInner {
    channels: Mutex<HashMap<String, ChannelSlot>>,
    next_generation: AtomicU64,
    clock: Arc<dyn Clock>,
}

/// Shared table of live channels. Cheap to clone.
#[derive(Clone)]
pub struct ChannelRegistry {
    inner: Arc<RegistryInner>,
}

impl ChannelRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                channels: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(1),
                clock,
            }),
        }
    }

    /// Send a command, starting the channel's worker if it is not running.
    ///
    /// Must be called from within a Tokio runtime.
    pub(crate) fn dispatch(&self, channel: &str, command: ChannelCommand) -> Result<(), PresenceError> {
        let mut channels = self.inner.channels.lock();

        let existing = channels.get(channel).map(|slot| slot.tx.clone());
        let command = match existing {
            Some(tx) => match tx.send(command) {
                Ok(()) => return Ok(()),
                Err(mpsc::error::SendError(returned)) => {
                    // Only reachable if the worker task panicked.
                    error!(channel, "channel worker vanished, restarting it empty");
                    channels.remove(channel);
                    returned
                }
            },
            None => command,
        };

        let slot = self.spawn_worker(channel);
        let sent = slot.tx.send(command);
        channels.insert(channel.to_string(), slot);
        sent.map_err(|_| PresenceError::Internal(format!("worker for '{channel}' refused a command")))
    }

    /// Send a command only if the channel is live. Returns whether it was sent.
    pub(crate) fn dispatch_existing(&self, channel: &str, command: ChannelCommand) -> bool {
        let channels = self.inner.channels.lock();
        match channels.get(channel) {
            Some(slot) => slot.tx.send(command).is_ok(),
            None => false,
        }
    }

    /// Queue a sweep on every live channel.
    pub(crate) fn sweep_all(
        &self,
        stale_threshold: Duration,
    ) -> Vec<(String, oneshot::Receiver<Vec<ClientId>>)> {
        let channels = self.inner.channels.lock();
        let mut pending = Vec::with_capacity(channels.len());

        for (name, slot) in channels.iter() {
            let (reply, rx) = oneshot::channel();
            let command = ChannelCommand::Sweep {
                stale_threshold,
                reply,
            };
            if slot.tx.send(command).is_ok() {
                pending.push((name.clone(), rx));
            }
        }
        pending
    }

    /// Current entries of a channel; empty if the channel does not exist.
    pub async fn snapshot(&self, channel: &str) -> Vec<PresenceEntry> {
        let (reply, rx) = oneshot::channel();
        if !self.dispatch_existing(channel, ChannelCommand::Snapshot { reply }) {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Number of live channels.
    pub fn channel_count(&self) -> usize {
        self.inner.channels.lock().len()
    }

    /// Names of live channels, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.channels.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Called by an idle worker. Returns a queued command if one arrived,
    /// otherwise removes the worker's slot and returns `None`.
    pub(super) fn retire(
        &self,
        channel: &str,
        generation: u64,
        rx: &mut mpsc::UnboundedReceiver<ChannelCommand>,
    ) -> Option<ChannelCommand> {
        let mut channels = self.inner.channels.lock();
        if let Ok(command) = rx.try_recv() {
            return Some(command);
        }
        if channels
            .get(channel)
            .is_some_and(|slot| slot.generation == generation)
        {
            channels.remove(channel);
        }
        None
    }

    fn spawn_worker(&self, channel: &str) -> ChannelSlot {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = ChannelWorker::new(
            channel,
            rx,
            self.clone(),
            Arc::clone(&self.inner.clock),
            generation,
        );
        tokio::spawn(worker.run());
        ChannelSlot { tx, generation }
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.channel_count())
            .finish()
    }
}
