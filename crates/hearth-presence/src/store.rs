//! Per-channel presence table.
//!
//! Pure data: no I/O, no locking. Each channel worker owns exactly one store,
//! which is what makes every mutation on a channel linearizable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hearth_common::ClientId;
use tracing::debug;

use crate::types::{PresenceEntry, PresenceState};

/// Presence entries for one channel, keyed by client.
#[derive(Debug)]
pub struct PresenceStore {
    channel: String,
    entries: BTreeMap<ClientId, PresenceEntry>,
}

impl PresenceStore {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Insert or replace a client's state, stamping `last_seen_at = now`.
    ///
    /// Returns `true` when the client had no entry (a join).
    pub fn upsert(&mut self, client_id: &ClientId, state: PresenceState, now: DateTime<Utc>) -> bool {
        match self.entries.get_mut(client_id) {
            Some(entry) => {
                entry.state = state;
                entry.last_seen_at = now;
                debug!(channel = %self.channel, client = %client_id, "presence refreshed");
                false
            }
            None => {
                self.entries.insert(
                    client_id.clone(),
                    PresenceEntry {
                        client_id: client_id.clone(),
                        state,
                        last_seen_at: now,
                    },
                );
                debug!(channel = %self.channel, client = %client_id, "presence joined");
                true
            }
        }
    }

    /// Remove a client's entry. Idempotent; returns whether one existed.
    pub fn remove(&mut self, client_id: &ClientId) -> bool {
        let existed = self.entries.remove(client_id).is_some();
        if existed {
            debug!(channel = %self.channel, client = %client_id, "presence removed");
        }
        existed
    }

    pub fn get(&self, client_id: &ClientId) -> Option<&PresenceEntry> {
        self.entries.get(client_id)
    }

    /// All entries, ordered by client id.
    pub fn snapshot(&self) -> Vec<PresenceEntry> {
        self.entries.values().cloned().collect()
    }

    /// Evict every entry last seen strictly before `cutoff`.
    pub fn expire_older_than(&mut self, cutoff: DateTime<Utc>) -> Vec<ClientId> {
        let expired: Vec<ClientId> = self
            .entries
            .values()
            .filter(|entry| entry.last_seen_at < cutoff)
            .map(|entry| entry.client_id.clone())
            .collect();

        for client_id in &expired {
            self.entries.remove(client_id);
            debug!(channel = %self.channel, client = %client_id, "presence expired");
        }

        expired
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
