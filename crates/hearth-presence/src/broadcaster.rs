//! Event fan-out to a channel's subscribers.
//!
//! Best-effort: each subscriber is tried once, failures are logged and
//! skipped. A failed send never undoes the store mutation that caused it.

use hearth_common::PresenceError;
use tracing::{debug, warn};

use crate::connection::ConnectionHandle;
use crate::protocol::ServerMessage;
use crate::store::PresenceStore;

/// Send `message` to every subscriber.
pub fn fan_out<'a, I>(channel: &str, subscribers: I, message: &ServerMessage)
where
    I: IntoIterator<Item = &'a ConnectionHandle>,
{
    let mut delivered = 0usize;
    let mut failed = 0usize;

    for handle in subscribers {
        match handle.deliver(message.clone()) {
            Ok(()) => delivered += 1,
            Err(e) => {
                log_failure(channel, handle, &e);
                failed += 1;
            }
        }
    }

    debug!(
        channel,
        kind = message.kind(),
        delivered,
        failed,
        "presence event fanned out"
    );
}

/// Send the channel's full snapshot to one connection.
///
/// Returns the number of entries in the snapshot.
pub fn send_sync(store: &PresenceStore, handle: &ConnectionHandle) -> usize {
    let entries = store.snapshot();
    let count = entries.len();
    let message = ServerMessage::Sync {
        channel: store.channel().to_string(),
        entries,
    };

    if let Err(e) = handle.deliver(message) {
        log_failure(store.channel(), handle, &e);
    }
    count
}

fn log_failure(channel: &str, handle: &ConnectionHandle, err: &PresenceError) {
    if handle.is_closed() {
        // Normal during teardown: the disconnect is already queued.
        debug!(channel, client = %handle.client_id(), error = %err, "delivery skipped");
    } else {
        warn!(channel, client = %handle.client_id(), error = %err, "delivery failed");
    }
}
