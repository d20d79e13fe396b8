//! Connection handle: the presence core's view of one client's transport.
//!
//! The handle is the sending half of a bounded queue. Whatever owns the
//! receiving half (a WebSocket writer task, or a test) drains it onto the
//! wire. Delivery never waits: a full or closed queue is reported as a
//! transport error and the message is dropped.

use hearth_common::{ClientId, PresenceError};
use tokio::sync::mpsc;

use crate::protocol::ServerMessage;

/// Outbound side of a live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    client_id: ClientId,
    tx: mpsc::Sender<ServerMessage>,
}

impl ConnectionHandle {
    /// Create a handle for `client_id` and the receiver its transport drains.
    pub fn new(client_id: ClientId, buffer: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { client_id, tx }, rx)
    }

    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Queue a message without waiting.
    pub fn deliver(&self, message: ServerMessage) -> Result<(), PresenceError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(msg) => PresenceError::Transport(format!(
                "outbound queue full for {}, dropped {}",
                self.client_id,
                msg.kind()
            )),
            mpsc::error::TrySendError::Closed(msg) => PresenceError::Transport(format!(
                "connection {} closed, dropped {}",
                self.client_id,
                msg.kind()
            )),
        })
    }

    /// Whether the transport side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leave() -> ServerMessage {
        ServerMessage::leave("fire-1", &ClientId::from("x"))
    }

    #[tokio::test]
    async fn deliver_queues_in_order() {
        let (handle, mut rx) = ConnectionHandle::new(ClientId::from("a"), 8);
        handle.deliver(leave()).unwrap();
        handle
            .deliver(ServerMessage::leave("fire-2", &ClientId::from("y")))
            .unwrap();

        assert!(matches!(rx.recv().await, Some(ServerMessage::Leave { channel, .. }) if channel == "fire-1"));
        assert!(matches!(rx.recv().await, Some(ServerMessage::Leave { channel, .. }) if channel == "fire-2"));
    }

    #[test]
    fn deliver_to_full_queue_fails_without_blocking() {
        let (handle, _rx) = ConnectionHandle::new(ClientId::from("a"), 1);
        handle.deliver(leave()).unwrap();

        let err = handle.deliver(leave()).unwrap_err();
        assert!(matches!(err, PresenceError::Transport(_)));
        assert!(err.to_string().contains("queue full"));
    }

    #[test]
    fn deliver_to_closed_connection_fails() {
        let (handle, rx) = ConnectionHandle::new(ClientId::from("a"), 4);
        drop(rx);

        assert!(handle.is_closed());
        let err = handle.deliver(leave()).unwrap_err();
        assert!(err.to_string().contains("closed"));
    }

    #[test]
    fn zero_buffer_is_clamped() {
        let (handle, _rx) = ConnectionHandle::new(ClientId::from("a"), 0);
        assert!(handle.deliver(leave()).is_ok());
    }
}
