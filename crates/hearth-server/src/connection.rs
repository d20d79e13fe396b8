//! Per-connection handler: handshake, open a session, then pump frames.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{Sink, SinkExt, StreamExt};
use hearth_common::{HearthError, PresenceError, ProtocolError};
use hearth_presence::{encode, parse_client_message, PresenceHub, ServerMessage, Session};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use crate::server::ServerOptions;

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

/// Handle a single TCP connection until either side closes it.
pub async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    hub: PresenceHub,
    options: ServerOptions,
) {
    let ws = match tokio::time::timeout(options.handshake_timeout, accept_async(stream)).await {
        Ok(Ok(ws)) => ws,
        Ok(Err(e)) => {
            tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
            return;
        }
        Err(_) => {
            tracing::warn!(
                peer = %peer,
                timeout_secs = options.handshake_timeout.as_secs(),
                "WS handshake timed out"
            );
            return;
        }
    };

    let (mut sink, mut stream) = ws.split();
    let (mut session, mut outbound) = hub.connect();

    tracing::info!(peer = %peer, client = %session.client_id(), "Client connected");

    loop {
        tokio::select! {
            // Presence events queued for this client -> WebSocket
            Some(message) = outbound.recv() => {
                if let Err(e) = send_message(&mut sink, &message, options.send_timeout).await {
                    tracing::debug!(peer = %peer, error = %e, "Dropping connection after failed write");
                    break;
                }
            }

            // Frames from the client -> presence core
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&mut session, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        session.report(&ProtocolError::InvalidMessage(
                            "binary frames are not supported".into(),
                        ));
                    }
                    Some(Ok(Message::Ping(data))) => {
                        // Transport keep-alive only; presence liveness is the track heartbeat.
                        if let Err(e) = send_frame(&mut sink, Message::Pong(data), options.send_timeout).await {
                            tracing::debug!(peer = %peer, error = %e, "Dropping connection after failed pong");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %peer, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    tracing::info!(peer = %peer, client = %session.client_id(), "Client disconnected");
    session.close();
}

/// Parse one text frame and apply it, reporting protocol errors back to the client.
async fn handle_text(session: &mut Session, text: &str) {
    let result = match parse_client_message(text) {
        Ok(message) => session.handle_message(message).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => {}
        Err(PresenceError::Protocol(e)) => session.report(&e),
        Err(e) => {
            tracing::error!(client = %session.client_id(), error = %e, "Presence operation failed");
        }
    }
}

/// Write one server message as a JSON text frame, bounded by `send_timeout`.
async fn send_message(
    sink: &mut WsSink,
    message: &ServerMessage,
    send_timeout: Duration,
) -> Result<(), HearthError> {
    let json = match encode(message) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(kind = message.kind(), error = %e, "Failed to encode server message");
            return Ok(());
        }
    };

    send_frame(sink, Message::Text(json.into()), send_timeout).await
}

/// Write one frame, giving up after `send_timeout`.
async fn send_frame<S>(sink: &mut S, frame: Message, send_timeout: Duration) -> Result<(), HearthError>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match tokio::time::timeout(send_timeout, sink.send(frame)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(HearthError::Network(e.to_string())),
        Err(_) => {
            tracing::warn!(
                timeout_ms = send_timeout.as_millis() as u64,
                "Socket write timed out"
            );
            Err(HearthError::Network("socket write timed out".into()))
        }
    }
}
