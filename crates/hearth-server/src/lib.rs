//! hearth-server: WebSocket transport for the presence core.
//!
//! Each accepted socket gets one presence session. Text frames are parsed as
//! client messages; presence events queued for the session are written back
//! as JSON text frames.

pub mod connection;
pub mod logging;
pub mod server;

pub use server::{serve, settings_from_config, shutdown_signal, ServerOptions};
