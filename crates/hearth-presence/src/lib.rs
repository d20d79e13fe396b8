//! Presence coordination for hearth campfires.
//!
//! Tracks which clients are present in each named channel, fans
//! `sync`/`join`/`update`/`leave` events out to subscribers, and evicts
//! clients whose heartbeat (a repeated `track`) has lapsed.
//!
//! Each channel is owned by a single worker task; connections talk to it
//! through a [`Session`] handed out by the [`PresenceHub`].

pub mod broadcaster;
pub mod channel;
pub mod clock;
pub mod connection;
pub mod protocol;
pub mod reaper;
pub mod session;
pub mod store;
pub mod types;

pub use channel::ChannelRegistry;
pub use clock::{Clock, ManualClock, SystemClock};
pub use connection::ConnectionHandle;
pub use protocol::{encode, parse_client_message, ClientMessage, ServerMessage};
pub use session::{PresenceHub, Session, SessionState};
pub use store::PresenceStore;
pub use types::{PresenceEntry, PresenceSettings, PresenceState, TrackOutcome};
