pub mod errors;
pub mod id;

pub use errors::{ConfigError, HearthError, PresenceError, ProtocolError};
pub use id::{new_id, ClientId};
