//! Configuration schema types for Hearth.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod presence;
mod server;
mod system;

pub use presence::*;
pub use server::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for Hearth.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct HearthConfig {
    pub server: ServerConfig,
    pub presence: PresenceConfig,
    pub logging: LoggingConfig,
}
