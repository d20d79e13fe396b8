//! Channel workers and the registry that owns them.
//!
//! Every live channel is served by exactly one worker task that owns the
//! channel's `PresenceStore` and subscriber set. All subscribe, track,
//! unsubscribe and sweep operations for the channel are commands on that
//! worker's queue, so they apply one at a time in arrival order.

mod registry;
mod worker;


pub use registry::ChannelRegistry;
pub(crate) use worker::ChannelCommand;
