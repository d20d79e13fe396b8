//! Heartbeat reaper: periodically evicts entries whose owners stopped tracking.
//!
//! The reaper never touches a store itself. It queues a sweep on every live
//! channel's worker, so eviction is ordered against tracks like any other
//! command and a client evicted once is never evicted again.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::channel::ChannelRegistry;

/// Run one sweep over every live channel. Returns the number of evictions.
pub async fn sweep(registry: &ChannelRegistry, stale_threshold: Duration) -> usize {
    let mut evicted = 0;

    for (channel, reply) in registry.sweep_all(stale_threshold) {
        match reply.await {
            Ok(clients) => evicted += clients.len(),
            Err(_) => warn!(channel = %channel, "channel worker dropped a sweep"),
        }
    }
    evicted
}

/// Spawn the periodic reaper. Abort the returned handle to stop it.
pub fn spawn_reaper(
    registry: ChannelRegistry,
    sweep_interval: Duration,
    stale_threshold: Duration,
) -> JoinHandle<()> {
    info!(
        interval_secs = sweep_interval.as_secs(),
        stale_secs = stale_threshold.as_secs(),
        "presence reaper started"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let evicted = sweep(&registry, stale_threshold).await;
            debug!(
                channels = registry.channel_count(),
                evicted, "reaper tick"
            );
        }
    })
}
