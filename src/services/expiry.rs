//! Expiry service: evicts whiteboards nobody has touched for a while.
//!
//! DESIGN
//! ======
//! A background task wakes every sweep interval, evicts every whiteboard
//! idle for at least the configured TTL, and drops the evicted rooms' topics
//! so their remaining subscribers see the stream end. Any action, join, or
//! snapshot request resets a whiteboard's idle clock.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::state::AppState;

/// Spawn the background expiry task. Returns `None` when eviction is
/// disabled.
pub fn spawn_expiry_task(state: AppState) -> Option<JoinHandle<()>> {
    let ttl = state.config.idle_ttl?;
    let period = state.config.sweep_interval;
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            sweep(&state, ttl).await;
        }
    }))
}

/// Evict idle whiteboards once and drop their topics.
pub async fn sweep(state: &AppState, ttl: Duration) -> Vec<Uuid> {
    let evicted = state.registry.evict_idle(ttl).await;
    for whiteboard_id in &evicted {
        state.hub.drop_topic(*whiteboard_id).await;
    }
    if !evicted.is_empty() {
        let remaining = state.registry.len().await;
        info!(count = evicted.len(), remaining, "expiry sweep evicted whiteboards");
    }
    evicted
}

#[cfg(test)]
#[path = "expiry_test.rs"]
mod tests;
