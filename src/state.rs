//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the config, the whiteboard registry, and the broadcast hub.
//! The registry is built first; the hub keeps its own handle to it so the
//! pub/sub routes can drive actions without going through `AppState`.

use std::sync::Arc;

use crate::config::HubConfig;
use crate::services::hub::BroadcastHub;
use crate::services::registry::WhiteboardRegistry;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<HubConfig>,
    pub registry: Arc<WhiteboardRegistry>,
    pub hub: Arc<BroadcastHub>,
}

impl AppState {
    #[must_use]
    pub fn new(config: HubConfig) -> Self {
        let registry = Arc::new(WhiteboardRegistry::new());
        let hub = Arc::new(BroadcastHub::new(Arc::clone(&registry), config.subscriber_capacity));
        Self { config: Arc::new(config), registry, hub }
    }
}


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
