//! Whiteboard registry: the process-wide directory of live whiteboards.
//!
//! DESIGN
//! ======
//! The directory maps whiteboard ids to `Arc<Mutex<Whiteboard>>` handles.
//! Structural changes (add, update, remove, eviction) take the directory's
//! write lock; lookups take only the read side and hand back a clone of the
//! handle, so a caller mutates the live aggregate under its own per-room
//! mutex without holding the directory lock.
//!
//! A lookup racing a removal may return a handle to a whiteboard that has
//! just left the directory. Mutations through that handle are simply lost.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::whiteboard::Whiteboard;

/// Shared handle to one live whiteboard.
pub type WhiteboardHandle = Arc<Mutex<Whiteboard>>;

#[derive(Default)]
pub struct WhiteboardRegistry {
    whiteboards: RwLock<HashMap<Uuid, WhiteboardHandle>>,
}

impl WhiteboardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a whiteboard under its own id. An existing entry with the
    /// same id is replaced.
    pub async fn add(&self, whiteboard: Whiteboard) -> WhiteboardHandle {
        let id = whiteboard.id;
        let handle = Arc::new(Mutex::new(whiteboard));
        self.whiteboards.write().await.insert(id, Arc::clone(&handle));
        info!(whiteboard_id = %id, "whiteboard registered");
        handle
    }

    /// Replace the stored state of a whiteboard, registering it if its id is
    /// unknown. Returns the previous state, if any. The directory write lock
    /// is held throughout, so a concurrent `add` or `remove` is ordered
    /// entirely before or after the update.
    pub async fn update(&self, whiteboard: Whiteboard) -> Option<Whiteboard> {
        let id = whiteboard.id;
        let mut whiteboards = self.whiteboards.write().await;
        let Some(handle) = whiteboards.get(&id).cloned() else {
            whiteboards.insert(id, Arc::new(Mutex::new(whiteboard)));
            info!(whiteboard_id = %id, "whiteboard registered");
            return None;
        };
        let mut current = handle.lock().await;
        Some(std::mem::replace(&mut *current, whiteboard))
    }

    pub async fn remove(&self, id: Uuid) -> Option<WhiteboardHandle> {
        let removed = self.whiteboards.write().await.remove(&id);
        if removed.is_some() {
            info!(whiteboard_id = %id, "whiteboard removed");
        }
        removed
    }

    pub async fn get(&self, id: Uuid) -> Option<WhiteboardHandle> {
        self.whiteboards.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.whiteboards.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.whiteboards.read().await.is_empty()
    }

    pub async fn ids(&self) -> Vec<Uuid> {
        self.whiteboards.read().await.keys().copied().collect()
    }

    /// Drop every whiteboard idle for at least `ttl`. Whiteboards whose lock
    /// is held right now are in use and are skipped.
    pub async fn evict_idle(&self, ttl: Duration) -> Vec<Uuid> {
        let mut whiteboards = self.whiteboards.write().await;
        let idle: Vec<Uuid> = whiteboards
            .iter()
            .filter(|(_, handle)| handle.try_lock().is_ok_and(|wb| wb.idle_for() >= ttl))
            .map(|(id, _)| *id)
            .collect();
        for id in &idle {
            whiteboards.remove(id);
            info!(whiteboard_id = %id, idle_ttl_secs = ttl.as_secs(), "evicted idle whiteboard");
        }
        idle
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
