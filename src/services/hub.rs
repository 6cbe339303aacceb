//! Broadcast hub: per-whiteboard pub/sub topics.
//!
//! DESIGN
//! ======
//! Every whiteboard has one topic. A connection subscribes with the sender id
//! it was handed when it created or joined the whiteboard, and from then on
//! receives every message published to that topic by anyone *else*. Sender
//! ids are compared as opaque strings once the `.topic` suffix is stripped.
//! A subscriber with an empty sender segment receives everything.
//!
//! Each subscriber owns a bounded mpsc channel. Fan-out holds only the
//! topic read lock and uses `try_send`, so a slow subscriber drops messages
//! instead of stalling the publisher. Subscribers whose receiving side has
//! gone away are pruned on the next publish to their topic.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::action::{self, ActionError};
use crate::services::registry::WhiteboardRegistry;
use crate::wire::{self, ErrorCode};

/// Suffix the browser client appends to its sender segment.
const TOPIC_SUFFIX: &str = ".topic";

// =============================================================================
// TYPES
// =============================================================================

struct Subscriber {
    id: u64,
    sender: Option<String>,
    tx: mpsc::Sender<String>,
}

/// Receiving end of one subscription. Dropping it closes the subscription;
/// the hub forgets it on the next publish.
pub struct Subscription {
    pub id: u64,
    pub whiteboard_id: Uuid,
    rx: mpsc::Receiver<String>,
}

impl Subscription {
    /// Wait for the next message. Returns `None` once the topic is dropped.
    pub async fn next(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

pub struct BroadcastHub {
    registry: Arc<WhiteboardRegistry>,
    capacity: usize,
    topics: RwLock<HashMap<Uuid, Vec<Subscriber>>>,
    next_id: AtomicU64,
}

impl BroadcastHub {
    #[must_use]
    pub fn new(registry: Arc<WhiteboardRegistry>, capacity: usize) -> Self {
        Self { registry, capacity: capacity.max(1), topics: RwLock::new(HashMap::new()), next_id: AtomicU64::new(1) }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<WhiteboardRegistry> {
        &self.registry
    }
}

// =============================================================================
// SUBSCRIPTIONS
// =============================================================================

impl BroadcastHub {
    /// Register a connection on a whiteboard's topic.
    pub async fn subscribe(&self, whiteboard_id: Uuid, sender: Option<&str>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut topics = self.topics.write().await;
        let subscribers = topics.entry(whiteboard_id).or_default();
        subscribers.push(Subscriber { id, sender: sender.map(str::to_owned), tx });
        info!(%whiteboard_id, subscription = id, sender = ?sender, subscribers = subscribers.len(), "subscribed");
        Subscription { id, whiteboard_id, rx }
    }

    pub async fn unsubscribe(&self, subscription: &Subscription) {
        let whiteboard_id = subscription.whiteboard_id;
        let mut topics = self.topics.write().await;
        let Some(subscribers) = topics.get_mut(&whiteboard_id) else {
            return;
        };
        subscribers.retain(|s| s.id != subscription.id);
        debug!(%whiteboard_id, subscription = subscription.id, remaining = subscribers.len(), "unsubscribed");
        if subscribers.is_empty() {
            topics.remove(&whiteboard_id);
        }
    }

    pub async fn subscriber_count(&self, whiteboard_id: Uuid) -> usize {
        self.topics.read().await.get(&whiteboard_id).map_or(0, Vec::len)
    }

    /// Forget a topic. Its subscribers see their stream end.
    pub async fn drop_topic(&self, whiteboard_id: Uuid) {
        if let Some(subscribers) = self.topics.write().await.remove(&whiteboard_id) {
            info!(%whiteboard_id, subscribers = subscribers.len(), "topic dropped");
        }
    }
}

// =============================================================================
// PUBLISH
// =============================================================================

impl BroadcastHub {
    /// Deliver `message` to every subscriber of the topic except those whose
    /// sender id equals `sender`. Returns how many subscribers received it.
    pub async fn publish(&self, whiteboard_id: Uuid, sender: Option<&str>, message: &str) -> usize {
        let mut delivered = 0;
        let mut closed = false;
        {
            let topics = self.topics.read().await;
            let Some(subscribers) = topics.get(&whiteboard_id) else {
                return 0;
            };
            for subscriber in subscribers {
                if sender.is_some() && subscriber.sender.as_deref() == sender {
                    continue;
                }
                match subscriber.tx.try_send(message.to_owned()) {
                    Ok(()) => delivered += 1,
                    Err(mpsc::error::TrySendError::Closed(_)) => closed = true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(%whiteboard_id, subscription = subscriber.id, "subscriber lagging; message dropped");
                    }
                }
            }
        }
        if closed {
            self.prune(whiteboard_id).await;
        }
        delivered
    }

    async fn prune(&self, whiteboard_id: Uuid) {
        let mut topics = self.topics.write().await;
        let Some(subscribers) = topics.get_mut(&whiteboard_id) else {
            return;
        };
        subscribers.retain(|s| !s.tx.is_closed());
        if subscribers.is_empty() {
            topics.remove(&whiteboard_id);
        }
    }

    /// Handle one raw message posted to a whiteboard's topic: decode it,
    /// apply it, and fan the result out to everyone but the poster.
    ///
    /// The reply to the poster is always empty. Failures are logged and
    /// nothing is broadcast.
    pub async fn on_message_received(&self, whiteboard_id: Uuid, sender: &str, raw: &str) -> String {
        let data = match wire::decode_client(raw) {
            Ok(data) => data,
            Err(e) => {
                warn!(%whiteboard_id, error = %e, code = e.error_code(), "dropping undecodable message");
                return String::new();
            }
        };
        if data.whiteboard_id != whiteboard_id {
            warn!(
                %whiteboard_id,
                message_whiteboard_id = %data.whiteboard_id,
                "message addressed to another whiteboard; ignored"
            );
            return String::new();
        }

        let result = match action::apply(&self.registry, &data).await {
            Ok(result) => result,
            Err(e) => {
                log_rejected(whiteboard_id, data.action.as_str(), &e);
                return String::new();
            }
        };
        let encoded = match wire::encode_server(&result) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(%whiteboard_id, error = %e, code = e.error_code(), "failed to encode result");
                return String::new();
            }
        };

        let delivered = self.publish(whiteboard_id, parse_sender(sender), &encoded).await;
        debug!(%whiteboard_id, action = data.action.as_str(), delivered, "broadcast");
        String::new()
    }
}

fn log_rejected(whiteboard_id: Uuid, action: &str, error: &ActionError) {
    match error {
        ActionError::WhiteboardNotFound(_) | ActionError::ElementNotFound(_) => {
            info!(%whiteboard_id, action, error = %error, code = error.error_code(), "action skipped");
        }
        _ => warn!(%whiteboard_id, action, error = %error, code = error.error_code(), "action rejected"),
    }
}

/// Sender id carried by a path segment, without the `.topic` suffix. An
/// empty segment yields `None`.
#[must_use]
pub fn parse_sender(segment: &str) -> Option<&str> {
    let trimmed = segment.strip_suffix(TOPIC_SUFFIX).unwrap_or(segment).trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;
