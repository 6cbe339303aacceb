//! Pub/sub transports for a whiteboard topic.
//!
//! DESIGN
//! ======
//! Three ways to listen, one way to talk:
//! - websocket: bidirectional; inbound text frames are posted messages
//! - streaming: server-sent events, one event per broadcast
//! - long-polling: `GET` resolves once with the next broadcast
//! - `POST` publishes one message and answers with an empty body
//!
//! All of them address the topic as `/pubsub/{whiteboard}/{sender}`. The
//! sender segment may carry the `.topic` suffix the browser client appends;
//! it is otherwise an opaque id.
//!
//! LIFECYCLE
//! =========
//! 1. Subscribe on the hub with the parsed sender id
//! 2. Relay broadcasts until the client goes away or the topic is dropped
//! 3. Unsubscribe (SSE and long-poll subscriptions are pruned by the hub
//!    once their receiver is dropped)

use std::convert::Infallible;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::hub::{Subscription, parse_sender};
use crate::state::AppState;

/// Form field the browser client wraps posted messages in. The JSON after it
/// is sent unencoded, so the prefix is stripped rather than form-decoded.
const MESSAGE_FIELD: &str = "message=";

// =============================================================================
// PUBLISH
// =============================================================================

/// `POST /pubsub/{topic}/{sender}`: apply and broadcast one message.
pub async fn publish(
    State(state): State<AppState>,
    Path((whiteboard_id, sender)): Path<(Uuid, String)>,
    body: String,
) -> String {
    let raw = body.strip_prefix(MESSAGE_FIELD).unwrap_or(&body);
    state.hub.on_message_received(whiteboard_id, &sender, raw).await
}

// =============================================================================
// LONG-POLLING
// =============================================================================

/// `GET /pubsub/{topic}/{sender}`: wait for the next broadcast.
pub async fn long_poll(
    State(state): State<AppState>,
    Path((whiteboard_id, sender)): Path<(Uuid, String)>,
) -> Result<String, StatusCode> {
    let mut subscription = subscribe(&state, whiteboard_id, &sender).await?;
    let message = subscription.next().await;
    state.hub.unsubscribe(&subscription).await;
    message.ok_or(StatusCode::GONE)
}

// =============================================================================
// STREAMING
// =============================================================================

/// `GET /pubsub/{topic}/{sender}/stream`: server-sent events.
pub async fn stream(
    State(state): State<AppState>,
    Path((whiteboard_id, sender)): Path<(Uuid, String)>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let subscription = subscribe(&state, whiteboard_id, &sender).await?;
    let events = futures::stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.next().await?;
        Some((Ok(Event::default().data(message)), subscription))
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// =============================================================================
// WEBSOCKET
// =============================================================================

/// `GET /pubsub/{topic}/{sender}/ws`: bidirectional relay.
pub async fn handle_ws(
    State(state): State<AppState>,
    Path((whiteboard_id, sender)): Path<(Uuid, String)>,
    ws: WebSocketUpgrade,
) -> Response {
    let subscription = match subscribe(&state, whiteboard_id, &sender).await {
        Ok(subscription) => subscription,
        Err(status) => return status.into_response(),
    };
    ws.on_upgrade(move |socket| run_ws(socket, state, sender, subscription))
}

async fn run_ws(mut socket: WebSocket, state: AppState, sender: String, mut subscription: Subscription) {
    let whiteboard_id = subscription.whiteboard_id;
    info!(%whiteboard_id, sender = %sender, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        state.hub.on_message_received(whiteboard_id, &sender, text.as_str()).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            broadcast = subscription.next() => {
                let Some(broadcast) = broadcast else { break };
                if let Err(e) = socket.send(Message::Text(broadcast.into())).await {
                    warn!(%whiteboard_id, error = %e, "ws: send failed");
                    break;
                }
            }
        }
    }

    state.hub.unsubscribe(&subscription).await;
    info!(%whiteboard_id, sender = %sender, "ws: client disconnected");
}

// =============================================================================
// HELPERS
// =============================================================================

async fn subscribe(state: &AppState, whiteboard_id: Uuid, sender: &str) -> Result<Subscription, StatusCode> {
    if state.registry.get(whiteboard_id).await.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(state.hub.subscribe(whiteboard_id, parse_sender(sender)).await)
}

#[cfg(test)]
#[path = "pubsub_test.rs"]
mod tests;
