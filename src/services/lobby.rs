//! Lobby service: create, join, and describe whiteboards.
//!
//! DESIGN
//! ======
//! Creating or joining hands the caller a fresh sender id. The client uses
//! it as its identity on the whiteboard's pub/sub topic, so the hub can keep
//! its own messages from echoing back to it. The roster maps each sender id
//! to the display name given at creation or join time.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::HubConfig;
use crate::services::registry::WhiteboardRegistry;
use crate::whiteboard::{Transport, Whiteboard, format_gmt};
use crate::wire::{ErrorCode, RestoredWhiteboard};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("whiteboard not found: {0}")]
    NotFound(Uuid),
    #[error("unknown sender {sender} on whiteboard {whiteboard_id}")]
    UnknownSender { whiteboard_id: Uuid, sender: Uuid },
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("canvas size must be positive, got {width}x{height}")]
    InvalidCanvas { width: u32, height: u32 },
}

impl ErrorCode for LobbyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_WHITEBOARD_NOT_FOUND",
            Self::UnknownSender { .. } => "E_UNKNOWN_SENDER",
            Self::MissingField(_) => "E_MISSING_FIELD",
            Self::InvalidCanvas { .. } => "E_INVALID_CANVAS",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWhiteboard {
    pub title: String,
    pub creator: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub transport: Option<Transport>,
}

/// Identity handed to a creator or joiner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub whiteboard_id: Uuid,
    pub sender_id: Uuid,
}

/// Everything the workplace page shows about a whiteboard for one sender.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhiteboardInfo {
    pub whiteboard_id: Uuid,
    pub title: String,
    pub creator: String,
    pub creation_date: String,
    pub width: u32,
    pub height: u32,
    pub users_count: usize,
    pub user: String,
    pub transport: Transport,
    pub pub_sub_url: String,
    pub greeting: String,
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create and register a whiteboard; the creator joins it immediately.
///
/// # Errors
///
/// Returns `MissingField` for a blank title or creator and `InvalidCanvas`
/// for a zero dimension.
pub async fn create(
    registry: &WhiteboardRegistry,
    config: &HubConfig,
    request: CreateWhiteboard,
) -> Result<Membership, LobbyError> {
    let title = required("title", &request.title)?;
    let creator = required("creator", &request.creator)?;
    let width = request.width.unwrap_or(config.default_width);
    let height = request.height.unwrap_or(config.default_height);
    if width == 0 || height == 0 {
        return Err(LobbyError::InvalidCanvas { width, height });
    }

    let sender_id = Uuid::new_v4();
    let mut whiteboard =
        Whiteboard::new(title, creator, request.transport.unwrap_or_default()).with_canvas(width, height);
    whiteboard.add_user(sender_id.to_string(), creator);
    let whiteboard_id = whiteboard.id;
    let transport = whiteboard.transport;
    registry.add(whiteboard).await;

    info!(%whiteboard_id, %sender_id, creator, transport = transport.as_str(), "whiteboard created");
    Ok(Membership { whiteboard_id, sender_id })
}

/// Join an existing whiteboard under a new sender id.
///
/// # Errors
///
/// Returns `NotFound` if the whiteboard is not registered and
/// `MissingField` for a blank user name.
pub async fn join(registry: &WhiteboardRegistry, whiteboard_id: Uuid, user: &str) -> Result<Membership, LobbyError> {
    let user = required("user", user)?;
    let handle = registry.get(whiteboard_id).await.ok_or(LobbyError::NotFound(whiteboard_id))?;

    let sender_id = Uuid::new_v4();
    let users = {
        let mut whiteboard = handle.lock().await;
        whiteboard.add_user(sender_id.to_string(), user);
        whiteboard.touch();
        whiteboard.users_count()
    };

    info!(%whiteboard_id, %sender_id, user, users, "user joined whiteboard");
    Ok(Membership { whiteboard_id, sender_id })
}

/// Describe a whiteboard from the point of view of one sender.
///
/// # Errors
///
/// Returns `NotFound` if the whiteboard is not registered and
/// `UnknownSender` if `sender_id` never joined it.
pub async fn describe(
    registry: &WhiteboardRegistry,
    whiteboard_id: Uuid,
    sender_id: Uuid,
) -> Result<WhiteboardInfo, LobbyError> {
    let handle = registry.get(whiteboard_id).await.ok_or(LobbyError::NotFound(whiteboard_id))?;
    let whiteboard = handle.lock().await;
    let user = whiteboard
        .user_name(&sender_id.to_string())
        .ok_or(LobbyError::UnknownSender { whiteboard_id, sender: sender_id })?
        .to_owned();

    let users_count = whiteboard.users_count();
    let greeting = if users_count < 2 {
        format!("Hello {}! You have created this whiteboard.", whiteboard.creator)
    } else {
        format!("Hello {user}! You have joined or refreshed this whiteboard.")
    };

    Ok(WhiteboardInfo {
        whiteboard_id,
        title: whiteboard.title.clone(),
        creator: whiteboard.creator.clone(),
        creation_date: format_gmt(whiteboard.created_at),
        width: whiteboard.width,
        height: whiteboard.height,
        users_count,
        user,
        transport: whiteboard.transport,
        pub_sub_url: pub_sub_path(whiteboard_id, sender_id),
        greeting,
    })
}

/// Snapshot every element for a (re)joining client, in paint order.
/// Returns `Ok(None)` for an empty whiteboard.
///
/// # Errors
///
/// Returns `NotFound` if the whiteboard is not registered.
pub async fn restore(
    registry: &WhiteboardRegistry,
    whiteboard_id: Uuid,
) -> Result<Option<RestoredWhiteboard>, LobbyError> {
    let handle = registry.get(whiteboard_id).await.ok_or(LobbyError::NotFound(whiteboard_id))?;
    let mut whiteboard = handle.lock().await;
    whiteboard.touch();
    let elements = whiteboard.elements().cloned().collect();
    Ok(RestoredWhiteboard::from_elements(elements))
}

/// Path of a sender's pub/sub topic, as the browser client addresses it.
#[must_use]
pub fn pub_sub_path(whiteboard_id: Uuid, sender_id: Uuid) -> String {
    format!("/pubsub/{whiteboard_id}/{sender_id}.topic")
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, LobbyError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LobbyError::MissingField(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
#[path = "lobby_test.rs"]
mod tests;
