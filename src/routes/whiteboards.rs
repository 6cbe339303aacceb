//! Whiteboard lobby routes: create, join, display, restore.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use crate::services::hub::parse_sender;
use crate::services::lobby::{self, CreateWhiteboard, LobbyError, Membership, WhiteboardInfo};
use crate::state::AppState;
use crate::wire::ErrorCode;

#[derive(Deserialize)]
pub struct JoinBody {
    pub user: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayQuery {
    pub sender_id: Option<String>,
}

/// `POST /api/whiteboards`: create a whiteboard.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateWhiteboard>,
) -> Result<(StatusCode, Json<Membership>), StatusCode> {
    let membership = lobby::create(&state.registry, &state.config, body)
        .await
        .map_err(lobby_error_to_status)?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// `POST /api/whiteboards/{id}/join`: join under a new sender id.
pub async fn join(
    State(state): State<AppState>,
    Path(whiteboard_id): Path<Uuid>,
    Json(body): Json<JoinBody>,
) -> Result<Json<Membership>, StatusCode> {
    let membership = lobby::join(&state.registry, whiteboard_id, &body.user)
        .await
        .map_err(lobby_error_to_status)?;
    Ok(Json(membership))
}

/// `GET /api/whiteboards/{id}?senderId=`: workplace details for one sender.
pub async fn display(
    State(state): State<AppState>,
    Path(whiteboard_id): Path<Uuid>,
    Query(query): Query<DisplayQuery>,
) -> Result<Json<WhiteboardInfo>, StatusCode> {
    let sender_id = query
        .sender_id
        .as_deref()
        .and_then(parse_sender)
        .and_then(|sender| Uuid::parse_str(sender).ok())
        .ok_or(StatusCode::BAD_REQUEST)?;
    let info = lobby::describe(&state.registry, whiteboard_id, sender_id)
        .await
        .map_err(lobby_error_to_status)?;
    Ok(Json(info))
}

/// `GET /api/whiteboards/{id}/elements`: snapshot for a (re)joining client.
/// An empty whiteboard answers `{}`.
pub async fn elements(
    State(state): State<AppState>,
    Path(whiteboard_id): Path<Uuid>,
) -> Result<Response, StatusCode> {
    let restored = lobby::restore(&state.registry, whiteboard_id)
        .await
        .map_err(lobby_error_to_status)?;
    Ok(match restored {
        Some(restored) => Json(restored).into_response(),
        None => Json(serde_json::json!({})).into_response(),
    })
}

pub(crate) fn lobby_error_to_status(err: LobbyError) -> StatusCode {
    warn!(error = %err, code = err.error_code(), "lobby request rejected");
    match err {
        LobbyError::NotFound(_) => StatusCode::NOT_FOUND,
        LobbyError::UnknownSender { .. } => StatusCode::FORBIDDEN,
        LobbyError::MissingField(_) | LobbyError::InvalidCanvas { .. } => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
#[path = "whiteboards_test.rs"]
mod tests;
