//! Action service: applies one client action to one whiteboard.
//!
//! DESIGN
//! ======
//! `apply` is the single mutation entry point. It looks the whiteboard up in
//! the registry, takes that room's mutex, runs the transition, stamps the
//! room's activity clock, and returns the broadcast payload. The lock is
//! released before the caller encodes or fans out, so no I/O happens under
//! it. Different rooms never contend.
//!
//! Every transition also produces an audit line for the activity log:
//!
//! ```text
//! 2011-Sep-27 15:24:29 (GMT): User Alice has created Circle at position (10,10)
//! ```
//!
//! ERROR HANDLING
//! ==============
//! Every `ActionError` is a no-op for the room: nothing was changed and
//! nothing is broadcast. Callers log and move on.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::element::{BroadcastElement, CopyOutcome, Element, ElementKind, TruncatedElement};
use crate::services::registry::WhiteboardRegistry;
use crate::whiteboard::{Whiteboard, format_gmt_millis};
use crate::wire::{ClientAction, ClientChangedData, ErrorCode, Parameters, ServerChangedData};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("whiteboard not found: {0}")]
    WhiteboardNotFound(Uuid),
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("{0} requires an element")]
    MissingElement(&'static str),
    #[error("{0} requires parameters")]
    MissingParameters(&'static str),
    #[error("invalid parameter {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },
    #[error("cannot move {stored} {uuid} using a {incoming} payload")]
    KindMismatch { uuid: String, stored: ElementKind, incoming: ElementKind },
    #[error("unknown action")]
    UnknownAction,
}

impl ErrorCode for ActionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WhiteboardNotFound(_) => "E_WHITEBOARD_NOT_FOUND",
            Self::ElementNotFound(_) => "E_ELEMENT_NOT_FOUND",
            Self::MissingElement(_) => "E_MISSING_ELEMENT",
            Self::MissingParameters(_) => "E_MISSING_PARAMETERS",
            Self::InvalidParameter { .. } => "E_INVALID_PARAMETER",
            Self::KindMismatch { .. } => "E_KIND_MISMATCH",
            Self::UnknownAction => "E_UNKNOWN_ACTION",
        }
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Apply a decoded client action to the whiteboard it names.
///
/// # Errors
///
/// Returns `WhiteboardNotFound` if the whiteboard is not registered, or any
/// precondition failure from `apply_to`. The whiteboard is unchanged.
pub async fn apply(registry: &WhiteboardRegistry, data: &ClientChangedData) -> Result<ServerChangedData, ActionError> {
    let handle = registry
        .get(data.whiteboard_id)
        .await
        .ok_or(ActionError::WhiteboardNotFound(data.whiteboard_id))?;

    let mut whiteboard = handle.lock().await;
    let result = apply_to(&mut whiteboard, data)?;
    whiteboard.touch();
    debug!(
        whiteboard_id = %data.whiteboard_id,
        action = data.action.as_str(),
        elements = whiteboard.element_count(),
        "action applied"
    );
    Ok(result)
}

/// Run one transition against a locked whiteboard.
///
/// # Errors
///
/// Returns the precondition that failed; the whiteboard is left unchanged.
pub fn apply_to(whiteboard: &mut Whiteboard, data: &ClientChangedData) -> Result<ServerChangedData, ActionError> {
    let audit = Audit { timestamp: data.timestamp, user: &data.user };
    let result = ServerChangedData::new(data.action, data.timestamp);

    match data.action {
        ClientAction::Create | ClientAction::Clone => {
            let element = required_element(data)?;
            let verb = if data.action == ClientAction::Create { "created" } else { "cloned" };
            let message = audit.line(&format!("{verb} {}{}", element.description(), at_position(element)));
            whiteboard.add_element(element.clone());
            Ok(result.with_element(BroadcastElement::Full(element.clone())).with_message(message))
        }
        ClientAction::Update => {
            let incoming = required_element(data)?;
            let stored = whiteboard
                .element_mut(incoming.uuid())
                .ok_or_else(|| ActionError::ElementNotFound(incoming.uuid().to_owned()))?;
            if let CopyOutcome::Partial { stored: kind, incoming: incoming_kind } = stored.update_from(incoming) {
                warn!(
                    uuid = incoming.uuid(),
                    stored = %kind,
                    incoming = %incoming_kind,
                    "update kind mismatch; copied shared fields only"
                );
            }
            let current = position_suffix(incoming, " at current position");
            let message = audit.line(&format!("updated properties of {}{current}", incoming.description()));
            Ok(result.with_element(BroadcastElement::Full(stored.clone())).with_message(message))
        }
        ClientAction::Remove => {
            let uuid = required_element(data)?.uuid();
            let removed = whiteboard
                .remove_element(uuid)
                .ok_or_else(|| ActionError::ElementNotFound(uuid.to_owned()))?;
            let message = audit.line(&format!("removed {}{}", removed.description(), at_position(&removed)));
            Ok(result.with_element(truncated(&removed)).with_message(message))
        }
        ClientAction::Move => {
            let incoming = required_element(data)?;
            let stored = whiteboard
                .element_mut(incoming.uuid())
                .ok_or_else(|| ActionError::ElementNotFound(incoming.uuid().to_owned()))?;
            let projection = move_element(stored, incoming)?;
            let suffix = position_suffix(stored, " to position");
            let message = audit.line(&format!("moved {}{suffix}", stored.description()));
            Ok(result.with_element(BroadcastElement::Truncated(projection)).with_message(message))
        }
        ClientAction::BringToFront => {
            let uuid = required_element(data)?.uuid();
            let element = whiteboard
                .bring_to_front(uuid)
                .ok_or_else(|| ActionError::ElementNotFound(uuid.to_owned()))?;
            let message = audit.line(&format!(
                "brought {} to front (in front of other elements){}",
                element.description(),
                at_position(element)
            ));
            Ok(result.with_element(truncated(element)).with_message(message))
        }
        ClientAction::BringToBack => {
            let uuid = required_element(data)?.uuid();
            let element = whiteboard
                .bring_to_back(uuid)
                .ok_or_else(|| ActionError::ElementNotFound(uuid.to_owned()))?;
            let message = audit.line(&format!(
                "brought {} to back (behind other elements){}",
                element.description(),
                at_position(element)
            ));
            Ok(result.with_element(truncated(element)).with_message(message))
        }
        ClientAction::Clear => {
            whiteboard.clear_elements();
            Ok(result.with_message(audit.line("cleared this Whiteboard")))
        }
        ClientAction::Resize => {
            let params = required_parameters(data)?;
            let width = positive_parameter(params, "width")?;
            let height = positive_parameter(params, "height")?;
            whiteboard.resize(width, height);
            let message = audit.line(&format!("resized this Whiteboard to ({width},{height}) px"));
            Ok(result
                .with_message(message)
                .with_parameter("width", width.to_string())
                .with_parameter("height", height.to_string()))
        }
        ClientAction::Join => {
            let params = required_parameters(data)?;
            let raw = params
                .get("usersCount")
                .ok_or(ActionError::MissingParameters(data.action.as_str()))?;
            let users_count: usize = raw.trim().parse().map_err(|_| ActionError::InvalidParameter {
                name: "usersCount",
                value: raw.clone(),
            })?;
            let message = audit.line("joined or refreshed this whiteboard");
            Ok(result
                .with_message(message)
                .with_parameter("usersCount", users_count.to_string()))
        }
        ClientAction::Unknown => Err(ActionError::UnknownAction),
    }
}

// =============================================================================
// HELPERS
// =============================================================================

struct Audit<'a> {
    timestamp: i64,
    user: &'a str,
}

impl Audit<'_> {
    fn line(&self, what: &str) -> String {
        format!("{}: User {} has {what}", format_gmt_millis(self.timestamp), self.user)
    }
}

fn required_element(data: &ClientChangedData) -> Result<&Element, ActionError> {
    data.element
        .as_ref()
        .ok_or(ActionError::MissingElement(data.action.as_str()))
}

fn required_parameters(data: &ClientChangedData) -> Result<&Parameters, ActionError> {
    if data.parameters.is_empty() {
        return Err(ActionError::MissingParameters(data.action.as_str()));
    }
    Ok(&data.parameters)
}

fn positive_parameter(params: &Parameters, name: &'static str) -> Result<u32, ActionError> {
    let raw = params.get(name).ok_or(ActionError::InvalidParameter { name, value: String::new() })?;
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ActionError::InvalidParameter { name, value: raw.clone() }),
    }
}

/// Apply a move to the stored element and build its truncated projection.
fn move_element(stored: &mut Element, incoming: &Element) -> Result<TruncatedElement, ActionError> {
    let stored_kind = stored.kind();
    let mismatch = || ActionError::KindMismatch {
        uuid: incoming.uuid().to_owned(),
        stored: stored_kind,
        incoming: incoming.kind(),
    };
    if stored.as_positionable().is_some() {
        let to = *incoming.as_positionable().ok_or_else(mismatch)?;
        if let Some(placement) = stored.as_positionable_mut() {
            placement.x = to.x;
            placement.y = to.y;
        }
        return Ok(TruncatedElement::positioned(stored, to.x, to.y));
    }
    let path = incoming.as_line().ok_or_else(mismatch)?.path.clone();
    if let Some(line) = stored.as_line_mut() {
        line.path.clone_from(&path);
    }
    Ok(TruncatedElement::line(stored, path))
}

fn truncated(element: &Element) -> BroadcastElement {
    BroadcastElement::Truncated(TruncatedElement::of(element))
}

fn at_position(element: &Element) -> String {
    position_suffix(element, " at position")
}

fn position_suffix(element: &Element, lead: &str) -> String {
    element
        .as_positionable()
        .map(|p| format!("{lead} ({},{})", p.x, p.y))
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "action_test.rs"]
mod tests;
