//! Wire messages exchanged over a whiteboard's pub/sub topic.
//!
//! ARCHITECTURE
//! ============
//! Clients post a `ClientChangedData` describing one action. The server
//! answers every *other* subscriber of the room with a `ServerChangedData`
//! carrying the authoritative result. Both are plain JSON; elements travel in
//! the `{type, properties}` envelope defined in `crate::element`.
//!
//! DESIGN
//! ======
//! - Decoding is two-phase: the raw text is parsed to a JSON value first so
//!   an unknown element `type` can be reported by name before typed decoding.
//! - `parameters` values are stringly typed on the server side. Browsers send
//!   numbers (`{"width": 1000}`), so scalar values are accepted and stringified.
//! - Server messages serialize absent fields as explicit `null`s.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::element::{BroadcastElement, Element, ElementKind};

/// String-keyed action parameters. Ordered so encoded output is stable.
pub type Parameters = BTreeMap<String, String>;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured error logging and responses.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown element type: {0}")]
    UnknownElementType(String),
    #[error("failed to encode message: {0}")]
    Encode(serde_json::Error),
}

impl ErrorCode for CodecError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "E_MALFORMED_MESSAGE",
            Self::UnknownElementType(_) => "E_UNKNOWN_ELEMENT_TYPE",
            Self::Encode(_) => "E_ENCODE",
        }
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// Client-reported intent. Unrecognized tags decode to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientAction {
    #[serde(rename = "join")]
    Join,
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "update")]
    Update,
    #[serde(rename = "remove")]
    Remove,
    #[serde(rename = "clone")]
    Clone,
    #[serde(rename = "move")]
    Move,
    #[serde(rename = "toFront")]
    BringToFront,
    #[serde(rename = "toBack")]
    BringToBack,
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "resize")]
    Resize,
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl ClientAction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Join => "join",
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Clone => "clone",
            Self::Move => "move",
            Self::BringToFront => "toFront",
            Self::BringToBack => "toBack",
            Self::Clear => "clear",
            Self::Resize => "resize",
            Self::Unknown => "unknown",
        }
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Client -> server: one action against one whiteboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientChangedData {
    pub action: ClientAction,
    pub whiteboard_id: Uuid,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub user: String,
    /// Client clock, milliseconds since Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "scalar_parameters")]
    pub parameters: Parameters,
}

/// Server -> subscribers: the authoritative result of one action.
#[derive(Debug, Clone, Serialize)]
pub struct ServerChangedData {
    pub action: ClientAction,
    pub element: Option<BroadcastElement>,
    pub message: Option<String>,
    /// Echoed from the originating request.
    pub timestamp: i64,
    pub parameters: Option<Parameters>,
}

impl ServerChangedData {
    #[must_use]
    pub fn new(action: ClientAction, timestamp: i64) -> Self {
        Self { action, element: None, message: None, timestamp, parameters: None }
    }

    #[must_use]
    pub fn with_element(mut self, element: BroadcastElement) -> Self {
        self.element = Some(element);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(Parameters::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Snapshot sent to a (re)joining client: every element in paint order.
#[derive(Debug, Clone, Serialize)]
pub struct RestoredWhiteboard {
    pub elements: Vec<Element>,
    pub message: String,
}

impl RestoredWhiteboard {
    /// Build a snapshot. Returns `None` for an empty whiteboard.
    #[must_use]
    pub fn from_elements(elements: Vec<Element>) -> Option<Self> {
        let message = match elements.len() {
            0 => return None,
            1 => "1 whiteboard element has been restored".to_owned(),
            n => format!("{n} whiteboard elements have been restored"),
        };
        Some(Self { elements, message })
    }
}

// =============================================================================
// CODEC
// =============================================================================

/// Decode a raw client message.
///
/// # Errors
///
/// Returns `UnknownElementType` if the element envelope names a kind this
/// server does not know, `Malformed` for any other parse failure.
pub fn decode_client(raw: &str) -> Result<ClientChangedData, CodecError> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if let Some(tag) = value.pointer("/element/type").and_then(serde_json::Value::as_str) {
        if ElementKind::from_tag(tag).is_none() {
            return Err(CodecError::UnknownElementType(tag.to_owned()));
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Encode a server result for subscribers.
///
/// # Errors
///
/// Returns `Encode` if serialization fails.
pub fn encode_server(data: &ServerChangedData) -> Result<String, CodecError> {
    serde_json::to_string(data).map_err(CodecError::Encode)
}

fn scalar_parameters<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Parameters, D::Error> {
    let raw = Option::<BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect())
}

#[cfg(test)]
#[path = "wire_test.rs"]
mod tests;
