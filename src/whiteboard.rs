//! Whiteboard aggregate: one room's authoritative state.
//!
//! DESIGN
//! ======
//! The element store is an `IndexMap` keyed by element identifier. Its
//! iteration order is the paint order clients render in (first = bottom,
//! last = top), so every removal goes through `shift_remove` to keep the
//! remaining order intact.
//!
//! The roster maps per-connection sender identifiers to display names. It
//! only grows: a sender that disconnects keeps its entry until the whiteboard
//! itself is evicted.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

use crate::element::Element;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 500;

// =============================================================================
// TYPES
// =============================================================================

/// Transport the creator picked for the room's pub/sub connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    #[default]
    #[serde(rename = "websocket")]
    WebSocket,
    LongPolling,
    Streaming,
}

impl Transport {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebSocket => "websocket",
            Self::LongPolling => "long-polling",
            Self::Streaming => "streaming",
        }
    }
}

/// One collaborative room.
#[derive(Debug, Clone)]
pub struct Whiteboard {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    pub transport: Transport,
    pub width: u32,
    pub height: u32,
    pub created_at: OffsetDateTime,
    /// `sender_id` -> display name.
    roster: HashMap<String, String>,
    /// Element store in paint order.
    elements: IndexMap<String, Element>,
    last_activity: Instant,
}

impl Whiteboard {
    /// Create an empty whiteboard with a fresh identifier.
    #[must_use]
    pub fn new(title: impl Into<String>, creator: impl Into<String>, transport: Transport) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            creator: creator.into(),
            transport,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            created_at: OffsetDateTime::now_utc(),
            roster: HashMap::new(),
            elements: IndexMap::new(),
            last_activity: Instant::now(),
        }
    }

    #[must_use]
    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

// =============================================================================
// ROSTER
// =============================================================================

impl Whiteboard {
    /// Register a connection's display name. Re-registering a sender replaces
    /// its name.
    pub fn add_user(&mut self, sender_id: impl Into<String>, user_name: impl Into<String>) {
        self.roster.insert(sender_id.into(), user_name.into());
    }

    #[must_use]
    pub fn user_name(&self, sender_id: &str) -> Option<&str> {
        self.roster.get(sender_id).map(String::as_str)
    }

    #[must_use]
    pub fn users_count(&self) -> usize {
        self.roster.len()
    }
}

// =============================================================================
// ELEMENT STORE
// =============================================================================

impl Whiteboard {
    /// Insert an element on top. An element whose identifier is already
    /// stored is replaced where it sits.
    pub fn add_element(&mut self, element: Element) {
        self.elements.insert(element.uuid().to_owned(), element);
    }

    #[must_use]
    pub fn element(&self, uuid: &str) -> Option<&Element> {
        self.elements.get(uuid)
    }

    pub fn element_mut(&mut self, uuid: &str) -> Option<&mut Element> {
        self.elements.get_mut(uuid)
    }

    pub fn remove_element(&mut self, uuid: &str) -> Option<Element> {
        self.elements.shift_remove(uuid)
    }

    /// Move an element to the top of the paint order.
    pub fn bring_to_front(&mut self, uuid: &str) -> Option<&Element> {
        let element = self.elements.shift_remove(uuid)?;
        self.elements.insert(uuid.to_owned(), element);
        self.elements.last().map(|(_, element)| element)
    }

    /// Move an element to the bottom of the paint order. Every other element
    /// keeps its relative order.
    pub fn bring_to_back(&mut self, uuid: &str) -> Option<&Element> {
        let index = self.elements.get_index_of(uuid)?;
        self.elements.move_index(index, 0);
        self.elements.first().map(|(_, element)| element)
    }

    pub fn clear_elements(&mut self) {
        self.elements.clear();
    }

    /// Elements in paint order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

// =============================================================================
// ACTIVITY
// =============================================================================

impl Whiteboard {
    /// Record that the whiteboard was just used.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }
}

/// Render a timestamp as activity logs show it: `2011-Sep-27 15:24:29 (GMT)`.
#[must_use]
pub fn format_gmt(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let stamp = at
        .format(format_description!("[year]-[month repr:short]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("{stamp} (GMT)")
}

/// Render epoch milliseconds with `format_gmt`. Out-of-range values clamp to
/// the Unix epoch.
#[must_use]
pub fn format_gmt_millis(millis: i64) -> String {
    let nanos = i128::from(millis) * 1_000_000;
    let at = OffsetDateTime::from_unix_timestamp_nanos(nanos).unwrap_or(OffsetDateTime::UNIX_EPOCH);
    format_gmt(at)
}

#[cfg(test)]
#[path = "whiteboard_test.rs"]
mod tests;
