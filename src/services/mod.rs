//! Domain services used by the HTTP and pub/sub routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the whiteboard directory, action semantics, and
//! fan-out so route handlers can stay focused on protocol translation.

pub mod action;
pub mod expiry;
pub mod hub;
pub mod lobby;
pub mod registry;
