//! Domain model for incident records and theme selection.
//!
//! # Invariants
//! - Record ids are opaque strings and never reassigned.
//! - Theme names always resolve through the static palette.

pub mod record;
pub mod theme;
