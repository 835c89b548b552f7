//! State containers consumed by the presentation layer.
//!
//! # Responsibility
//! - Keep the canonical in-memory state for records and theme selection.
//! - Mirror every mutation to key-value storage (write-through).
//!
//! # Invariants
//! - Containers are explicitly constructed and owned by the caller.
//! - Containers never depend on each other.

pub mod record_store;
pub mod theme_preference;
