//! Presentation-facing bindings for the Criminal Intent core.

pub mod api;
