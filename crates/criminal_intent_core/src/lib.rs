//! Core state for the Criminal Intent incident notebook.
//! Records and the theme selection live here; screens only call in.

pub mod db;
pub mod kv;
pub mod logging;
pub mod model;
pub mod service;

pub use kv::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
    RECORDS_KEY, THEME_KEY,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::record::{
    validate_draft, DraftValidationError, NewRecord, Record, RecordId, RecordPatch,
};
pub use model::theme::{StatusBarStyle, ThemeName, ThemeObject, ThemeSnapshot, DEFAULT_THEME};
pub use service::record_store::{
    sample_records, RecordLoadSource, RecordStore, RecordStoreError, RecordStoreResult,
};
pub use service::theme_preference::{ThemeError, ThemeLoadSource, ThemePreference};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
