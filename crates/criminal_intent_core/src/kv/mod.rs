//! Key-value persistence contract shared by the state containers.
//!
//! # Responsibility
//! - Define the two-operation storage seam (`get` / `set`).
//! - Provide SQLite-backed and in-memory implementations.
//!
//! # Invariants
//! - Values are opaque UTF-8 strings; callers own (de)serialization.
//! - `set` replaces any previous value for the key.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Storage key holding the JSON array of records.
pub const RECORDS_KEY: &str = "@criminal_intent_crimes";
/// Storage key holding the raw selected theme name.
pub const THEME_KEY: &str = "@criminal_intent_theme";

pub type StorageResult<T> = Result<T, StorageError>;

/// Failure reported by a key-value backend or by payload (de)serialization.
#[derive(Debug)]
pub enum StorageError {
    /// Backend I/O failed while reading or writing `key`.
    Backend { key: String, message: String },
    /// Stored payload under `key` could not be decoded or encoded.
    Serialization {
        key: String,
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Builds a backend error from any displayable cause.
    pub fn backend(key: &str, cause: impl Display) -> Self {
        Self::Backend {
            key: key.to_string(),
            message: cause.to_string(),
        }
    }

    /// Key the failed operation was addressed to.
    pub fn key(&self) -> &str {
        match self {
            Self::Backend { key, .. } | Self::Serialization { key, .. } => key,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend { key, message } => {
                write!(f, "storage backend failed for `{key}`: {message}")
            }
            Self::Serialization { key, source } => {
                write!(f, "invalid payload for `{key}`: {source}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend { .. } => None,
            Self::Serialization { source, .. } => Some(source),
        }
    }
}

/// Durable string storage addressed by key.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when never written.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for &K {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }
}
