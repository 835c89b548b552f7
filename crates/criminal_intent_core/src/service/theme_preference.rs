//! Selected theme container with write-through persistence.
//!
//! # Invariants
//! - The in-memory selection is always a palette entry.
//! - Absent or unknown stored names are replaced by `DEFAULT_THEME`, which
//!   is then written back.

use crate::kv::{KeyValueStore, StorageError, THEME_KEY};
use crate::model::theme::{ThemeName, ThemeSnapshot, DEFAULT_THEME};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Where the selection came from during [`ThemePreference::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeLoadSource {
    Stored,
    /// Nothing valid was stored; the default was adopted and written back.
    Defaulted,
    /// Storage read failed; the default is held in memory only.
    Recovered,
}

#[derive(Debug)]
pub enum ThemeError {
    /// Name is not a palette key; selection unchanged.
    UnknownTheme(String),
    /// Selection changed in memory but storage rejected the write.
    NotPersisted {
        snapshot: ThemeSnapshot,
        source: StorageError,
    },
}

impl Display for ThemeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTheme(name) => write!(f, "unknown theme: `{name}`"),
            Self::NotPersisted { snapshot, source } => {
                write!(f, "theme {} selected in memory only: {source}", snapshot.name)
            }
        }
    }
}

impl Error for ThemeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UnknownTheme(_) => None,
            Self::NotPersisted { source, .. } => Some(source),
        }
    }
}

/// Authoritative theme selection bound to one key-value backend.
pub struct ThemePreference<S: KeyValueStore> {
    storage: S,
    selected: ThemeName,
    load_source: ThemeLoadSource,
}

impl<S: KeyValueStore> ThemePreference<S> {
    /// Builds the preference from `storage`, defaulting when needed.
    pub fn load(storage: S) -> Self {
        let (selected, load_source) = match storage.get(THEME_KEY) {
            Ok(raw) => match raw.as_deref().and_then(ThemeName::parse) {
                Some(name) => {
                    info!("event=theme_load module=theme status=ok source=stored theme={name}");
                    (name, ThemeLoadSource::Stored)
                }
                None => {
                    if raw.is_some() {
                        warn!(
                            "event=theme_load module=theme status=invalid_value fallback={DEFAULT_THEME}"
                        );
                    }
                    match storage.set(THEME_KEY, DEFAULT_THEME.as_str()) {
                        Ok(()) => info!(
                            "event=theme_load module=theme status=ok source=defaulted theme={DEFAULT_THEME}"
                        ),
                        Err(err) => warn!(
                            "event=theme_load module=theme status=degraded source=defaulted error={err}"
                        ),
                    }
                    (DEFAULT_THEME, ThemeLoadSource::Defaulted)
                }
            },
            Err(err) => {
                error!("event=theme_load module=theme status=error source=recovered error={err}");
                (DEFAULT_THEME, ThemeLoadSource::Recovered)
            }
        };

        Self {
            storage,
            selected,
            load_source,
        }
    }

    pub fn load_source(&self) -> ThemeLoadSource {
        self.load_source
    }

    /// Derived attributes of the current selection. No I/O.
    pub fn current(&self) -> ThemeSnapshot {
        ThemeSnapshot::from(self.selected)
    }

    /// Every selectable theme in palette order.
    pub fn palette(&self) -> Vec<ThemeSnapshot> {
        ThemeName::ALL.into_iter().map(ThemeSnapshot::from).collect()
    }

    /// Selects `name` and persists it.
    ///
    /// # Errors
    /// - `UnknownTheme` for names outside the palette; nothing changes.
    /// - `NotPersisted` when the write fails; memory keeps the new theme.
    pub fn select(&mut self, name: &str) -> Result<ThemeSnapshot, ThemeError> {
        let Some(theme) = ThemeName::parse(name) else {
            debug!("event=theme_select module=theme status=rejected");
            return Err(ThemeError::UnknownTheme(name.to_string()));
        };

        self.selected = theme;
        let snapshot = self.current();
        match self.storage.set(THEME_KEY, theme.as_str()) {
            Ok(()) => {
                info!("event=theme_select module=theme status=ok theme={theme}");
                Ok(snapshot)
            }
            Err(err) => {
                error!("event=theme_select module=theme status=error theme={theme} error={err}");
                Err(ThemeError::NotPersisted {
                    snapshot,
                    source: err,
                })
            }
        }
    }
}
