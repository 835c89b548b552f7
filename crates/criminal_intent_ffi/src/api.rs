//! FFI use-case API for the mobile UI shell.
//!
//! # Responsibility
//! - Expose list/detail/settings use-cases as sync functions.
//! - Validate form drafts before they reach the record store.
//! - Own the process-wide session that keeps loaded state between calls.
//!
//! # Invariants
//! - Containers are loaded once per process; memory stays the source of
//!   truth after a failed read or write for the rest of the session.
//! - Exported functions must not panic across the FFI boundary.
//! - "Saved in memory only" outcomes are reported as `ok=true,
//!   persisted=false`, never as plain success.

use criminal_intent_core::db::{db_path_from_env, open_db};
use criminal_intent_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    validate_draft, KeyValueStore, NewRecord, Record, RecordPatch, RecordStore, RecordStoreError,
    RecordStoreResult, SqliteKeyValueStore, ThemeError, ThemeName, ThemePreference,
    ThemeSnapshot, DEFAULT_THEME,
};
use log::{info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

type SqliteSession = Session<SqliteKeyValueStore<Connection>>;

static SESSION: Mutex<Option<SqliteSession>> = Mutex::new(None);

/// Minimal health-check API.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Core crate version.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and an error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Flat record shape for list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordItem {
    pub id: String,
    pub title: String,
    pub details: String,
    /// ISO-8601 timestamp.
    pub date: String,
    pub photo: Option<String>,
    pub solved: bool,
}

impl From<Record> for RecordItem {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            title: record.title,
            details: record.details,
            date: record.date,
            photo: record.photo,
            solved: record.solved,
        }
    }
}

/// List screen envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordListResponse {
    /// Newest first.
    pub items: Vec<RecordItem>,
    pub message: String,
}

/// Result envelope for record create/update flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordActionResponse {
    pub ok: bool,
    /// Whether the change reached storage. Meaningful only when `ok`.
    pub persisted: bool,
    pub record: Option<RecordItem>,
    pub message: String,
}

impl RecordActionResponse {
    fn from_result(action: &str, result: RecordStoreResult<Record>) -> Self {
        match result {
            Ok(record) => Self {
                ok: true,
                persisted: true,
                record: Some(record.into()),
                message: format!("Record {action}."),
            },
            Err(RecordStoreError::NotPersisted { record, source }) => Self {
                ok: true,
                persisted: false,
                record: Some((*record).into()),
                message: format!("Record {action} in memory only: {source}"),
            },
            Err(err) => Self::failure(err.to_string()),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            persisted: false,
            record: None,
            message: message.into(),
        }
    }
}

/// Theme attributes for settings and chrome rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeItem {
    pub name: String,
    /// `#RRGGBB`.
    pub color: String,
    /// `light|dark|auto`.
    pub status_bar: String,
    pub is_light: bool,
}

impl From<ThemeSnapshot> for ThemeItem {
    fn from(snapshot: ThemeSnapshot) -> Self {
        Self {
            name: snapshot.name.as_str().to_string(),
            color: snapshot.color.to_string(),
            status_bar: snapshot.status_bar.as_str().to_string(),
            is_light: snapshot.is_light,
        }
    }
}

/// Result envelope for theme selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeActionResponse {
    pub ok: bool,
    pub persisted: bool,
    /// Selection in effect after the call.
    pub theme: Option<ThemeItem>,
    pub message: String,
}

/// Lists all records, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn records_list() -> RecordListResponse {
    with_session(|session| session.records_list()).unwrap_or_else(|err| RecordListResponse {
        items: Vec::new(),
        message: format!("records_list failed: {err}"),
    })
}

/// Loads one record for the detail screen.
#[flutter_rust_bridge::frb(sync)]
pub fn record_get(id: String) -> Option<RecordItem> {
    with_session(|session| session.record_get(&id))
        .ok()
        .flatten()
}

/// Creates a record from the detail form.
///
/// # FFI contract
/// - Rejects blank titles and non ISO-8601 dates without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn record_add(
    title: String,
    details: String,
    date: String,
    photo: Option<String>,
    solved: bool,
) -> RecordActionResponse {
    let draft = NewRecord {
        title,
        details,
        date,
        photo,
        solved,
    };
    with_session(|session| session.record_add(draft))
        .unwrap_or_else(|err| RecordActionResponse::failure(format!("record_add failed: {err}")))
}

/// Replaces every editable field of an existing record from the detail form.
#[flutter_rust_bridge::frb(sync)]
pub fn record_update(
    id: String,
    title: String,
    details: String,
    date: String,
    photo: Option<String>,
    solved: bool,
) -> RecordActionResponse {
    let draft = NewRecord {
        title,
        details,
        date,
        photo,
        solved,
    };
    with_session(|session| session.record_update(&id, draft)).unwrap_or_else(|err| {
        RecordActionResponse::failure(format!("record_update failed: {err}"))
    })
}

/// Toggles only the solved flag (list checkbox).
#[flutter_rust_bridge::frb(sync)]
pub fn record_set_solved(id: String, solved: bool) -> RecordActionResponse {
    with_session(|session| session.record_set_solved(&id, solved)).unwrap_or_else(|err| {
        RecordActionResponse::failure(format!("record_set_solved failed: {err}"))
    })
}

/// Returns the active theme. Falls back to the default when the session
/// cannot be opened.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_current() -> ThemeItem {
    with_session(|session| session.theme_current()).unwrap_or_else(|err| {
        warn!("event=theme_current module=ffi status=degraded error={err}");
        ThemeSnapshot::from(DEFAULT_THEME).into()
    })
}

/// Lists the selectable palette for the settings screen.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_palette() -> Vec<ThemeItem> {
    ThemeName::ALL
        .into_iter()
        .map(|name| ThemeSnapshot::from(name).into())
        .collect()
}

/// Selects a theme by palette name.
#[flutter_rust_bridge::frb(sync)]
pub fn theme_select(name: String) -> ThemeActionResponse {
    with_session(|session| session.theme_select(&name)).unwrap_or_else(|err| {
        ThemeActionResponse {
            ok: false,
            persisted: false,
            theme: None,
            message: format!("theme_select failed: {err}"),
        }
    })
}

/// Loaded containers kept alive for the whole process.
struct Session<S: KeyValueStore> {
    records: RecordStore<S>,
    theme: ThemePreference<S>,
}

impl SqliteSession {
    /// Opens one connection per container on the same database file.
    fn open(path: &Path) -> Result<Self, String> {
        let records_conn = open_db(path).map_err(|err| format!("DB open failed: {err}"))?;
        let theme_conn = open_db(path).map_err(|err| format!("DB open failed: {err}"))?;
        let session = Self::load(
            SqliteKeyValueStore::new(records_conn),
            SqliteKeyValueStore::new(theme_conn),
        );
        info!(
            "event=session_open module=ffi status=ok records={} theme={}",
            session.records.len(),
            session.theme.current().name
        );
        Ok(session)
    }
}

impl<S: KeyValueStore> Session<S> {
    fn load(records_storage: S, theme_storage: S) -> Self {
        Self {
            records: RecordStore::load(records_storage),
            theme: ThemePreference::load(theme_storage),
        }
    }

    fn records_list(&self) -> RecordListResponse {
        let records = self.records.records();
        RecordListResponse {
            message: format!("{} record(s).", records.len()),
            items: records.iter().cloned().map(RecordItem::from).collect(),
        }
    }

    fn record_get(&self, id: &str) -> Option<RecordItem> {
        self.records
            .get_by_id(id.trim())
            .cloned()
            .map(RecordItem::from)
    }

    fn record_add(&mut self, draft: NewRecord) -> RecordActionResponse {
        match validate_draft(draft) {
            Ok(draft) => RecordActionResponse::from_result("created", self.records.add(draft)),
            Err(err) => RecordActionResponse::failure(format!("record_add rejected: {err}")),
        }
    }

    fn record_update(&mut self, id: &str, draft: NewRecord) -> RecordActionResponse {
        match validate_draft(draft) {
            Ok(draft) => RecordActionResponse::from_result(
                "updated",
                self.records
                    .update(id.trim(), RecordPatch::replace_all(draft)),
            ),
            Err(err) => RecordActionResponse::failure(format!("record_update rejected: {err}")),
        }
    }

    fn record_set_solved(&mut self, id: &str, solved: bool) -> RecordActionResponse {
        let patch = RecordPatch {
            solved: Some(solved),
            ..RecordPatch::default()
        };
        RecordActionResponse::from_result("updated", self.records.update(id.trim(), patch))
    }

    fn theme_current(&self) -> ThemeItem {
        self.theme.current().into()
    }

    fn theme_select(&mut self, name: &str) -> ThemeActionResponse {
        match self.theme.select(name) {
            Ok(snapshot) => ThemeActionResponse {
                ok: true,
                persisted: true,
                theme: Some(snapshot.into()),
                message: format!("Theme set to {}.", snapshot.name),
            },
            Err(ThemeError::NotPersisted { snapshot, source }) => ThemeActionResponse {
                ok: true,
                persisted: false,
                theme: Some(snapshot.into()),
                message: format!("Theme set to {} in memory only: {source}", snapshot.name),
            },
            Err(err) => ThemeActionResponse {
                ok: false,
                persisted: false,
                theme: Some(self.theme.current().into()),
                message: format!("theme_select rejected: {err}"),
            },
        }
    }
}

/// Runs `f` against the process session, opening it on first use.
///
/// A failed open is not cached; the next call retries.
fn with_session<T>(f: impl FnOnce(&mut SqliteSession) -> T) -> Result<T, String> {
    let mut guard = SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if guard.is_none() {
        *guard = Some(SqliteSession::open(&db_path_from_env())?);
    }
    guard
        .as_mut()
        .map(f)
        .ok_or_else(|| "session unavailable".to_string())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, record_add, record_get, record_set_solved,
        record_update, records_list, theme_current, theme_palette, theme_select, Session,
    };
    use criminal_intent_core::{
        KeyValueStore, MemoryKeyValueStore, NewRecord, StorageError, StorageResult, RECORDS_KEY,
        THEME_KEY,
    };
    use std::cell::Cell;

    const DATE: &str = "2025-03-01T10:00:00.000Z";

    /// Memory backend whose writes can be switched off mid-session.
    #[derive(Default)]
    struct FlakyBackend {
        inner: MemoryKeyValueStore,
        fail_writes: Cell<bool>,
    }

    impl KeyValueStore for FlakyBackend {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            if self.fail_writes.get() {
                return Err(StorageError::backend(key, "disk full"));
            }
            self.inner.set(key, value)
        }
    }

    fn draft(title: &str) -> NewRecord {
        NewRecord {
            title: title.to_string(),
            date: DATE.to_string(),
            ..NewRecord::default()
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "tmp/logs".to_string()).is_empty());
    }

    #[test]
    fn recovered_session_keeps_listed_ids_addressable() {
        let backend = FlakyBackend::default();
        backend.inner.set(RECORDS_KEY, "{corrupt").unwrap();
        let mut session = Session::load(&backend, &backend);

        let first: Vec<_> = session.records_list().items.into_iter().map(|i| i.id).collect();
        let second: Vec<_> = session.records_list().items.into_iter().map(|i| i.id).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);

        assert!(session.record_get(&first[0]).is_some());
        let solved = session.record_set_solved(&first[0], true);
        assert!(solved.ok, "{}", solved.message);
        assert!(session.record_get(&first[0]).expect("record").solved);
    }

    #[test]
    fn unpersisted_add_stays_listed_for_the_session() {
        let backend = FlakyBackend::default();
        let mut session = Session::load(&backend, &backend);
        backend.fail_writes.set(true);

        let response = session.record_add(draft("Shoplifting"));

        assert!(response.ok, "{}", response.message);
        assert!(!response.persisted);
        let id = response.record.expect("record in response").id;
        assert!(session.records_list().items.iter().any(|item| item.id == id));
        assert_eq!(
            session.record_get(&id).map(|item| item.title).as_deref(),
            Some("Shoplifting")
        );
    }

    #[test]
    fn unpersisted_update_is_reported_and_kept() {
        let backend = FlakyBackend::default();
        let mut session = Session::load(&backend, &backend);
        let id = session.records_list().items[0].id.clone();
        backend.fail_writes.set(true);

        let response = session.record_update(&id, draft("Renamed offline"));

        assert!(response.ok && !response.persisted, "{}", response.message);
        assert_eq!(session.record_get(&id).expect("record").title, "Renamed offline");
    }

    #[test]
    fn unpersisted_theme_select_stays_current() {
        let backend = FlakyBackend::default();
        let mut session = Session::load(&backend, &backend);
        backend.fail_writes.set(true);

        let response = session.theme_select("red");

        assert!(response.ok, "{}", response.message);
        assert!(!response.persisted);
        assert_eq!(session.theme_current().name, "red");
        assert_eq!(backend.inner.get(THEME_KEY).unwrap().as_deref(), Some("purple"));
    }

    #[test]
    fn session_rejects_invalid_drafts_and_unknown_themes() {
        let backend = FlakyBackend::default();
        let mut session = Session::load(&backend, &backend);

        let blank = session.record_add(draft("   "));
        assert!(!blank.ok);
        assert!(blank.message.contains("title"));

        let rejected = session.theme_select("not-a-real-theme");
        assert!(!rejected.ok);
        assert_eq!(rejected.theme.expect("current theme").name, "purple");
    }

    #[test]
    fn record_add_then_get_and_list() {
        let title = unique_token("add");
        let created = record_add(
            format!("  {title}  "),
            "seen near the station".to_string(),
            DATE.to_string(),
            None,
            false,
        );
        assert!(created.ok, "{}", created.message);
        assert!(created.persisted);
        let item = created.record.expect("created record");
        assert_eq!(item.title, title);

        assert_eq!(record_get(item.id.clone()), Some(item.clone()));
        let listed = records_list();
        assert!(listed.items.iter().any(|listed| listed.id == item.id));
    }

    #[test]
    fn record_add_rejects_blank_title() {
        let response = record_add(
            "   ".to_string(),
            String::new(),
            DATE.to_string(),
            None,
            false,
        );
        assert!(!response.ok);
        assert!(response.message.contains("title"));
    }

    #[test]
    fn record_update_and_set_solved_edit_existing_record() {
        let created = record_add(
            unique_token("update"),
            String::new(),
            DATE.to_string(),
            None,
            false,
        );
        let id = created.record.expect("created record").id;

        let updated = record_update(
            id.clone(),
            "Renamed".to_string(),
            "new details".to_string(),
            DATE.to_string(),
            Some("file:///scene.jpg".to_string()),
            false,
        );
        assert!(updated.ok, "{}", updated.message);

        let solved = record_set_solved(id.clone(), true);
        assert!(solved.ok, "{}", solved.message);
        let record = record_get(id).expect("record exists");
        assert_eq!(record.title, "Renamed");
        assert_eq!(record.photo.as_deref(), Some("file:///scene.jpg"));
        assert!(record.solved);
    }

    #[test]
    fn record_set_solved_reports_unknown_id() {
        let response = record_set_solved(unique_token("missing"), true);
        assert!(!response.ok);
        assert!(response.message.contains("not found"));
    }

    #[test]
    fn theme_select_rejects_unknown_and_accepts_palette_names() {
        let rejected = theme_select("not-a-real-theme".to_string());
        assert!(!rejected.ok);

        let accepted = theme_select("white".to_string());
        assert!(accepted.ok, "{}", accepted.message);
        let theme = accepted.theme.expect("theme in response");
        assert_eq!(theme.color, "#FFFFFF");
        assert_eq!(theme.status_bar, "dark");
        assert!(theme.is_light);
        assert_eq!(theme_current().name, "white");
    }

    #[test]
    fn theme_palette_has_seven_entries() {
        assert_eq!(theme_palette().len(), 7);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }
}
