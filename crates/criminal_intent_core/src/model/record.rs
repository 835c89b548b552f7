//! Incident record model.
//!
//! # Responsibility
//! - Define the persisted record shape (`id/title/details/date/photo/solved`).
//! - Provide creation input, partial patch and draft validation helpers.
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - JSON field names match the persisted array format exactly.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static ISO_8601_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$")
        .expect("valid iso-8601 regex")
});

/// Opaque record identifier.
///
/// Fresh ids are UUID v4 strings, but any string loaded from storage is kept
/// verbatim.
pub type RecordId = String;

/// Generates a fresh record id.
pub fn new_record_id() -> RecordId {
    Uuid::new_v4().to_string()
}

/// One incident entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub details: String,
    /// ISO-8601 timestamp chosen by the user.
    pub date: String,
    /// Local image URI, serialized as `null` when absent.
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub solved: bool,
}

impl Record {
    /// Builds a record from creation input with a freshly generated id.
    pub fn from_new(data: NewRecord) -> Self {
        Self::with_id(new_record_id(), data)
    }

    /// Builds a record with a caller-provided id.
    pub fn with_id(id: impl Into<RecordId>, data: NewRecord) -> Self {
        Self {
            id: id.into(),
            title: data.title,
            details: data.details,
            date: data.date,
            photo: data.photo,
            solved: data.solved,
        }
    }

    /// Merges every field set in `patch` over this record.
    pub fn apply(&mut self, patch: RecordPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(details) = patch.details {
            self.details = details;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(photo) = patch.photo {
            self.photo = photo;
        }
        if let Some(solved) = patch.solved {
            self.solved = solved;
        }
    }
}

/// Record contents without an id, as submitted for creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub details: String,
    pub date: String,
    pub photo: Option<String>,
    pub solved: bool,
}

/// Partial field replacement for an existing record.
///
/// `None` keeps the current value. `photo: Some(None)` clears the photo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub title: Option<String>,
    pub details: Option<String>,
    pub date: Option<String>,
    pub photo: Option<Option<String>>,
    pub solved: Option<bool>,
}

impl RecordPatch {
    /// Patch replacing every editable field with the draft's values.
    pub fn replace_all(draft: NewRecord) -> Self {
        Self {
            title: Some(draft.title),
            details: Some(draft.details),
            date: Some(draft.date),
            photo: Some(draft.photo),
            solved: Some(draft.solved),
        }
    }
}

/// Rejected form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    EmptyTitle,
    InvalidDate(String),
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "record title must not be empty"),
            Self::InvalidDate(value) => write!(f, "record date is not ISO-8601: `{value}`"),
        }
    }
}

impl Error for DraftValidationError {}

/// Normalizes and checks form input before it reaches the store.
///
/// Rules:
/// - `title` and `details` are trimmed; an empty title is rejected.
/// - `date` must look like `YYYY-MM-DDTHH:MM:SS[.fff](Z|+HH:MM)`.
/// - An empty photo URI is treated as no photo.
pub fn validate_draft(draft: NewRecord) -> Result<NewRecord, DraftValidationError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(DraftValidationError::EmptyTitle);
    }

    let date = draft.date.trim().to_string();
    if !ISO_8601_RE.is_match(&date) {
        return Err(DraftValidationError::InvalidDate(date));
    }

    let photo = draft
        .photo
        .map(|uri| uri.trim().to_string())
        .filter(|uri| !uri.is_empty());

    Ok(NewRecord {
        title,
        details: draft.details.trim().to_string(),
        date,
        photo,
        solved: draft.solved,
    })
}

#[cfg(test)]
mod tests {
    use super::{validate_draft, DraftValidationError, NewRecord, Record, RecordPatch};

    fn draft(title: &str, date: &str) -> NewRecord {
        NewRecord {
            title: title.to_string(),
            date: date.to_string(),
            ..NewRecord::default()
        }
    }

    #[test]
    fn json_shape_uses_null_for_missing_photo() {
        let record = Record::with_id("r1", draft("Stolen bike", "2025-01-30T13:13:43.639Z"));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "r1");
        assert!(json["photo"].is_null());
        assert_eq!(json["solved"], false);
    }

    #[test]
    fn legacy_payload_without_optional_fields_parses() {
        let record: Record = serde_json::from_str(
            r#"{"id":"1","title":"Test Crime 1","date":"2025-01-30T13:13:43.639Z"}"#,
        )
        .unwrap();

        assert_eq!(record.details, "");
        assert_eq!(record.photo, None);
        assert!(!record.solved);
    }

    #[test]
    fn patch_can_clear_photo_and_keeps_unset_fields() {
        let mut record = Record::with_id(
            "r1",
            NewRecord {
                photo: Some("file:///a.jpg".to_string()),
                ..draft("Title", "2025-01-30T13:13:43.639Z")
            },
        );

        record.apply(RecordPatch {
            photo: Some(None),
            ..RecordPatch::default()
        });

        assert_eq!(record.photo, None);
        assert_eq!(record.title, "Title");
    }

    #[test]
    fn fresh_ids_differ() {
        let a = Record::from_new(NewRecord::default());
        let b = Record::from_new(NewRecord::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn validate_draft_trims_and_rejects_blank_title() {
        let err = validate_draft(draft("   ", "2025-01-30T13:13:43.639Z")).unwrap_err();
        assert_eq!(err, DraftValidationError::EmptyTitle);

        let ok = validate_draft(NewRecord {
            details: "  seen at night \n".to_string(),
            photo: Some("  ".to_string()),
            ..draft("  Vandalism ", "2025-01-30T13:13:43+02:00")
        })
        .unwrap();
        assert_eq!(ok.title, "Vandalism");
        assert_eq!(ok.details, "seen at night");
        assert_eq!(ok.photo, None);
    }

    #[test]
    fn validate_draft_rejects_non_iso_date() {
        let err = validate_draft(draft("Title", "30/01/2025")).unwrap_err();
        assert!(matches!(err, DraftValidationError::InvalidDate(value) if value == "30/01/2025"));
    }
}
