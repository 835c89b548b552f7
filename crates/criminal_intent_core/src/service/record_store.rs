//! Record collection container with write-through persistence.
//!
//! # Responsibility
//! - Own the canonical in-memory list of records (newest first).
//! - Write the full collection to [`RECORDS_KEY`] after every mutation.
//! - Recover from unreadable storage by falling back to sample records.
//!
//! # Invariants
//! - Record ids are unique within the collection.
//! - After a successful mutation, storage holds exactly the in-memory list.
//! - A failed write never rolls back memory; it is reported as
//!   `RecordStoreError::NotPersisted`.

use crate::kv::{KeyValueStore, StorageError, StorageResult, RECORDS_KEY};
use crate::model::record::{new_record_id, NewRecord, Record, RecordPatch};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordStoreResult<T> = Result<T, RecordStoreError>;

/// Where the collection came from during [`RecordStore::load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordLoadSource {
    /// Parsed from storage.
    Stored,
    /// Storage was empty; sample records were created and persisted.
    Seeded,
    /// Storage was unreadable; sample records are held in memory only.
    Recovered,
}

/// Error for record store operations.
#[derive(Debug)]
pub enum RecordStoreError {
    /// No record carries the requested id; nothing changed.
    NotFound(String),
    /// The change is live in memory but storage rejected the write.
    NotPersisted {
        record: Box<Record>,
        source: StorageError,
    },
}

impl Display for RecordStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::NotPersisted { record, source } => {
                write!(f, "record {} saved in memory only: {source}", record.id)
            }
        }
    }
}

impl Error for RecordStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::NotPersisted { source, .. } => Some(source),
        }
    }
}

/// Authoritative record collection bound to one key-value backend.
pub struct RecordStore<S: KeyValueStore> {
    storage: S,
    records: Vec<Record>,
    load_source: RecordLoadSource,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Builds the store from whatever `storage` currently holds.
    ///
    /// Never fails: missing data seeds the sample set, unreadable data falls
    /// back to an unpersisted sample set.
    pub fn load(storage: S) -> Self {
        match read_records(&storage) {
            Ok(Some(records)) => {
                let duplicates = count_duplicate_ids(&records);
                if duplicates > 0 {
                    warn!(
                        "event=records_load module=record_store status=duplicate_ids duplicates={duplicates}"
                    );
                }
                info!(
                    "event=records_load module=record_store status=ok source=stored count={}",
                    records.len()
                );
                Self {
                    storage,
                    records,
                    load_source: RecordLoadSource::Stored,
                }
            }
            Ok(None) => {
                let store = Self {
                    storage,
                    records: sample_records(),
                    load_source: RecordLoadSource::Seeded,
                };
                match store.persist() {
                    Ok(()) => info!(
                        "event=records_load module=record_store status=ok source=seeded count={}",
                        store.records.len()
                    ),
                    Err(err) => warn!(
                        "event=records_load module=record_store status=degraded source=seeded error={err}"
                    ),
                }
                store
            }
            Err(err) => {
                error!(
                    "event=records_load module=record_store status=error source=recovered error={err}"
                );
                Self {
                    storage,
                    records: sample_records(),
                    load_source: RecordLoadSource::Recovered,
                }
            }
        }
    }

    pub fn load_source(&self) -> RecordLoadSource {
        self.load_source
    }

    /// Read-only snapshot, newest record first.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up a record by id without touching storage.
    pub fn get_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Creates a record with a fresh id, prepends it and persists the list.
    ///
    /// # Errors
    /// - `NotPersisted` when the write fails; the record stays in memory.
    pub fn add(&mut self, data: NewRecord) -> RecordStoreResult<Record> {
        let mut id = new_record_id();
        while self.get_by_id(&id).is_some() {
            id = new_record_id();
        }
        let record = Record::with_id(id, data);

        self.records.insert(0, record.clone());
        self.commit("record_add", record)
    }

    /// Merges `patch` over the record with `id` and persists the list.
    ///
    /// # Errors
    /// - `NotFound` when no record has `id`; no write is attempted.
    /// - `NotPersisted` when the write fails; the merge stays in memory.
    pub fn update(&mut self, id: &str, patch: RecordPatch) -> RecordStoreResult<Record> {
        let Some(record) = self.records.iter_mut().find(|record| record.id == id) else {
            debug!("event=record_update module=record_store status=not_found id={id}");
            return Err(RecordStoreError::NotFound(id.to_string()));
        };

        record.apply(patch);
        let updated = record.clone();
        self.commit("record_update", updated)
    }

    fn commit(&self, event: &str, record: Record) -> RecordStoreResult<Record> {
        match self.persist() {
            Ok(()) => {
                info!(
                    "event={event} module=record_store status=ok id={} count={}",
                    record.id,
                    self.records.len()
                );
                Ok(record)
            }
            Err(err) => {
                error!(
                    "event={event} module=record_store status=error id={} error={err}",
                    record.id
                );
                Err(RecordStoreError::NotPersisted {
                    record: Box::new(record),
                    source: err,
                })
            }
        }
    }

    fn persist(&self) -> StorageResult<()> {
        let payload =
            serde_json::to_string(&self.records).map_err(|source| StorageError::Serialization {
                key: RECORDS_KEY.to_string(),
                source,
            })?;
        self.storage.set(RECORDS_KEY, &payload)
    }
}

fn read_records(storage: &impl KeyValueStore) -> StorageResult<Option<Vec<Record>>> {
    // A blank value counts as never written.
    let Some(payload) = storage
        .get(RECORDS_KEY)?
        .filter(|payload| !payload.trim().is_empty())
    else {
        return Ok(None);
    };
    serde_json::from_str(&payload)
        .map(Some)
        .map_err(|source| StorageError::Serialization {
            key: RECORDS_KEY.to_string(),
            source,
        })
}

/// Number of records whose id already appeared earlier in `records`.
fn count_duplicate_ids(records: &[Record]) -> usize {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| !seen.insert(record.id.as_str()))
        .count()
}

/// Sample collection used on first launch, each with a fresh id.
pub fn sample_records() -> Vec<Record> {
    [
        ("1", "2025-01-30T13:13:43.639Z"),
        ("2", "2025-01-24T21:44:40.415Z"),
        ("3", "2025-01-03T02:14:54.649Z"),
    ]
    .into_iter()
    .map(|(n, date)| {
        Record::from_new(NewRecord {
            title: format!("Test Crime {n}"),
            details: format!("Details about criminal activity {n}"),
            date: date.to_string(),
            photo: None,
            solved: false,
        })
    })
    .collect()
}
