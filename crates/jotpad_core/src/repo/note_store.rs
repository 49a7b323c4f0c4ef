//! Note store: the in-memory note list mirrored to one key-value slot.
//!
//! # Responsibility
//! - Load the persisted list once at startup.
//! - Rewrite the whole slot after every mutation.
//! - Own the JSON codec for the slot value.
//!
//! # Invariants
//! - After `save` returns, `notes()` equals the list handed to storage.
//! - Load and save failures are logged and reported, never raised as panics.
//! - The in-memory list stays authoritative when a write fails.
//! - A corrupt slot value is copied to a free backup slot (`CORRUPT_BACKUP_KEY`,
//!   then `CORRUPT_BACKUP_KEY.1`, `.2`, ...) before the store starts empty.
//!   Earlier backups are never overwritten.

use crate::model::note::Note;
use crate::repo::kv_repo::{KeyValueStore, RepoError, RepoResult};
use crate::repo::save_worker::{SaveTicket, SaveWorker};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed slot holding the JSON array of notes.
pub const NOTES_STORAGE_KEY: &str = "notes";
/// First slot receiving an unreadable `notes` value before it can be overwritten.
pub const CORRUPT_BACKUP_KEY: &str = "notes.corrupt";
// Numbered backup slots tried after `CORRUPT_BACKUP_KEY` is taken.
const MAX_BACKUP_SLOTS: u32 = 1000;

/// JSON encode/decode failure for the notes slot.
#[derive(Debug)]
pub struct NoteCodecError(serde_json::Error);

impl Display for NoteCodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for NoteCodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl From<serde_json::Error> for NoteCodecError {
    fn from(value: serde_json::Error) -> Self {
        Self(value)
    }
}

/// Encodes the ordered list as the slot's JSON array.
pub fn serialize_notes(notes: &[Note]) -> Result<String, NoteCodecError> {
    Ok(serde_json::to_string(notes)?)
}

/// Decodes the slot's JSON array, preserving order.
pub fn deserialize_notes(payload: &str) -> Result<Vec<Note>, NoteCodecError> {
    Ok(serde_json::from_str(payload)?)
}

/// What startup found in the notes slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No value stored yet.
    Missing,
    Loaded { count: usize },
    /// A value exists but is not a valid note array. `backup_key` names the
    /// slot now holding the raw value, `None` when the copy failed.
    Corrupted {
        error: String,
        backup_key: Option<String>,
    },
    /// The backend could not be read.
    Unreadable { error: String },
}

impl LoadOutcome {
    /// `true` when startup discarded data or could not read it.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Corrupted { .. } | Self::Unreadable { .. })
    }
}

/// Ordered note list plus its persistence pipeline.
pub struct NoteStore {
    notes: Vec<Note>,
    load_outcome: LoadOutcome,
    writer: SaveWorker,
}

impl NoteStore {
    /// Reads the notes slot from `store`, then hands `store` to the writer.
    ///
    /// Never fails: unreadable or corrupt data yields an empty list and a
    /// degraded [`LoadOutcome`].
    pub fn load<S>(mut store: S) -> Self
    where
        S: KeyValueStore + Send + 'static,
    {
        let (notes, load_outcome) = read_slot(&mut store);
        Self {
            notes,
            load_outcome,
            writer: SaveWorker::spawn(store),
        }
    }

    /// Current ordered list in display order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub(crate) fn len(&self) -> usize {
        self.notes.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Note> {
        self.notes.get(index)
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    /// Replaces the list and queues a full rewrite of the slot.
    ///
    /// The returned ticket reports the write outcome; ignoring it keeps the
    /// fire-and-forget behavior.
    pub fn save(&mut self, notes: Vec<Note>) -> SaveTicket {
        self.notes = notes;
        match serialize_notes(&self.notes) {
            Ok(payload) => self.writer.submit(NOTES_STORAGE_KEY, payload),
            Err(err) => {
                error!(
                    "event=notes_save module=store status=error count={} error_code=encode_failed error={err}",
                    self.notes.len()
                );
                self.writer.reject(err.into())
            }
        }
    }

    /// Blocks until every queued write has been applied.
    pub fn flush(&self) {
        self.writer.flush();
    }
}

fn read_slot<S: KeyValueStore>(store: &mut S) -> (Vec<Note>, LoadOutcome) {
    let payload = match store.get_item(NOTES_STORAGE_KEY) {
        Ok(Some(payload)) => payload,
        Ok(None) => {
            info!("event=notes_load module=store status=ok count=0 slot=missing");
            return (Vec::new(), LoadOutcome::Missing);
        }
        Err(err) => {
            error!("event=notes_load module=store status=error error_code=read_failed error={err}");
            return (
                Vec::new(),
                LoadOutcome::Unreadable {
                    error: err.to_string(),
                },
            );
        }
    };

    match deserialize_notes(&payload) {
        Ok(notes) => {
            info!(
                "event=notes_load module=store status=ok count={} bytes={}",
                notes.len(),
                payload.len()
            );
            let count = notes.len();
            (notes, LoadOutcome::Loaded { count })
        }
        Err(err) => {
            error!(
                "event=notes_load module=store status=error error_code=decode_failed bytes={} error={err}",
                payload.len()
            );
            let backup_key = match back_up_payload(store, &payload) {
                Ok(key) => {
                    info!("event=notes_backup module=store status=ok key={key}");
                    Some(key)
                }
                Err(backup_err) => {
                    warn!("event=notes_backup module=store status=error error={backup_err}");
                    None
                }
            };
            (
                Vec::new(),
                LoadOutcome::Corrupted {
                    error: err.to_string(),
                    backup_key,
                },
            )
        }
    }
}

/// Copies `payload` into the first free backup slot and returns its key.
fn back_up_payload<S: KeyValueStore>(store: &mut S, payload: &str) -> RepoResult<String> {
    let candidates = std::iter::once(CORRUPT_BACKUP_KEY.to_string())
        .chain((1..=MAX_BACKUP_SLOTS).map(|n| format!("{CORRUPT_BACKUP_KEY}.{n}")));
    for key in candidates {
        match store.get_item(&key)? {
            // Same bytes already saved by an earlier start.
            Some(existing) if existing == payload => return Ok(key),
            Some(_) => continue,
            None => {
                store.set_item(&key, payload)?;
                return Ok(key);
            }
        }
    }
    Err(RepoError::WriteRejected(format!(
        "all {MAX_BACKUP_SLOTS} numbered backup slots are taken"
    )))
}
