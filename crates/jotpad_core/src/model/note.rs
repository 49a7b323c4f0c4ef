//! Note record.
//!
//! # Responsibility
//! - Define the canonical note shape shared by storage and views.
//! - Keep the JSON field names stable (`text`, `creationDateTime`,
//!   `lastEditDateTime`).
//!
//! # Invariants
//! - `last_edit_date_time` is `None` until the first update and is written
//!   as `null`, never omitted.
//! - Updating a note produces a new record with the original creation time.
//! - A record with `null` or missing string fields still decodes, so one
//!   damaged record cannot hide the rest of the collection.

use serde::{Deserialize, Deserializer, Serialize};

/// One user-authored note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Free-text body. Reads as empty when missing or `null` in storage.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
    /// Display timestamp set once at creation. Same decoding as `text`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub creation_date_time: String,
    /// Display timestamp of the latest update, absent for never-edited notes.
    #[serde(default)]
    pub last_edit_date_time: Option<String>,
}

impl Note {
    /// Creates a never-edited note.
    pub fn new(text: impl Into<String>, created_at: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            creation_date_time: created_at.into(),
            last_edit_date_time: None,
        }
    }

    /// Returns the replacement record for an update of this note.
    pub fn edited(&self, text: impl Into<String>, edited_at: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            creation_date_time: self.creation_date_time.clone(),
            last_edit_date_time: Some(edited_at.into()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
