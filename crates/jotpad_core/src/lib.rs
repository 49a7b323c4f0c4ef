//! Core logic for the jotpad notes screen.
//! This crate is the single source of truth for note state and persistence.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::Note;
pub use model::view_state::ViewState;
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use repo::note_store::{
    deserialize_notes, serialize_notes, LoadOutcome, NoteCodecError, NoteStore,
    CORRUPT_BACKUP_KEY, NOTES_STORAGE_KEY,
};
pub use repo::save_worker::{SaveError, SaveTicket};
pub use service::notes_controller::{DeletePrompt, Mutation, MutationKind, NotesController, ViewError};
pub use service::preview::{render_preview, settings_info, SettingsInfo};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
