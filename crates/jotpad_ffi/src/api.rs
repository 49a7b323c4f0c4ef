//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the notes screen actions to Dart via FRB.
//! - Return one full `ScreenSnapshot` per call so the UI renders from it.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide screen session; calls are serialized by its mutex.
//! - Storage failures degrade to an in-memory session, never to an error.

use jotpad_core::db::open_db;
use jotpad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    settings_info, MemoryKeyValueStore, NoteStore, NotesController, SqliteKeyValueStore,
    SystemClock,
};
use log::{error, warn};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const DB_FILE_NAME: &str = "jotpad.sqlite3";
const DB_PATH_ENV: &str = "JOTPAD_DB_PATH";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SESSION: OnceLock<Mutex<NotesController<SystemClock>>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive); blank
///   selects `debug` in debug builds and `info` in release builds.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    /// List position, the handle for edit/delete/preview calls.
    pub index: u32,
    /// Timestamps plus the first two body lines.
    pub preview: String,
}

/// Delete confirmation dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePromptView {
    pub index: u32,
    pub title: String,
    pub message: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

/// Settings overlay text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsView {
    pub title: String,
    pub version: String,
    pub credits: String,
}

/// Everything the notes screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenSnapshot {
    pub cards: Vec<NoteCard>,
    pub draft: String,
    /// `Add` or `Update`.
    pub submit_label: String,
    pub edit_target: Option<u32>,
    /// Preview overlay text when visible.
    pub preview: Option<String>,
    /// Settings overlay content when visible.
    pub settings: Option<SettingsView>,
    pub delete_prompt: Option<DeletePromptView>,
    /// Empty on success; otherwise why the action was ignored.
    pub message: String,
}

/// Current screen without changing anything.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_screen() -> ScreenSnapshot {
    with_session(|_| Ok(()))
}

/// Input field text changed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_set_draft(text: String) -> ScreenSnapshot {
    with_session(|session| {
        session.set_draft(text);
        Ok(())
    })
}

/// Add/Update button.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_submit() -> ScreenSnapshot {
    with_session(|session| {
        session
            .add_or_update_note()
            .map(|_| ())
            .map_err(|err| format!("notes_submit failed: {err}"))
    })
}

/// Tap on a note (`is_edit = false`) or its Edit button (`is_edit = true`).
#[flutter_rust_bridge::frb(sync)]
pub fn notes_open(index: u32, is_edit: bool) -> ScreenSnapshot {
    with_session(|session| {
        session
            .open_note(index as usize, is_edit)
            .map_err(|err| format!("notes_open failed: {err}"))
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_close_preview() -> ScreenSnapshot {
    with_session(|session| {
        session.close_preview();
        Ok(())
    })
}

/// Delete button; shows the confirmation prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_request_delete(index: u32) -> ScreenSnapshot {
    with_session(|session| {
        session
            .request_delete(index as usize)
            .map_err(|err| format!("notes_request_delete failed: {err}"))
    })
}

/// OK on the confirmation prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_confirm_delete() -> ScreenSnapshot {
    with_session(|session| {
        session
            .confirm_delete()
            .map(|_| ())
            .map_err(|err| format!("notes_confirm_delete failed: {err}"))
    })
}

/// Cancel on the confirmation prompt.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_cancel_delete() -> ScreenSnapshot {
    with_session(|session| {
        session.cancel_delete();
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_open_settings() -> ScreenSnapshot {
    with_session(|session| {
        session.open_settings();
        Ok(())
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn notes_close_settings() -> ScreenSnapshot {
    with_session(|session| {
        session.close_settings();
        Ok(())
    })
}

/// Blocks until every queued save is on disk. Call before the app is
/// backgrounded or closed.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_flush() -> ScreenSnapshot {
    with_session(|session| {
        session.flush();
        Ok(())
    })
}

fn with_session(
    action: impl FnOnce(&mut NotesController<SystemClock>) -> Result<(), String>,
) -> ScreenSnapshot {
    let mut session = lock_session();
    let message = match action(&mut *session) {
        Ok(()) => String::new(),
        Err(message) => {
            warn!("event=ffi_action module=ffi status=rejected");
            message
        }
    };
    snapshot(&*session, message)
}

fn lock_session() -> MutexGuard<'static, NotesController<SystemClock>> {
    SESSION
        .get_or_init(|| Mutex::new(open_session()))
        .lock()
        // A panic mid-action leaves plain data behind; keep serving it.
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn open_session() -> NotesController<SystemClock> {
    let db_path = resolve_db_path();
    let store = match open_db(&db_path)
        .map_err(|err| err.to_string())
        .and_then(|conn| SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string()))
    {
        Ok(kv) => NoteStore::load(kv),
        Err(err) => {
            error!(
                "event=session_open module=ffi status=degraded error_code=storage_unavailable error={err}"
            );
            NoteStore::load(MemoryKeyValueStore::new())
        }
    };
    NotesController::new(store, SystemClock)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

/// List position as sent to Dart; `None` past `u32::MAX`.
fn to_ffi_index(index: usize) -> Option<u32> {
    u32::try_from(index).ok()
}

fn snapshot(session: &NotesController<SystemClock>, message: String) -> ScreenSnapshot {
    let state = session.state();
    ScreenSnapshot {
        // Cards past `u32::MAX` could not be addressed from Dart.
        cards: session
            .note_cards()
            .into_iter()
            .zip(0u32..)
            .map(|(preview, index)| NoteCard { index, preview })
            .collect(),
        draft: state.draft.clone(),
        submit_label: state.submit_label().to_string(),
        edit_target: state.edit_target.and_then(to_ffi_index),
        preview: state.preview.clone(),
        settings: state.settings_visible.then(|| {
            let info = settings_info();
            SettingsView {
                title: info.title.to_string(),
                version: info.version.to_string(),
                credits: info.credits.to_string(),
            }
        }),
        delete_prompt: session.delete_prompt().and_then(|prompt| {
            Some(DeletePromptView {
                index: to_ffi_index(prompt.index)?,
                title: prompt.title.to_string(),
                message: prompt.message.to_string(),
                cancel_label: prompt.cancel_label.to_string(),
                confirm_label: prompt.confirm_label.to_string(),
            })
        }),
        message,
    }
}
