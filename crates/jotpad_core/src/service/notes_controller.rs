//! Notes screen controller.
//!
//! # Responsibility
//! - Map user actions (submit, edit, delete, open overlays) to note list
//!   mutations and `ViewState` transitions.
//! - Trigger a full save after every mutation.
//!
//! # Invariants
//! - Blank drafts never mutate or save.
//! - Updates keep `creation_date_time` and stamp `last_edit_date_time`.
//! - Deletion only happens through `request_delete` then `confirm_delete`.
//! - Failed operations leave notes and view state untouched.

use crate::clock::Clock;
use crate::model::note::Note;
use crate::model::view_state::ViewState;
use crate::repo::note_store::NoteStore;
use crate::repo::save_worker::SaveTicket;
use crate::service::preview::render_preview;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DELETE_PROMPT_TITLE: &str = "Delete Note";
pub const DELETE_PROMPT_MESSAGE: &str = "Are you sure you want to delete this note?";
pub const DELETE_PROMPT_CANCEL: &str = "Cancel";
pub const DELETE_PROMPT_CONFIRM: &str = "OK";

/// Rejected screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// Position does not address a note.
    IndexOutOfRange { index: usize, len: usize },
    /// `confirm_delete` without an open prompt.
    NoPendingDelete,
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "note index {index} out of range for {len} note(s)")
            }
            Self::NoPendingDelete => write!(f, "no delete awaiting confirmation"),
        }
    }
}

impl Error for ViewError {}

/// What a successful mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    Created { index: usize },
    Updated { index: usize },
    Deleted { index: usize, note: Note },
}

/// A mutation plus the handle on its save.
#[derive(Debug)]
pub struct Mutation {
    pub kind: MutationKind,
    pub save: SaveTicket,
}

/// Confirmation dialog content for a pending delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub index: usize,
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

/// Owns the note store and the screen state.
pub struct NotesController<C: Clock> {
    store: NoteStore,
    state: ViewState,
    clock: C,
}

impl<C: Clock> NotesController<C> {
    pub fn new(store: NoteStore, clock: C) -> Self {
        Self {
            store,
            state: ViewState::default(),
            clock,
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.store.notes()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn submit_label(&self) -> &'static str {
        self.state.submit_label()
    }

    /// Rendered preview for every note, in display order.
    pub fn note_cards(&self) -> Vec<String> {
        self.notes().iter().map(render_preview).collect()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.draft = text.into();
    }

    /// Commits the draft as a new note or as the edit target's replacement.
    ///
    /// Returns `Ok(None)` for a blank draft: whitespace only, byte order
    /// marks included.
    pub fn add_or_update_note(&mut self) -> Result<Option<Mutation>, ViewError> {
        if is_blank(&self.state.draft) {
            debug!("event=note_submit module=controller status=skipped reason=blank_draft");
            return Ok(None);
        }

        let now = self.clock.now();
        let mut notes = self.store.notes().to_vec();
        let kind = match self.state.edit_target {
            Some(index) => {
                let current = notes.get(index).ok_or(ViewError::IndexOutOfRange {
                    index,
                    len: notes.len(),
                })?;
                let updated = current.edited(self.state.draft.as_str(), now);
                notes[index] = updated;
                MutationKind::Updated { index }
            }
            None => {
                notes.push(Note::new(self.state.draft.as_str(), now));
                MutationKind::Created {
                    index: notes.len() - 1,
                }
            }
        };

        info!(
            "event=note_submit module=controller status=ok action={} count={} text_len={}",
            match kind {
                MutationKind::Updated { .. } => "update",
                _ => "create",
            },
            notes.len(),
            self.state.draft.len()
        );
        let save = self.store.save(notes);
        self.state.clear_input();
        Ok(Some(Mutation { kind, save }))
    }

    /// Opens the delete confirmation for `index`.
    pub fn request_delete(&mut self, index: usize) -> Result<(), ViewError> {
        self.check_index(index)?;
        self.state.pending_delete = Some(index);
        Ok(())
    }

    /// Content of the confirmation dialog while one is open.
    pub fn delete_prompt(&self) -> Option<DeletePrompt> {
        self.state.pending_delete.map(|index| DeletePrompt {
            index,
            title: DELETE_PROMPT_TITLE,
            message: DELETE_PROMPT_MESSAGE,
            cancel_label: DELETE_PROMPT_CANCEL,
            confirm_label: DELETE_PROMPT_CONFIRM,
        })
    }

    /// "OK" on the confirmation: removes the note and resets the input area.
    pub fn confirm_delete(&mut self) -> Result<Mutation, ViewError> {
        let index = self
            .state
            .pending_delete
            .ok_or(ViewError::NoPendingDelete)?;
        if let Err(err) = self.check_index(index) {
            self.state.pending_delete = None;
            return Err(err);
        }

        let mut notes = self.store.notes().to_vec();
        let removed = notes.remove(index);
        info!(
            "event=note_delete module=controller status=ok index={index} count={}",
            notes.len()
        );
        let save = self.store.save(notes);
        self.state.pending_delete = None;
        self.state.edit_target = None;
        Ok(Mutation {
            kind: MutationKind::Deleted {
                index,
                note: removed,
            },
            save,
        })
    }

    /// "Cancel" on the confirmation. Only closes the prompt.
    pub fn cancel_delete(&mut self) {
        self.state.pending_delete = None;
    }

    /// Tap on a note (`is_edit == false`) or on its Edit control.
    pub fn open_note(&mut self, index: usize, is_edit: bool) -> Result<(), ViewError> {
        let note = self.store.get(index).ok_or_else(|| {
            let len = self.store.len();
            warn!("event=note_index module=controller status=error index={index} count={len}");
            ViewError::IndexOutOfRange { index, len }
        })?;
        if is_edit {
            self.state.draft = note.text.clone();
            self.state.edit_target = Some(index);
        } else {
            self.state.preview = Some(render_preview(note));
        }
        Ok(())
    }

    pub fn close_preview(&mut self) {
        self.state.preview = None;
    }

    pub fn open_settings(&mut self) {
        self.state.settings_visible = true;
    }

    pub fn close_settings(&mut self) {
        self.state.settings_visible = false;
    }

    /// Blocks until all issued saves are applied.
    pub fn flush(&self) {
        self.store.flush();
    }

    fn check_index(&self, index: usize) -> Result<(), ViewError> {
        let len = self.store.len();
        if index >= len {
            warn!("event=note_index module=controller status=error index={index} count={len}");
            return Err(ViewError::IndexOutOfRange { index, len });
        }
        Ok(())
    }
}

// `str::trim` keeps U+FEFF, which renders as nothing.
fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}
