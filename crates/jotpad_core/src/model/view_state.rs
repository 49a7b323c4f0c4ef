//! Transient screen state.
//!
//! Nothing here is persisted. Overlay flags toggle independently; the only
//! coupling is that the submit label follows `edit_target`.

pub const ADD_LABEL: &str = "Add";
pub const UPDATE_LABEL: &str = "Update";

/// Everything the notes screen shows besides the note list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Text currently in the input field.
    pub draft: String,
    /// Index of the note the next submit will replace.
    pub edit_target: Option<usize>,
    /// Rendered preview when the preview overlay is visible.
    pub preview: Option<String>,
    pub settings_visible: bool,
    /// Index awaiting delete confirmation while the prompt is visible.
    pub pending_delete: Option<usize>,
}

impl ViewState {
    /// Label of the submit button.
    pub fn submit_label(&self) -> &'static str {
        if self.edit_target.is_some() {
            UPDATE_LABEL
        } else {
            ADD_LABEL
        }
    }

    pub fn preview_visible(&self) -> bool {
        self.preview.is_some()
    }

    pub fn delete_prompt_visible(&self) -> bool {
        self.pending_delete.is_some()
    }

    /// Resets the input area after a submit or delete.
    pub fn clear_input(&mut self) {
        self.draft.clear();
        self.edit_target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{ViewState, ADD_LABEL, UPDATE_LABEL};

    #[test]
    fn submit_label_follows_edit_target() {
        let mut state = ViewState::default();
        assert_eq!(state.submit_label(), ADD_LABEL);

        state.edit_target = Some(0);
        assert_eq!(state.submit_label(), UPDATE_LABEL);

        state.draft = "text".to_string();
        state.clear_input();
        assert_eq!(state.submit_label(), ADD_LABEL);
        assert!(state.draft.is_empty());
    }
}
