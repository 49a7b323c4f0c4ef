//! Read-only renderings shown by the notes screen.

use crate::model::note::Note;

/// Number of body lines kept in a preview.
pub const PREVIEW_LINE_COUNT: usize = 2;

pub const SETTINGS_TITLE: &str = "App Version";
pub const SETTINGS_CREDITS: &str = "Made with jotpad";

/// Renders timestamps plus the first two lines of the note body.
///
/// Shape: `Created: {creation}\n{Last Edited: {edit} | empty}\n\n{lines}`.
/// Further lines are dropped without an ellipsis.
pub fn render_preview(note: &Note) -> String {
    let last_edit_line = note
        .last_edit_date_time
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(|value| format!("Last Edited: {value}"))
        .unwrap_or_default();
    let head = note
        .text
        .split('\n')
        .take(PREVIEW_LINE_COUNT)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Created: {}\n{last_edit_line}\n\n{head}",
        note.creation_date_time
    )
}

/// Static content of the settings overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsInfo {
    pub title: &'static str,
    pub version: &'static str,
    pub credits: &'static str,
}

pub fn settings_info() -> SettingsInfo {
    SettingsInfo {
        title: SETTINGS_TITLE,
        version: crate::core_version(),
        credits: SETTINGS_CREDITS,
    }
}
