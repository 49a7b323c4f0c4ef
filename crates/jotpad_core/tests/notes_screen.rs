use jotpad_core::{
    deserialize_notes, serialize_notes, FixedClock, MemoryKeyValueStore, MutationKind, Note,
    NoteStore, NotesController, NOTES_STORAGE_KEY,
};

fn open_screen(handle: &MemoryKeyValueStore) -> NotesController<FixedClock> {
    NotesController::new(NoteStore::load(handle.clone()), FixedClock::new("t-now"))
}

fn seeded(notes: &[Note]) -> MemoryKeyValueStore {
    MemoryKeyValueStore::with_item(NOTES_STORAGE_KEY, &serialize_notes(notes).unwrap())
}

fn persisted(handle: &MemoryKeyValueStore) -> Option<Vec<Note>> {
    handle
        .peek(NOTES_STORAGE_KEY)
        .map(|payload| deserialize_notes(&payload).unwrap())
}

#[test]
fn adding_to_empty_store_persists_one_unedited_note() {
    let handle = MemoryKeyValueStore::new();
    let mut screen = open_screen(&handle);

    screen.set_draft("Hello");
    let mutation = screen.add_or_update_note().unwrap().unwrap();
    mutation.save.wait().unwrap();

    let expected = vec![Note::new("Hello", "t-now")];
    assert_eq!(screen.notes(), expected.as_slice());
    assert_eq!(screen.notes()[0].last_edit_date_time, None);
    assert_eq!(persisted(&handle), Some(expected));
    assert!(screen.state().draft.is_empty());
    assert_eq!(screen.submit_label(), "Add");
}

#[test]
fn adding_appends_at_tail_for_any_existing_list() {
    for existing in 0..4 {
        let notes = (0..existing)
            .map(|i| Note::new(format!("n{i}"), "t0"))
            .collect::<Vec<_>>();
        let handle = seeded(&notes);
        let mut screen = open_screen(&handle);

        screen.set_draft(format!("new {existing}"));
        screen.add_or_update_note().unwrap().unwrap();
        screen.flush();

        assert_eq!(screen.notes().len(), existing + 1);
        let tail = screen.notes().last().unwrap();
        assert_eq!(tail.text, format!("new {existing}"));
        assert_eq!(tail.last_edit_date_time, None);
        assert_eq!(persisted(&handle).unwrap(), screen.notes());
    }
}

#[test]
fn editing_replaces_target_and_keeps_creation_time() {
    let handle = seeded(&[Note::new("A", "t1"), Note::new("B", "t2")]);
    let mut screen = open_screen(&handle);

    screen.open_note(0, true).unwrap();
    assert_eq!(screen.state().draft, "A");
    assert_eq!(screen.state().edit_target, Some(0));
    assert_eq!(screen.submit_label(), "Update");

    screen.clock_mut().set("t3");
    screen.set_draft("A2");
    let mutation = screen.add_or_update_note().unwrap().unwrap();
    assert_eq!(mutation.kind, MutationKind::Updated { index: 0 });
    mutation.save.wait().unwrap();

    let expected = vec![
        Note {
            text: "A2".to_string(),
            creation_date_time: "t1".to_string(),
            last_edit_date_time: Some("t3".to_string()),
        },
        Note::new("B", "t2"),
    ];
    assert_eq!(screen.notes(), expected.as_slice());
    assert_eq!(persisted(&handle), Some(expected));
    assert_eq!(screen.state().edit_target, None);
    assert!(screen.state().draft.is_empty());
}

#[test]
fn whitespace_draft_changes_nothing() {
    let handle = seeded(&[Note::new("A", "t1")]);
    let before = handle.peek(NOTES_STORAGE_KEY);
    let mut screen = open_screen(&handle);

    for draft in ["", "   ", "\n\t \n"] {
        screen.set_draft(draft);
        assert!(screen.add_or_update_note().unwrap().is_none());
    }
    screen.flush();

    assert_eq!(screen.notes(), &[Note::new("A", "t1")]);
    assert_eq!(handle.peek(NOTES_STORAGE_KEY), before);
}

#[test]
fn confirmed_delete_removes_exactly_the_target() {
    let notes = vec![
        Note::new("A", "t1"),
        Note::new("B", "t2"),
        Note::new("C", "t3"),
    ];
    let handle = seeded(&notes);
    let mut screen = open_screen(&handle);
    screen.open_note(2, true).unwrap();

    screen.request_delete(1).unwrap();
    let prompt = screen.delete_prompt().unwrap();
    assert_eq!(prompt.index, 1);
    assert_eq!(prompt.title, "Delete Note");
    assert_eq!(prompt.cancel_label, "Cancel");
    assert_eq!(prompt.confirm_label, "OK");

    let mutation = screen.confirm_delete().unwrap();
    assert_eq!(
        mutation.kind,
        MutationKind::Deleted {
            index: 1,
            note: Note::new("B", "t2"),
        }
    );
    mutation.save.wait().unwrap();

    let expected = vec![Note::new("A", "t1"), Note::new("C", "t3")];
    assert_eq!(screen.notes(), expected.as_slice());
    assert_eq!(persisted(&handle), Some(expected));
    assert_eq!(screen.state().edit_target, None);
    assert!(screen.delete_prompt().is_none());
}

#[test]
fn cancelled_delete_is_a_true_no_op() {
    let notes = vec![Note::new("A", "t1"), Note::new("B", "t2")];
    let handle = seeded(&notes);
    let before = handle.peek(NOTES_STORAGE_KEY);
    let mut screen = open_screen(&handle);
    screen.open_note(1, true).unwrap();

    screen.request_delete(0).unwrap();
    screen.cancel_delete();
    screen.flush();

    assert_eq!(screen.notes(), notes.as_slice());
    assert_eq!(handle.peek(NOTES_STORAGE_KEY), before);
    assert_eq!(screen.state().edit_target, Some(1));
    assert_eq!(screen.state().draft, "B");
    assert!(!screen.state().delete_prompt_visible());
}

#[test]
fn preview_overlay_shows_rendered_note() {
    let handle = seeded(&[Note::new("line1\nline2\nline3", "t1")]);
    let mut screen = open_screen(&handle);

    screen.open_note(0, false).unwrap();
    assert_eq!(
        screen.state().preview.as_deref(),
        Some("Created: t1\n\n\nline1\nline2")
    );
    assert_eq!(screen.state().edit_target, None);
    assert_eq!(screen.note_cards(), vec!["Created: t1\n\n\nline1\nline2"]);

    screen.close_preview();
    assert!(!screen.state().preview_visible());
}

#[test]
fn overlays_toggle_independently() {
    let handle = seeded(&[Note::new("A", "t1")]);
    let mut screen = open_screen(&handle);

    screen.open_settings();
    screen.open_note(0, false).unwrap();
    assert!(screen.state().settings_visible);
    assert!(screen.state().preview_visible());

    screen.close_settings();
    assert!(!screen.state().settings_visible);
    assert!(screen.state().preview_visible());
}

#[test]
fn write_failure_keeps_session_state() {
    let handle = MemoryKeyValueStore::new();
    let mut screen = open_screen(&handle);
    handle.reject_writes(true);

    screen.set_draft("survives");
    let mutation = screen.add_or_update_note().unwrap().unwrap();
    assert!(mutation.save.wait().is_err());

    assert_eq!(screen.notes().len(), 1);
    assert_eq!(handle.peek(NOTES_STORAGE_KEY), None);

    handle.reject_writes(false);
    screen.set_draft("second");
    screen.add_or_update_note().unwrap().unwrap().save.wait().unwrap();
    assert_eq!(persisted(&handle).unwrap().len(), 2);
}
