use jotpad_core::db::open_db;
use jotpad_core::{
    FixedClock, KeyValueStore, LoadOutcome, Note, NoteStore, NotesController,
    SqliteKeyValueStore, CORRUPT_BACKUP_KEY, NOTES_STORAGE_KEY,
};
use std::path::Path;

fn open_screen(path: &Path, now: &str) -> NotesController<FixedClock> {
    let store = SqliteKeyValueStore::try_new(open_db(path).unwrap()).unwrap();
    NotesController::new(NoteStore::load(store), FixedClock::new(now))
}

#[test]
fn notes_survive_restart_in_display_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotpad.sqlite3");

    {
        let mut screen = open_screen(&path, "t1");
        for text in ["first", "second", "third"] {
            screen.set_draft(text);
            screen.add_or_update_note().unwrap();
        }
        screen.open_note(1, true).unwrap();
        screen.clock_mut().set("t2");
        screen.set_draft("second, edited");
        screen.add_or_update_note().unwrap();
        // Dropping the controller drains the save queue.
    }

    let screen = open_screen(&path, "t3");
    assert_eq!(
        screen.store().load_outcome(),
        &LoadOutcome::Loaded { count: 3 }
    );
    assert_eq!(
        screen.notes(),
        &[
            Note::new("first", "t1"),
            Note::new("second", "t1").edited("second, edited", "t2"),
            Note::new("third", "t1"),
        ]
    );
}

#[test]
fn deleting_last_note_persists_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotpad.sqlite3");

    let mut screen = open_screen(&path, "t1");
    screen.set_draft("only");
    screen.add_or_update_note().unwrap();
    screen.request_delete(0).unwrap();
    screen.confirm_delete().unwrap().save.wait().unwrap();
    drop(screen);

    let store = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(
        store.get_item(NOTES_STORAGE_KEY).unwrap().as_deref(),
        Some("[]")
    );
}

#[test]
fn corrupt_slot_is_backed_up_and_replaced_on_next_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jotpad.sqlite3");
    {
        let mut store = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
        store.set_item(NOTES_STORAGE_KEY, "[{\"text\": 42}]").unwrap();
    }

    let mut screen = open_screen(&path, "t1");
    assert!(matches!(
        screen.store().load_outcome(),
        LoadOutcome::Corrupted { backup_key: Some(key), .. } if key == CORRUPT_BACKUP_KEY
    ));
    assert!(screen.notes().is_empty());

    screen.set_draft("new start");
    screen.add_or_update_note().unwrap().unwrap().save.wait().unwrap();
    drop(screen);

    let store = SqliteKeyValueStore::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(
        store.get_item(CORRUPT_BACKUP_KEY).unwrap().as_deref(),
        Some("[{\"text\": 42}]")
    );
    let reopened = NoteStore::load(store);
    assert_eq!(reopened.notes(), &[Note::new("new start", "t1")]);
}
