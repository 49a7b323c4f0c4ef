//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `jotpad_core` linkage without the Flutter/FFI runtime.
//! - Optionally dump the notes stored in a database file.
//!
//! # Invariants
//! - The database file is opened read-only: it is never created, migrated,
//!   or written, and a corrupt value is reported rather than backed up.

use jotpad_core::db::open_db_read_only;
use jotpad_core::{
    deserialize_notes, render_preview, KeyValueStore, SqliteKeyValueStore, NOTES_STORAGE_KEY,
};
use std::path::Path;

fn main() {
    println!("jotpad_core ping={}", jotpad_core::ping());
    println!("jotpad_core version={}", jotpad_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return;
    };
    match describe_database(Path::new(&db_path)) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
        }
        Err(err) => {
            eprintln!("jotpad_core db={db_path} error={err}");
            std::process::exit(1);
        }
    }
}

/// Output lines describing the notes slot of the database at `path`.
fn describe_database(path: &Path) -> Result<Vec<String>, String> {
    let conn = open_db_read_only(path).map_err(|err| err.to_string())?;
    let kv = SqliteKeyValueStore::try_new(conn).map_err(|err| err.to_string())?;
    let Some(payload) = kv
        .get_item(NOTES_STORAGE_KEY)
        .map_err(|err| err.to_string())?
    else {
        return Ok(vec!["jotpad_core load=missing".to_string()]);
    };

    let notes = match deserialize_notes(&payload) {
        Ok(notes) => notes,
        Err(err) => {
            return Ok(vec![format!(
                "jotpad_core load=corrupted bytes={} error={err}",
                payload.len()
            )])
        }
    };
    let mut lines = vec![format!("jotpad_core load=loaded count={}", notes.len())];
    for (index, note) in notes.iter().enumerate() {
        lines.push(format!("--- note {index}"));
        lines.push(render_preview(note));
    }
    Ok(lines)
}
