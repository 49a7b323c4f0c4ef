//! Domain model for the notes screen.
//!
//! # Responsibility
//! - Define the persisted `Note` record and its JSON shape.
//! - Define the transient `ViewState` owned by the screen controller.
//!
//! # Invariants
//! - A note is identified by its position in the ordered collection.
//! - `creation_date_time` never changes after the note is created.

pub mod note;
pub mod view_state;
