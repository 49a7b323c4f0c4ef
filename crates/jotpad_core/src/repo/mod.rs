//! Persistence layer: key-value slot storage and the note store on top of it.
//!
//! # Responsibility
//! - Define the key-value contract the platform storage must satisfy.
//! - Keep serialization and write scheduling out of the controller.
//!
//! # Invariants
//! - Every mutation rewrites the whole notes slot; there are no partial writes.

pub mod kv_repo;
pub mod note_store;
pub mod save_worker;
