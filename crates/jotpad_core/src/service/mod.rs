//! Screen-level use cases.
//!
//! # Responsibility
//! - Turn user actions into note store mutations.
//! - Render the read-only text the screen displays.
//!
//! # Invariants
//! - Services never touch the key-value backend directly.

pub mod notes_controller;
pub mod preview;
