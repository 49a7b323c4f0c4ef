//! Flutter bridge for the jotpad notes screen.

pub mod api;
