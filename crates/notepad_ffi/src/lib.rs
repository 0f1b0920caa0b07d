//! Flutter bridge for Notepad core.

pub mod api;
