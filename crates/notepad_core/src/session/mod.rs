//! Client-side editor session.
//!
//! # Responsibility
//! - Track selection, edit buffer and dirty state for one editor.
//! - Auto-save through a trailing debounce and reconcile results.
//! - Keep a filtered list cache of the store's notes.
//!
//! # Invariants
//! - One session per editor; sessions are explicit values, never globals.
//! - All time flows through an injected `Clock`.

pub mod clock;
pub mod controller;
pub mod debounce;
pub mod list;

use crate::config::AppConfig;
use crate::model::note::SortOrder;

/// Quiet period after the last edit before an auto-save.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2_000;

/// Construction options for an editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub autosave_delay_ms: u64,
    /// Initial list order.
    pub sort_order: SortOrder,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            sort_order: SortOrder::default(),
        }
    }
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            autosave_delay_ms: config.autosave_delay_ms,
            sort_order: config.default_sort,
        }
    }
}
