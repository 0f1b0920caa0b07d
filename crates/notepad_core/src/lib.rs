//! Core logic for Notepad.
//! This crate is the single source of truth for note invariants, the note
//! store facade and the client editor session.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::note::{
    now_epoch_ms, CreateNoteInput, Note, NoteId, NoteValidationError, SortOrder,
    UnknownSortOrder, UpdateNoteInput, DEFAULT_NOTE_TITLE,
};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
pub use service::note_service::{NoteService, NoteServiceError, NoteServiceResult};
pub use session::clock::{Clock, ManualClock, SystemClock};
pub use session::controller::{EditBuffer, EditorSession, SaveRequest, SessionState};
pub use session::debounce::Debouncer;
pub use session::list::{NoteListCache, NoteListRow};
pub use session::SessionOptions;
pub use store::{NoteStore, SqliteNoteStore, StoreError, StoreResult};

/// Liveness probe used by the procedure surface.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
