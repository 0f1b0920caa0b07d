//! FFI procedure API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the note procedures (health, create, list, get, update, delete)
//!   to Dart via FRB.
//! - Convert store results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Ids cross the boundary as hyphenated UUID strings.
//! - Malformed ids and unknown sort names are validation failures.

use log::warn;
use notepad_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, now_epoch_ms,
    ping as ping_inner, AppConfig, Note, NoteId, NoteStore, SortOrder, SqliteNoteStore,
    StoreError,
};
use std::sync::OnceLock;
use uuid::Uuid;

static API_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// Liveness probe.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Health-check response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthResponse {
    /// Always `ok` while the library is loaded.
    pub status: String,
    /// Wall-clock time of the check in epoch milliseconds.
    pub timestamp_ms: i64,
}

/// Note projection crossing the FFI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Single-note response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Note payload; `None` on failure or when `get_note` finds nothing.
    pub note: Option<NoteItem>,
    /// Stable error code (`validation_error|not_found|store_unavailable`).
    pub error_code: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    /// Effective sort order applied to `items`.
    pub sort_by: String,
    pub error_code: Option<String>,
    pub message: String,
}

/// Delete response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Whether a note was actually removed.
    pub success: bool,
    pub message: String,
}

impl NoteResponse {
    fn found(message: impl Into<String>, note: Note) -> Self {
        Self {
            ok: true,
            note: Some(NoteItem::from(note)),
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(operation: &str, err: &StoreError) -> Self {
        Self {
            ok: false,
            note: None,
            error_code: Some(err.code().to_string()),
            message: format!("{operation} failed: {err}"),
        }
    }
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id.to_string(),
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Reports liveness and current time.
///
/// # FFI contract
/// - Sync call, non-blocking, no DB access.
#[flutter_rust_bridge::frb(sync)]
pub fn healthcheck() -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
        timestamp_ms: now_epoch_ms(),
    }
}

/// Creates a note. `content` defaults to an empty string.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Empty title is rejected with `validation_error`.
#[flutter_rust_bridge::frb(sync)]
pub fn create_note(title: String, content: Option<String>) -> NoteResponse {
    let content = content.unwrap_or_default();
    match with_store(|store| store.create(&title, &content)) {
        Ok(note) => NoteResponse::found("Note created.", note),
        Err(err) => NoteResponse::failure("create_note", &err),
    }
}

/// Lists all notes. `sort_by` defaults to the configured order.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Unknown sort names are rejected with `validation_error`.
#[flutter_rust_bridge::frb(sync)]
pub fn get_notes(sort_by: Option<String>) -> NotesListResponse {
    let sort = match resolve_sort(sort_by.as_deref()) {
        Ok(sort) => sort,
        Err(err) => return list_failure(api_config().default_sort, &err),
    };

    match with_store(|store| store.list(sort)) {
        Ok(notes) => NotesListResponse {
            ok: true,
            message: format!("Found {} note(s).", notes.len()),
            items: notes.into_iter().map(NoteItem::from).collect(),
            sort_by: sort.to_string(),
            error_code: None,
        },
        Err(err) => list_failure(sort, &err),
    }
}

/// Loads one note by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - A missing note is `ok` with `note: None`.
#[flutter_rust_bridge::frb(sync)]
pub fn get_note(id: String) -> NoteResponse {
    let result = parse_note_id(&id).and_then(|id| with_store(|store| store.get(id)));
    match result {
        Ok(Some(note)) => NoteResponse::found("Note found.", note),
        Ok(None) => NoteResponse {
            ok: true,
            note: None,
            error_code: None,
            message: "Note not found.".to_string(),
        },
        Err(err) => NoteResponse::failure("get_note", &err),
    }
}

/// Partially updates a note. Omitted fields keep their stored value.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Always refreshes `updated_at`, even when no field is given.
#[flutter_rust_bridge::frb(sync)]
pub fn update_note(id: String, title: Option<String>, content: Option<String>) -> NoteResponse {
    let result = parse_note_id(&id).and_then(|id| {
        with_store(|store| store.update(id, title.as_deref(), content.as_deref()))
    });
    match result {
        Ok(note) => NoteResponse::found("Note updated.", note),
        Err(err) => NoteResponse::failure("update_note", &err),
    }
}

/// Deletes a note by id.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
/// - Deleting a missing note is `ok` with `success: false`.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_note(id: String) -> DeleteResponse {
    let result = parse_note_id(&id).and_then(|id| with_store(|store| store.delete(id)));
    match result {
        Ok(true) => DeleteResponse {
            ok: true,
            success: true,
            message: "Note deleted.".to_string(),
        },
        Ok(false) => DeleteResponse {
            ok: true,
            success: false,
            message: "Note not found.".to_string(),
        },
        Err(err) => DeleteResponse {
            ok: false,
            success: false,
            message: format!("delete_note failed: {err}"),
        },
    }
}

fn list_failure(sort: SortOrder, err: &StoreError) -> NotesListResponse {
    NotesListResponse {
        ok: false,
        items: Vec::new(),
        sort_by: sort.to_string(),
        error_code: Some(err.code().to_string()),
        message: format!("get_notes failed: {err}"),
    }
}

fn resolve_sort(sort_by: Option<&str>) -> Result<SortOrder, StoreError> {
    match sort_by.map(str::trim).filter(|value| !value.is_empty()) {
        Some(raw) => raw
            .parse::<SortOrder>()
            .map_err(|err| StoreError::Validation(err.to_string())),
        None => Ok(api_config().default_sort),
    }
}

fn parse_note_id(raw: &str) -> Result<NoteId, StoreError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| StoreError::Validation(format!("invalid note id `{}`", raw.trim())))
}

fn api_config() -> &'static AppConfig {
    API_CONFIG.get_or_init(|| match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            warn!(
                "event=config_load module=ffi status=error error={} fallback=defaults",
                err
            );
            AppConfig::default()
        }
    })
}

fn with_store<T>(
    f: impl FnOnce(&SqliteNoteStore) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let store = SqliteNoteStore::open(&api_config().db_path)?;
    f(&store)
}
