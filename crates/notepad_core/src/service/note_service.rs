//! Note use-case service.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete note APIs on top of a repository.
//! - Validate input and stamp timestamps before persistence.
//! - Emit metadata-only diagnostics for every write.
//!
//! # Invariants
//! - `create_note` returns a note with `created_at == updated_at`.
//! - `update_note` is partial: omitted fields are left unchanged.
//! - Note text (title/content) never reaches the log.

use crate::model::note::{
    now_epoch_ms, validate_title, CreateNoteInput, Note, NoteId, NoteValidationError, SortOrder,
    UpdateNoteInput,
};
use crate::repo::note_repo::{NoteRepository, RepoError};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Input failed field validation.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NoteNotFound(id) => write!(f, "note with id {id} not found"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NoteNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one note and returns the persisted record.
    pub fn create_note(&self, input: CreateNoteInput) -> NoteServiceResult<Note> {
        let started_at = Instant::now();
        let result = self.create_note_inner(input);
        log_write("note_create", started_at, &result);
        result
    }

    fn create_note_inner(&self, input: CreateNoteInput) -> NoteServiceResult<Note> {
        validate_title(&input.title)?;
        let note = Note::new(input.title, input.content, now_epoch_ms());
        let id = self.repo.insert_note(&note)?;
        self.repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Applies a partial update and returns the refreshed record.
    ///
    /// `updated_at` is always refreshed, even when no field is supplied.
    pub fn update_note(&self, input: UpdateNoteInput) -> NoteServiceResult<Note> {
        let started_at = Instant::now();
        let result = self.update_note_inner(&input);
        log_write("note_update", started_at, &result);
        result
    }

    fn update_note_inner(&self, input: &UpdateNoteInput) -> NoteServiceResult<Note> {
        if let Some(title) = input.title.as_deref() {
            validate_title(title)?;
        }
        self.repo.update_note(
            input.id,
            input.title.as_deref(),
            input.content.as_deref(),
            now_epoch_ms(),
        )?;
        self.repo
            .get_note(input.id)?
            .ok_or(NoteServiceError::InconsistentState(
                "updated note not found in read-back",
            ))
    }

    /// Gets one note by id. Missing ids yield `Ok(None)`.
    pub fn get_note(&self, id: NoteId) -> NoteServiceResult<Option<Note>> {
        Ok(self.repo.get_note(id)?)
    }

    /// Lists all notes in the requested order.
    pub fn list_notes(&self, sort: SortOrder) -> NoteServiceResult<Vec<Note>> {
        let started_at = Instant::now();
        let notes = self.repo.list_notes(sort)?;
        debug!(
            "event=note_list module=service status=ok sort={} count={} duration_ms={}",
            sort,
            notes.len(),
            started_at.elapsed().as_millis()
        );
        Ok(notes)
    }

    /// Hard-deletes one note. Returns `false` when the id did not exist.
    pub fn delete_note(&self, id: NoteId) -> NoteServiceResult<bool> {
        let started_at = Instant::now();
        let removed = self.repo.delete_note(id)?;
        info!(
            "event=note_delete module=service status=ok note_id={} removed={} duration_ms={}",
            id,
            removed,
            started_at.elapsed().as_millis()
        );
        Ok(removed)
    }
}

fn log_write(event: &str, started_at: Instant, result: &NoteServiceResult<Note>) {
    match result {
        Ok(note) => info!(
            "event={} module=service status=ok note_id={} duration_ms={}",
            event,
            note.id,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={} module=service status=error duration_ms={} error_code={} error={}",
            event,
            started_at.elapsed().as_millis(),
            error_code(err),
            err
        ),
    }
}

fn error_code(err: &NoteServiceError) -> &'static str {
    match err {
        NoteServiceError::Validation(_) => "validation_failed",
        NoteServiceError::NoteNotFound(_) => "note_not_found",
        NoteServiceError::Repo(_) => "repo_failed",
        NoteServiceError::InconsistentState(_) => "inconsistent_state",
    }
}
