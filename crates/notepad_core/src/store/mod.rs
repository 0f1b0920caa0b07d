//! Note store facade consumed by the editor session.
//!
//! # Responsibility
//! - Define the five store operations the client depends on.
//! - Collapse lower-layer failures into a three-way error taxonomy.
//!
//! # Invariants
//! - `delete` of a missing id is `Ok(false)`, never an error.
//! - `get` of a missing id is `Ok(None)`, never an error.
//! - `update` of a missing id is `Err(StoreError::NotFound)`.

use crate::model::note::{Note, NoteId, SortOrder};
use crate::service::note_service::NoteServiceError;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::SqliteNoteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy visible to store callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Input rejected before persistence (for example an empty title).
    Validation(String),
    /// Target id does not exist.
    NotFound(NoteId),
    /// Transport or persistence failure.
    Unavailable(String),
}

impl StoreError {
    /// Stable machine-readable code for logs and envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Unavailable(_) => "store_unavailable",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "validation error: {message}"),
            Self::NotFound(id) => write!(f, "note with id {id} not found"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<NoteServiceError> for StoreError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::Validation(err) => Self::Validation(err.to_string()),
            NoteServiceError::NoteNotFound(id) => Self::NotFound(id),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Remote note operations.
///
/// Implementations may be backed by a local database, an RPC client or an
/// in-memory fake. All methods take `&self`; implementations needing
/// mutation use interior mutability.
pub trait NoteStore {
    /// Returns all notes in `sort` order.
    fn list(&self, sort: SortOrder) -> StoreResult<Vec<Note>>;
    /// Creates a note. `title` must be non-empty.
    fn create(&self, title: &str, content: &str) -> StoreResult<Note>;
    /// Partially updates a note and refreshes `updated_at`.
    fn update(&self, id: NoteId, title: Option<&str>, content: Option<&str>)
        -> StoreResult<Note>;
    /// Removes a note. Returns whether it existed.
    fn delete(&self, id: NoteId) -> StoreResult<bool>;
    /// Fetches one note.
    fn get(&self, id: NoteId) -> StoreResult<Option<Note>>;
}

impl<S: NoteStore + ?Sized> NoteStore for &S {
    fn list(&self, sort: SortOrder) -> StoreResult<Vec<Note>> {
        (**self).list(sort)
    }

    fn create(&self, title: &str, content: &str) -> StoreResult<Note> {
        (**self).create(title, content)
    }

    fn update(
        &self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> StoreResult<Note> {
        (**self).update(id, title, content)
    }

    fn delete(&self, id: NoteId) -> StoreResult<bool> {
        (**self).delete(id)
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        (**self).get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreError;
    use crate::model::note::NoteValidationError;
    use crate::service::note_service::NoteServiceError;
    use uuid::Uuid;

    #[test]
    fn service_errors_map_onto_store_taxonomy() {
        let id = Uuid::new_v4();
        assert_eq!(
            StoreError::from(NoteServiceError::NoteNotFound(id)),
            StoreError::NotFound(id)
        );
        assert!(matches!(
            StoreError::from(NoteServiceError::Validation(NoteValidationError::EmptyTitle)),
            StoreError::Validation(_)
        ));
        assert!(matches!(
            StoreError::from(NoteServiceError::InconsistentState("x")),
            StoreError::Unavailable(_)
        ));
    }
}
