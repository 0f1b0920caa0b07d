//! SQLite-backed note store.

use super::{NoteStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::model::note::{CreateNoteInput, Note, NoteId, SortOrder, UpdateNoteInput};
use crate::repo::note_repo::SqliteNoteRepository;
use crate::service::note_service::{NoteService, NoteServiceError};
use rusqlite::Connection;
use std::path::Path;

/// Note store owning one migrated SQLite connection.
pub struct SqliteNoteStore {
    conn: Connection,
}

impl SqliteNoteStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = open_db(path).map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Ok(Self::new(conn))
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn with_service<T>(
        &self,
        f: impl FnOnce(&NoteService<SqliteNoteRepository<'_>>) -> Result<T, NoteServiceError>,
    ) -> StoreResult<T> {
        let repo = SqliteNoteRepository::try_new(&self.conn)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let service = NoteService::new(repo);
        f(&service).map_err(StoreError::from)
    }
}

impl NoteStore for SqliteNoteStore {
    fn list(&self, sort: SortOrder) -> StoreResult<Vec<Note>> {
        self.with_service(|service| service.list_notes(sort))
    }

    fn create(&self, title: &str, content: &str) -> StoreResult<Note> {
        self.with_service(|service| service.create_note(CreateNoteInput::new(title, content)))
    }

    fn update(
        &self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
    ) -> StoreResult<Note> {
        let input = UpdateNoteInput {
            id,
            title: title.map(str::to_string),
            content: content.map(str::to_string),
        };
        self.with_service(|service| service.update_note(input))
    }

    fn delete(&self, id: NoteId) -> StoreResult<bool> {
        self.with_service(|service| service.delete_note(id))
    }

    fn get(&self, id: NoteId) -> StoreResult<Option<Note>> {
        self.with_service(|service| service.get_note(id))
    }
}
