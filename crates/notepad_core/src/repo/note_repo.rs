//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and sorted list APIs over the `notes` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths call `Note::validate()` / `validate_title()` before SQL.
//! - Read paths reject malformed persisted rows instead of masking them.
//! - `update_note` strictly increases `updated_at` and never touches
//!   `created_at`.

use crate::db::DbError;
use crate::model::note::{validate_title, Note, NoteId, NoteValidationError, SortOrder};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "required column `{table}.{column}` is missing; run migrations first"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for note persistence.
pub trait NoteRepository {
    /// Inserts a fully-formed note and returns its id.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Applies a partial update. `None` fields keep their stored value.
    fn update_note(
        &self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
        now_ms: i64,
    ) -> RepoResult<()>;
    /// Gets one note by id.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists all notes in the requested order.
    fn list_notes(&self, sort: SortOrder) -> RepoResult<Vec<Note>>;
    /// Hard-deletes one note. Returns whether a row was removed.
    fn delete_note(&self, id: NoteId) -> RepoResult<bool>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// Fails fast when the `notes` schema is not in place.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_note_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (
                uuid,
                title,
                content,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.created_at,
                note.updated_at,
            ],
        )?;

        Ok(note.id)
    }

    fn update_note(
        &self,
        id: NoteId,
        title: Option<&str>,
        content: Option<&str>,
        now_ms: i64,
    ) -> RepoResult<()> {
        if let Some(title) = title {
            validate_title(title)?;
        }

        // Clock skew or sub-millisecond updates must still move updated_at forward.
        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = COALESCE(?2, title),
                content = COALESCE(?3, content),
                updated_at = MAX(?4, updated_at + 1)
             WHERE uuid = ?1;",
            params![id.to_string(), title, content, now_ms],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn list_notes(&self, sort: SortOrder) -> RepoResult<Vec<Note>> {
        let sql = format!("{NOTE_SELECT_SQL} ORDER BY {};", order_by_clause(sort));
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();

        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }
}

/// Maps a sort order to its SQL `ORDER BY` body. Ties break on `uuid ASC`.
fn order_by_clause(sort: SortOrder) -> &'static str {
    match sort {
        SortOrder::TitleAsc => "title COLLATE NOCASE ASC, uuid ASC",
        SortOrder::TitleDesc => "title COLLATE NOCASE DESC, uuid ASC",
        SortOrder::CreatedAsc => "created_at ASC, uuid ASC",
        SortOrder::CreatedDesc => "created_at DESC, uuid ASC",
        SortOrder::UpdatedAsc => "updated_at ASC, uuid ASC",
        SortOrder::UpdatedDesc => "updated_at DESC, uuid ASC",
    }
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.uuid"))
    })?;

    let note = Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    note.validate()
        .map_err(|err| RepoError::InvalidData(format!("note {id}: {err}")))?;
    Ok(note)
}

fn ensure_note_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in ["uuid", "title", "content", "created_at", "updated_at"] {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::order_by_clause;
    use crate::model::note::SortOrder;

    #[test]
    fn every_order_breaks_ties_on_uuid() {
        for order in SortOrder::ALL {
            assert!(order_by_clause(order).ends_with("uuid ASC"));
        }
    }

    #[test]
    fn title_order_is_case_insensitive() {
        assert!(order_by_clause(SortOrder::TitleAsc).contains("COLLATE NOCASE"));
        assert!(order_by_clause(SortOrder::TitleDesc).contains("COLLATE NOCASE DESC"));
    }
}
