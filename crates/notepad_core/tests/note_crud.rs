use notepad_core::db::open_db_in_memory;
use notepad_core::{
    CreateNoteInput, Note, NoteRepository, NoteService, NoteServiceError, NoteValidationError,
    RepoError, SortOrder, SqliteNoteRepository, UpdateNoteInput,
};
use rusqlite::{params, Connection};
use uuid::Uuid;

fn create(service: &NoteService<SqliteNoteRepository<'_>>, title: &str, content: &str) -> Note {
    service
        .create_note(CreateNoteInput::new(title, content))
        .unwrap()
}

#[test]
fn create_update_delete_scenario() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let created = create(&service, "Test Note", "Hello");
    assert!(!created.id.is_nil());
    assert_eq!(created.title, "Test Note");
    assert_eq!(created.content, "Hello");
    assert_eq!(created.created_at, created.updated_at);

    let updated = service
        .update_note(UpdateNoteInput::new(created.id).with_content("Hello world"))
        .unwrap();
    assert_eq!(updated.title, "Test Note");
    assert_eq!(updated.content, "Hello world");
    assert!(updated.updated_at > updated.created_at);

    assert!(service.delete_note(created.id).unwrap());
    assert_eq!(service.get_note(created.id).unwrap(), None);
}

#[test]
fn create_defaults_content_to_empty_string() {
    let input: CreateNoteInput = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let created = service.create_note(input).unwrap();
    assert_eq!(created.content, "");
}

#[test]
fn create_rejects_empty_title() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let err = service
        .create_note(CreateNoteInput::new("", "body"))
        .unwrap_err();
    assert!(matches!(
        err,
        NoteServiceError::Validation(NoteValidationError::EmptyTitle)
    ));
    assert!(service.list_notes(SortOrder::default()).unwrap().is_empty());
}

#[test]
fn update_title_only_keeps_content() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let created = create(&service, "Original Title", "Original content");

    let updated = service
        .update_note(UpdateNoteInput::new(created.id).with_title("Updated Title"))
        .unwrap();
    assert_eq!(updated.title, "Updated Title");
    assert_eq!(updated.content, "Original content");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn update_content_only_keeps_title() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let created = create(&service, "Original Title", "Original content");

    let updated = service
        .update_note(UpdateNoteInput::new(created.id).with_content(""))
        .unwrap();
    assert_eq!(updated.title, "Original Title");
    assert_eq!(updated.content, "");
}

#[test]
fn update_without_fields_still_refreshes_updated_at() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let created = create(&service, "title", "body");

    let first = service.update_note(UpdateNoteInput::new(created.id)).unwrap();
    let second = service.update_note(UpdateNoteInput::new(created.id)).unwrap();
    assert!(first.updated_at > created.updated_at);
    assert!(second.updated_at > first.updated_at);
    assert_eq!(second.created_at, created.created_at);
}

#[test]
fn update_missing_note_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    let err = service
        .update_note(UpdateNoteInput::new(missing).with_title("x"))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(id) if id == missing));
    assert_eq!(err.to_string(), format!("note with id {missing} not found"));
}

#[test]
fn update_rejects_empty_title_and_leaves_row_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let created = create(&service, "keep", "body");

    let err = service
        .update_note(UpdateNoteInput::new(created.id).with_title(""))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::Validation(_)));
    assert_eq!(service.get_note(created.id).unwrap(), Some(created));
}

#[test]
fn delete_missing_note_returns_false_and_keeps_others() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let kept = create(&service, "kept", "body");

    assert!(!service.delete_note(Uuid::new_v4()).unwrap());
    assert_eq!(service.list_notes(SortOrder::default()).unwrap(), vec![kept]);
}

#[test]
fn delete_twice_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let created = create(&service, "gone", "");

    assert!(service.delete_note(created.id).unwrap());
    assert!(!service.delete_note(created.id).unwrap());
}

#[test]
fn list_orders_by_title_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    for title in ["banana", "Apple", "cherry"] {
        create(&service, title, "");
    }

    let ascending = titles(&service.list_notes(SortOrder::TitleAsc).unwrap());
    assert_eq!(ascending, vec!["Apple", "banana", "cherry"]);

    let descending = titles(&service.list_notes(SortOrder::TitleDesc).unwrap());
    assert_eq!(descending, vec!["cherry", "banana", "Apple"]);
}

#[test]
fn list_orders_by_timestamps() {
    let conn = open_db_in_memory().unwrap();
    let ids = {
        let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
        ["first", "second", "third"].map(|title| create(&service, title, "").id)
    };
    // created: first < second < third; updated: second < third < first
    set_timestamps(&conn, ids[0], 1_000, 9_000);
    set_timestamps(&conn, ids[1], 2_000, 3_000);
    set_timestamps(&conn, ids[2], 3_000, 4_000);

    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    let by = |order| titles(&service.list_notes(order).unwrap());

    assert_eq!(by(SortOrder::CreatedAsc), vec!["first", "second", "third"]);
    assert_eq!(by(SortOrder::CreatedDesc), vec!["third", "second", "first"]);
    assert_eq!(by(SortOrder::UpdatedAsc), vec!["second", "third", "first"]);
    assert_eq!(by(SortOrder::UpdatedDesc), vec!["first", "third", "second"]);
    assert_eq!(by(SortOrder::default()), by(SortOrder::UpdatedDesc));
}

#[test]
fn update_moves_note_to_front_of_default_order() {
    let conn = open_db_in_memory().unwrap();
    let ids = {
        let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
        ["older", "newer"].map(|title| create(&service, title, "").id)
    };
    set_timestamps(&conn, ids[0], 1_000, 1_000);
    set_timestamps(&conn, ids[1], 2_000, 2_000);

    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    service
        .update_note(UpdateNoteInput::new(ids[0]).with_content("touched"))
        .unwrap();

    let listed = service.list_notes(SortOrder::UpdatedDesc).unwrap();
    assert_eq!(listed[0].id, ids[0]);
}

#[test]
fn repository_rejects_malformed_persisted_rows() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO notes (uuid, title, content, created_at, updated_at)
         VALUES ('not-a-uuid', 'title', '', 1, 1);",
        [],
    )
    .unwrap();

    let repo = SqliteNoteRepository::try_new(&conn).unwrap();
    let err = repo.list_notes(SortOrder::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_requires_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteNoteRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("notes")));
}

fn titles(notes: &[Note]) -> Vec<String> {
    notes.iter().map(|note| note.title.clone()).collect()
}

fn set_timestamps(conn: &Connection, id: Uuid, created_at: i64, updated_at: i64) {
    conn.execute(
        "UPDATE notes SET created_at = ?2, updated_at = ?3 WHERE uuid = ?1;",
        params![id.to_string(), created_at, updated_at],
    )
    .unwrap();
}
