//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by store and editor session.
//! - Define input shapes for create/update use-cases and list ordering.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `title` is never empty.
//! - `updated_at >= created_at` for every persisted note.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Stable identifier assigned by the store at creation.
pub type NoteId = Uuid;

/// Title used by the editor when creating a blank note.
pub const DEFAULT_NOTE_TITLE: &str = "New Note";

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Free-form body, may be empty.
    pub content: String,
    /// Unix epoch milliseconds. Immutable after creation.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed by every successful update.
    pub updated_at: i64,
}

impl Note {
    /// Builds a fresh note with a generated id and identical timestamps.
    pub fn new(title: impl Into<String>, content: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Validates title and timestamp invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_title(&self.title)?;
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Validation failures for note fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is the empty string.
    EmptyTitle,
    /// Persisted timestamps are out of order.
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is required"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Rejects empty titles. Whitespace-only titles are accepted.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(())
}

/// Input for note creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateNoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl CreateNoteInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Partial update input. `None` fields are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteInput {
    pub id: NoteId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteInput {
    pub fn new(id: NoteId) -> Self {
        Self {
            id,
            title: None,
            content: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

/// List ordering accepted by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    TitleAsc,
    TitleDesc,
    CreatedAsc,
    CreatedDesc,
    UpdatedAsc,
    #[default]
    UpdatedDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
        SortOrder::CreatedAsc,
        SortOrder::CreatedDesc,
        SortOrder::UpdatedAsc,
        SortOrder::UpdatedDesc,
    ];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "title_asc",
            Self::TitleDesc => "title_desc",
            Self::CreatedAsc => "created_asc",
            Self::CreatedDesc => "created_desc",
            Self::UpdatedAsc => "updated_asc",
            Self::UpdatedDesc => "updated_desc",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown sort order name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortOrder(pub String);

impl Display for UnknownSortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort order `{}`; expected title_asc|title_desc|created_asc|created_desc|updated_asc|updated_desc",
            self.0
        )
    }
}

impl Error for UnknownSortOrder {}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == normalized)
            .ok_or_else(|| UnknownSortOrder(value.to_string()))
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{validate_title, Note, NoteValidationError, SortOrder, UpdateNoteInput};
    use uuid::Uuid;

    #[test]
    fn new_note_starts_with_equal_timestamps() {
        let note = Note::new("title", "", 1_000);
        assert_eq!(note.created_at, note.updated_at);
        assert!(note.validate().is_ok());
    }

    #[test]
    fn empty_title_is_rejected_but_whitespace_is_not() {
        assert_eq!(validate_title(""), Err(NoteValidationError::EmptyTitle));
        assert!(validate_title("  ").is_ok());
    }

    #[test]
    fn validate_rejects_reversed_timestamps() {
        let mut note = Note::new("title", "body", 2_000);
        note.updated_at = 1_000;
        assert!(matches!(
            note.validate(),
            Err(NoteValidationError::UpdatedBeforeCreated { .. })
        ));
    }

    #[test]
    fn sort_order_parses_wire_names_and_defaults_to_updated_desc() {
        assert_eq!(SortOrder::default(), SortOrder::UpdatedDesc);
        for order in SortOrder::ALL {
            assert_eq!(order.as_str().parse::<SortOrder>(), Ok(order));
        }
        assert_eq!(" Title_Asc ".parse::<SortOrder>(), Ok(SortOrder::TitleAsc));
        assert!("newest".parse::<SortOrder>().is_err());
    }

    #[test]
    fn sort_order_serializes_as_snake_case() {
        let json = serde_json::to_string(&SortOrder::CreatedDesc).unwrap();
        assert_eq!(json, "\"created_desc\"");
    }

    #[test]
    fn update_input_builder_sets_only_supplied_fields() {
        let input = UpdateNoteInput::new(Uuid::new_v4()).with_content("body");
        assert_eq!(input.title, None);
        assert_eq!(input.content.as_deref(), Some("body"));
    }
}
