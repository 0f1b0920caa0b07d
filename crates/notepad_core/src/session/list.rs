//! Client-side note list cache and search filter.
//!
//! # Invariants
//! - Each `NoteId` appears at most once.
//! - Filtering never mutates the cache; an empty query shows every note.

use crate::model::note::{Note, NoteId};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Display projection of one visible note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListRow {
    pub id: NoteId,
    pub title: String,
    /// Content with whitespace collapsed, capped at 100 chars. `None` when blank.
    pub preview: Option<String>,
    pub updated_at: i64,
}

/// Ordered copy of the store's note list.
#[derive(Debug, Clone, Default)]
pub struct NoteListCache {
    notes: Vec<Note>,
}

impl NoteListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cache with a fresh store listing.
    pub fn replace_all(&mut self, notes: Vec<Note>) {
        let mut seen = HashSet::new();
        self.notes = notes.into_iter().filter(|note| seen.insert(note.id)).collect();
    }

    /// Inserts a note at the front, dropping any older copy.
    pub fn prepend(&mut self, note: Note) {
        self.notes.retain(|existing| existing.id != note.id);
        self.notes.insert(0, note);
    }

    /// Replaces the cached copy with the same id. Returns false when absent.
    ///
    /// Missing notes are not inserted; a note deleted locally stays deleted.
    pub fn upsert(&mut self, note: &Note) -> bool {
        match self.notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(existing) => {
                *existing = note.clone();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: NoteId) -> Option<Note> {
        let index = self.notes.iter().position(|note| note.id == id)?;
        Some(self.notes.remove(index))
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Notes whose title or content contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&Note> {
        let needle = query.to_lowercase();
        self.notes
            .iter()
            .filter(|note| matches_query(note, &needle))
            .collect()
    }

    /// Filtered notes projected for list display.
    pub fn rows(&self, query: &str) -> Vec<NoteListRow> {
        self.filter(query)
            .into_iter()
            .map(|note| NoteListRow {
                id: note.id,
                title: note.title.clone(),
                preview: content_preview(&note.content),
                updated_at: note.updated_at,
            })
            .collect()
    }
}

/// `needle` must already be lowercased.
fn matches_query(note: &Note, needle: &str) -> bool {
    needle.is_empty()
        || note.title.to_lowercase().contains(needle)
        || note.content.to_lowercase().contains(needle)
}

/// Collapses whitespace and keeps the first 100 characters.
pub fn content_preview(content: &str) -> Option<String> {
    let normalized = WHITESPACE_RE.replace_all(content, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{content_preview, NoteListCache};
    use crate::model::note::Note;

    fn note(title: &str, content: &str) -> Note {
        Note::new(title, content, 1_000)
    }

    #[test]
    fn empty_query_shows_everything() {
        let mut cache = NoteListCache::new();
        cache.replace_all(vec![note("a", ""), note("b", "")]);
        assert_eq!(cache.filter("").len(), 2);
    }

    #[test]
    fn filter_matches_title_or_content_ignoring_case() {
        let mut cache = NoteListCache::new();
        cache.replace_all(vec![
            note("Groceries", "milk"),
            note("Ideas", "Buy MILK later"),
            note("Travel", "passport"),
        ]);

        let titles: Vec<_> = cache
            .filter("Milk")
            .into_iter()
            .map(|note| note.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Groceries", "Ideas"]);
        assert_eq!(cache.filter("TRAV").len(), 1);
        assert!(cache.filter("nothing").is_empty());
    }

    #[test]
    fn prepend_moves_existing_copy_to_front() {
        let mut cache = NoteListCache::new();
        let first = note("first", "");
        let second = note("second", "");
        cache.replace_all(vec![first.clone(), second.clone()]);

        cache.prepend(second.clone());
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.notes()[0].id, second.id);
    }

    #[test]
    fn upsert_replaces_by_id_and_never_inserts() {
        let mut cache = NoteListCache::new();
        let mut original = note("title", "old");
        cache.replace_all(vec![original.clone()]);

        original.content = "new".to_string();
        assert!(cache.upsert(&original));
        assert_eq!(cache.get(original.id).unwrap().content, "new");

        assert!(!cache.upsert(&note("stranger", "")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_returns_removed_note() {
        let mut cache = NoteListCache::new();
        let target = note("target", "");
        cache.replace_all(vec![target.clone()]);
        assert_eq!(cache.remove(target.id).map(|n| n.id), Some(target.id));
        assert!(cache.remove(target.id).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates() {
        assert_eq!(content_preview("  \n\t "), None);
        assert_eq!(content_preview("a\n\nb   c").as_deref(), Some("a b c"));
        let long = "x".repeat(250);
        assert_eq!(content_preview(&long).unwrap().chars().count(), 100);
    }

    #[test]
    fn rows_follow_filter_order() {
        let mut cache = NoteListCache::new();
        cache.replace_all(vec![note("one", "alpha"), note("two", "")]);
        let rows = cache.rows("");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].preview.as_deref(), Some("alpha"));
        assert_eq!(rows[1].preview, None);
    }
}
