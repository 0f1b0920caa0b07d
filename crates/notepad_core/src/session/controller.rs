//! Editor session state machine.
//!
//! # Responsibility
//! - Own the selected note, its edit buffer and the dirty flag.
//! - Debounce edits into a single `update` call per quiescence window.
//! - Reconcile store results into the selection and the list cache.
//!
//! # Invariants
//! - At most one save is in flight per session.
//! - A save result is applied to `selected_note` only when the selection
//!   still has the id the save was issued for.
//! - Edits that arrive while a save is in flight re-arm the timer only after
//!   that save settles.
//! - Store failures never clear the selection or drop buffered edits.

use super::clock::Clock;
use super::debounce::Debouncer;
use super::list::{NoteListCache, NoteListRow};
use super::SessionOptions;
use crate::model::note::{Note, NoteId, SortOrder, DEFAULT_NOTE_TITLE};
use crate::store::{NoteStore, StoreResult};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::time::Duration;

/// Coarse state of the editor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSelection,
    /// Buffer equals the last-saved note.
    Clean,
    /// Buffer diverges from the last-saved note.
    Dirty,
    /// A save call is in flight.
    Saving,
}

/// In-progress title/content of the selected note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    pub title: String,
    pub content: String,
}

impl EditBuffer {
    fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }

    fn matches(&self, note: &Note) -> bool {
        self.title == note.title && self.content == note.content
    }
}

/// Snapshot of one save call issued by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub ticket: u64,
    pub note_id: NoteId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
struct InFlightSave {
    ticket: u64,
    note_id: NoteId,
    snapshot: EditBuffer,
}

/// Client-side editor session over a [`NoteStore`].
///
/// Time only advances through [`Clock`]; the embedder calls
/// [`EditorSession::tick`] whenever it wakes up, typically at
/// [`EditorSession::next_wakeup_ms`].
pub struct EditorSession<S: NoteStore, C: Clock> {
    store: S,
    clock: C,
    timer: Debouncer,
    list: NoteListCache,
    sort_order: SortOrder,
    search_query: String,
    selected: Option<Note>,
    buffer: EditBuffer,
    dirty: bool,
    in_flight: Option<InFlightSave>,
    rearm_after_save: bool,
    queued_flushes: VecDeque<SaveRequest>,
    next_ticket: u64,
}

impl<S: NoteStore, C: Clock> EditorSession<S, C> {
    pub fn new(store: S, clock: C, options: SessionOptions) -> Self {
        Self {
            store,
            clock,
            timer: Debouncer::new(Duration::from_millis(options.autosave_delay_ms)),
            list: NoteListCache::new(),
            sort_order: options.sort_order,
            search_query: String::new(),
            selected: None,
            buffer: EditBuffer::default(),
            dirty: false,
            in_flight: None,
            rearm_after_save: false,
            queued_flushes: VecDeque::new(),
            next_ticket: 1,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.selected.is_none() {
            SessionState::NoSelection
        } else if self.in_flight.is_some() {
            SessionState::Saving
        } else if self.dirty {
            SessionState::Dirty
        } else {
            SessionState::Clean
        }
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.as_ref()
    }

    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn list(&self) -> &NoteListCache {
        &self.list
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Note id of the save currently in flight, if any.
    pub fn saving_note_id(&self) -> Option<NoteId> {
        self.in_flight.as_ref().map(|save| save.note_id)
    }

    /// Deadline of the pending auto-save, in clock milliseconds.
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        self.timer.deadline_ms()
    }

    /// Reloads the list cache using the current sort order.
    pub fn refresh(&mut self) -> StoreResult<()> {
        match self.store.list(self.sort_order) {
            Ok(notes) => {
                debug!(
                    "event=session_refresh module=session status=ok sort={} count={}",
                    self.sort_order,
                    notes.len()
                );
                self.list.replace_all(notes);
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=session_refresh module=session status=error error_code={} error={}",
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Switches sort order and reloads the list.
    ///
    /// The new order is kept even if the reload fails.
    pub fn set_sort_order(&mut self, sort: SortOrder) -> StoreResult<()> {
        self.sort_order = sort;
        self.refresh()
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Cached notes matching the current search query.
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.list.filter(&self.search_query)
    }

    pub fn visible_rows(&self) -> Vec<NoteListRow> {
        self.list.rows(&self.search_query)
    }

    /// Makes `note` the selection, saving unsaved edits of the previous one first.
    ///
    /// Re-selecting the current note keeps its buffer. A newer cached copy
    /// (for example one just written by the flush) wins over `note`.
    pub fn select(&mut self, note: Note) {
        if self.selected.as_ref().is_some_and(|current| current.id == note.id) {
            return;
        }

        self.flush_before_switch();
        let note = match self.list.get(note.id) {
            Some(cached) if cached.updated_at > note.updated_at => cached.clone(),
            _ => note,
        };
        debug!(
            "event=session_select module=session status=ok note_id={}",
            note.id
        );

        // Coming back to a note whose edits are still unsaved: show those edits.
        self.buffer = self
            .take_pending_edits(note.id)
            .unwrap_or_else(|| EditBuffer::from_note(&note));
        self.dirty = !self.buffer.matches(&note);
        self.selected = Some(note);
        if self.dirty {
            self.schedule_save();
        }
    }

    /// Selects a cached note by id. Returns false when the id is not cached.
    pub fn select_id(&mut self, id: NoteId) -> bool {
        match self.list.get(id).cloned() {
            Some(note) => {
                self.select(note);
                true
            }
            None => false,
        }
    }

    /// Creates a blank note, prepends it to the list and selects it.
    ///
    /// The store call runs before the previous note is flushed; on failure
    /// the selection and buffer are left untouched.
    pub fn create_new(&mut self) -> StoreResult<Note> {
        let note = match self.store.create(DEFAULT_NOTE_TITLE, "") {
            Ok(note) => note,
            Err(err) => {
                warn!(
                    "event=session_create module=session status=error error_code={} error={}",
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "event=session_create module=session status=ok note_id={}",
            note.id
        );
        self.list.prepend(note.clone());
        self.select(note.clone());
        Ok(note)
    }

    /// Replaces the buffered title. Returns false when nothing is selected.
    pub fn edit_title(&mut self, text: impl Into<String>) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.buffer.title = text.into();
        self.after_edit();
        true
    }

    /// Replaces the buffered content. Returns false when nothing is selected.
    pub fn edit_content(&mut self, text: impl Into<String>) -> bool {
        if self.selected.is_none() {
            return false;
        }
        self.buffer.content = text.into();
        self.after_edit();
        true
    }

    /// Issues queued flushes, then fires the auto-save when its window has
    /// elapsed.
    ///
    /// Returns whether a save for the selected note was issued.
    pub fn tick(&mut self) -> bool {
        if self.in_flight.is_none() {
            self.drain_queued_flushes();
        }

        let now = self.clock.now_ms();
        if !self.timer.fire_if_due(now) {
            return false;
        }

        if self.in_flight.is_some() {
            self.rearm_after_save = true;
            return false;
        }

        self.run_save()
    }

    /// Number of saves waiting for the in-flight call to settle.
    pub fn queued_flushes(&self) -> usize {
        self.queued_flushes.len()
    }

    /// Saves immediately, bypassing the debounce window.
    ///
    /// Returns whether a save for the selected note was issued.
    pub fn save_now(&mut self) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        self.timer.cancel();
        self.drain_queued_flushes();
        self.run_save()
    }

    /// Deletes a note. A deleted selection is cleared without saving.
    ///
    /// Callers are expected to have confirmed the deletion with the user.
    pub fn delete(&mut self, id: NoteId) -> StoreResult<bool> {
        let existed = match self.store.delete(id) {
            Ok(existed) => existed,
            Err(err) => {
                warn!(
                    "event=session_delete module=session status=error note_id={} error_code={} error={}",
                    id,
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        self.list.remove(id);
        self.queued_flushes.retain(|request| request.note_id != id);

        let was_selected = self.selected.as_ref().is_some_and(|note| note.id == id);
        if was_selected {
            if self.dirty {
                info!(
                    "event=session_delete module=session status=ok note_id={} discarded_edits=true",
                    id
                );
            }
            self.timer.cancel();
            self.selected = None;
            self.buffer = EditBuffer::default();
            self.dirty = false;
            self.rearm_after_save = false;
        }

        debug!(
            "event=session_delete module=session status=ok note_id={} existed={} was_selected={}",
            id, existed, was_selected
        );
        Ok(existed)
    }

    /// Starts a save and marks it in flight.
    ///
    /// Queued flushes for previously selected notes go first. Returns `None`
    /// when a save is already in flight or nothing needs saving. The caller
    /// must hand the store result to [`EditorSession::finish_save`].
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            return None;
        }

        let request = match self.queued_flushes.pop_front() {
            Some(queued) => queued,
            None => {
                if !self.dirty {
                    return None;
                }
                let note_id = self.selected.as_ref()?.id;
                self.timer.cancel();
                self.rearm_after_save = false;
                self.snapshot_request(note_id)
            }
        };

        self.in_flight = Some(InFlightSave {
            ticket: request.ticket,
            note_id: request.note_id,
            snapshot: EditBuffer {
                title: request.title.clone(),
                content: request.content.clone(),
            },
        });
        debug!(
            "event=session_save module=session status=start note_id={} ticket={}",
            request.note_id, request.ticket
        );
        Some(request)
    }

    /// Settles the in-flight save.
    ///
    /// Returns whether the result was applied to the current selection.
    /// Results for unknown tickets are ignored. Queued flushes are not
    /// issued here; the next `tick` or `begin_save` picks them up.
    pub fn finish_save(&mut self, request: &SaveRequest, result: StoreResult<Note>) -> bool {
        match self.in_flight.as_ref() {
            Some(save) if save.ticket == request.ticket => {}
            _ => {
                warn!(
                    "event=session_save module=session status=ignored note_id={} ticket={} reason=unknown_ticket",
                    request.note_id, request.ticket
                );
                return false;
            }
        }
        self.in_flight = None;

        let is_current = self
            .selected
            .as_ref()
            .is_some_and(|note| note.id == request.note_id);

        let applied = match result {
            Ok(saved) => {
                self.list.upsert(&saved);
                if is_current && saved.id == request.note_id {
                    self.dirty = !self.buffer.matches(&saved);
                    self.selected = Some(saved);
                    debug!(
                        "event=session_save module=session status=ok note_id={} ticket={} dirty={}",
                        request.note_id, request.ticket, self.dirty
                    );
                    true
                } else {
                    debug!(
                        "event=session_save module=session status=stale note_id={} ticket={}",
                        request.note_id, request.ticket
                    );
                    false
                }
            }
            Err(err) => {
                warn!(
                    "event=session_save module=session status=error note_id={} ticket={} error_code={} error={}",
                    request.note_id,
                    request.ticket,
                    err.code(),
                    err
                );
                false
            }
        };

        if std::mem::take(&mut self.rearm_after_save) && self.dirty {
            self.timer.arm(self.clock.now_ms());
        }
        applied
    }

    /// Flushes unsaved edits and queued saves before the session is dropped.
    pub fn close(mut self) -> S {
        self.timer.cancel();
        if self.in_flight.is_none() {
            self.drain_queued_flushes();
            self.run_save();
        }
        info!(
            "event=session_close module=session status=ok dirty={} queued={}",
            self.dirty,
            self.queued_flushes.len()
        );
        self.store
    }

    fn after_edit(&mut self) {
        let Some(saved) = self.selected.as_ref() else {
            return;
        };
        self.dirty = !self.buffer.matches(saved);

        // `selected` is about to be replaced by the in-flight result, so the
        // dirty check is redone when that save settles.
        if self.in_flight.is_some() {
            self.rearm_after_save = true;
        } else if self.dirty {
            self.timer.arm(self.clock.now_ms());
        } else {
            self.timer.cancel();
        }
    }

    /// Arms the timer, or defers arming until the in-flight save settles.
    fn schedule_save(&mut self) {
        if self.in_flight.is_some() {
            self.rearm_after_save = true;
        } else {
            self.timer.arm(self.clock.now_ms());
        }
    }

    /// Newest unsaved edits for `id`: a queued flush, else the in-flight snapshot.
    fn take_pending_edits(&mut self, id: NoteId) -> Option<EditBuffer> {
        if let Some(index) = self
            .queued_flushes
            .iter()
            .position(|request| request.note_id == id)
        {
            let request = self.queued_flushes.remove(index)?;
            return Some(EditBuffer {
                title: request.title,
                content: request.content,
            });
        }

        self.in_flight
            .as_ref()
            .filter(|save| save.note_id == id)
            .map(|save| save.snapshot.clone())
    }

    fn flush_before_switch(&mut self) {
        self.timer.cancel();
        self.rearm_after_save = false;
        if !self.dirty {
            return;
        }
        let Some(previous_id) = self.selected.as_ref().map(|note| note.id) else {
            return;
        };

        if self.in_flight.is_none() {
            self.drain_queued_flushes();
            if !self.run_save() || self.dirty {
                warn!(
                    "event=session_select module=session status=error note_id={} reason=save_before_switch_failed",
                    previous_id
                );
            }
            return;
        }

        let already_in_flight = self
            .in_flight
            .as_ref()
            .is_some_and(|save| save.note_id == previous_id && save.snapshot == self.buffer);
        if already_in_flight {
            return;
        }

        let request = self.snapshot_request(previous_id);
        self.queued_flushes
            .retain(|queued| queued.note_id != request.note_id);
        self.queued_flushes.push_back(request);
        debug!(
            "event=session_select module=session status=queued note_id={} queued={}",
            previous_id,
            self.queued_flushes.len()
        );
    }

    fn drain_queued_flushes(&mut self) {
        while !self.queued_flushes.is_empty() && self.in_flight.is_none() {
            if !self.run_save() {
                break;
            }
        }
    }

    /// Runs begin/update/finish synchronously against the store.
    fn run_save(&mut self) -> bool {
        let Some(request) = self.begin_save() else {
            return false;
        };
        let result = self.store.update(
            request.note_id,
            Some(request.title.as_str()),
            Some(request.content.as_str()),
        );
        self.finish_save(&request, result);
        true
    }

    fn snapshot_request(&mut self, note_id: NoteId) -> SaveRequest {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        SaveRequest {
            ticket,
            note_id,
            title: self.buffer.title.clone(),
            content: self.buffer.content.clone(),
        }
    }
}
