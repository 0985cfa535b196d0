//! Undo/redo history of invertible text events.

use crate::config::EditorSettings;
use crate::cursor::Cursor;
use crate::cursor_set::CursorSet;
use crate::line_store::LineStore;
use crate::position::Position;
use std::time::{Duration, Instant};
use tracing::debug;

/// What an event does when executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Insert,
    Remove,
    /// Remove each delta's span and insert its text in its place.
    Replace,
}

impl EventKind {
    /// Kind that undoes this one. `Replace` is its own inverse because its
    /// deltas swap their text on every execution.
    pub fn inverse(self) -> Self {
        match self {
            Self::Insert => Self::Remove,
            Self::Remove => Self::Insert,
            Self::Replace => Self::Replace,
        }
    }
}

/// One atomic inserted-or-removed span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delta {
    pub text: String,
    pub start: Position,
    pub end: Position,
}

impl Delta {
    pub fn new(text: impl Into<String>, start: Position, end: Position) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// A recorded edit: its deltas, the primary cursor as it was when the edit
/// was made, and when it happened.
#[derive(Clone, Debug)]
pub struct TextEvent {
    pub(crate) kind: EventKind,
    pub(crate) deltas: Vec<Delta>,
    pub(crate) snapshot: Cursor,
    pub(crate) at: Instant,
}

impl TextEvent {
    pub fn insert(pos: Position, text: &str, snapshot: Cursor, at: Instant) -> Self {
        Self {
            kind: EventKind::Insert,
            deltas: vec![Delta::new(text, pos, pos)],
            snapshot,
            at,
        }
    }

    pub fn remove(start: Position, end: Position, snapshot: Cursor, at: Instant) -> Self {
        Self {
            kind: EventKind::Remove,
            deltas: vec![Delta::new(String::new(), start, end)],
            snapshot,
            at,
        }
    }

    /// Batch replacement. Deltas execute in the given order, each against the
    /// text as left by the ones before it.
    pub fn replace(deltas: Vec<Delta>, snapshot: Cursor, at: Instant) -> Self {
        Self {
            kind: EventKind::Replace,
            deltas,
            snapshot,
            at,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn deltas(&self) -> &[Delta] {
        &self.deltas
    }

    pub fn snapshot(&self) -> &Cursor {
        &self.snapshot
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    fn text_bytes(&self) -> usize {
        self.deltas.iter().map(|delta| delta.text.len()).sum()
    }
}

/// Run `event` against `lines`, translating every cursor after each delta.
///
/// Deltas are updated in place so the event can be inverted: removals record
/// the removed text, insertions record where they ended. Replace events
/// reverse their delta order afterwards so that the inverse replays from the
/// last applied delta back to the first.
pub(crate) fn apply_event(
    event: &mut TextEvent,
    lines: &mut LineStore,
    cursors: &mut CursorSet,
    tab_width: usize,
) {
    match event.kind {
        EventKind::Insert => {
            for delta in &mut event.deltas {
                let end = lines.insert(delta.start, &delta.text);
                delta.end = end;
                cursors.relocate_after_insert(delta.start, end, lines, tab_width);
            }
        }
        EventKind::Remove => {
            for delta in &mut event.deltas {
                delta.text = lines.remove(delta.start, delta.end);
                cursors.relocate_after_remove(delta.start, delta.end, lines, tab_width);
            }
        }
        EventKind::Replace => {
            for delta in &mut event.deltas {
                let removed = lines.remove(delta.start, delta.end);
                cursors.relocate_after_remove(delta.start, delta.end, lines, tab_width);
                let end = lines.insert(delta.start, &delta.text);
                cursors.relocate_after_insert(delta.start, end, lines, tab_width);
                delta.text = removed;
                delta.end = end;
            }
            event.deltas.reverse();
        }
    }
}

/// Restore the cursor recorded in `event` onto the live cursor with the same
/// ordinal, storing the live cursor in the event for the opposite direction.
/// Skipped when that ordinal no longer exists.
fn swap_snapshot(event: &mut TextEvent, cursors: &mut CursorSet, lines: &LineStore) {
    let ordinal = event.snapshot.num;
    if let Some(cursor) = cursors.get_mut(ordinal) {
        let current = *cursor;
        cursor.goto(&event.snapshot);
        cursor.relocate(lines);
        event.snapshot = current;
    }
}

/// Undo and redo stacks with time-window coalescing and bounded memory.
#[derive(Debug)]
pub struct EventHistory {
    undo: Vec<TextEvent>,
    redo: Vec<TextEvent>,
    undo_bytes: usize,
    max_events: usize,
    max_bytes: usize,
    threshold: Duration,
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

impl EventHistory {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            undo_bytes: 0,
            max_events: settings.max_history_events,
            max_bytes: settings.max_history_bytes,
            threshold: settings.undo_threshold,
        }
    }

    /// Coalescing window.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Execute `event` and push it onto the undo stack, clearing redo.
    pub fn execute(
        &mut self,
        mut event: TextEvent,
        lines: &mut LineStore,
        cursors: &mut CursorSet,
        tab_width: usize,
    ) {
        apply_event(&mut event, lines, cursors, tab_width);
        self.redo.clear();
        self.push_undo(event);
    }

    fn push_undo(&mut self, event: TextEvent) {
        self.undo_bytes = self.undo_bytes.saturating_add(event.text_bytes());
        self.undo.push(event);
        self.trim_undo();
    }

    fn trim_undo(&mut self) {
        while self.undo.len() > self.max_events || self.undo_bytes > self.max_bytes {
            if self.undo.is_empty() {
                break;
            }
            let removed = self.undo.remove(0);
            self.undo_bytes = self.undo_bytes.saturating_sub(removed.text_bytes());
        }
    }

    fn undo_one(
        &mut self,
        lines: &mut LineStore,
        cursors: &mut CursorSet,
        tab_width: usize,
    ) -> Option<Instant> {
        let mut event = self.undo.pop()?;
        self.undo_bytes = self.undo_bytes.saturating_sub(event.text_bytes());
        event.kind = event.kind.inverse();
        apply_event(&mut event, lines, cursors, tab_width);
        swap_snapshot(&mut event, cursors, lines);
        let at = event.at;
        self.redo.push(event);
        Some(at)
    }

    fn redo_one(
        &mut self,
        lines: &mut LineStore,
        cursors: &mut CursorSet,
        tab_width: usize,
    ) -> Option<Instant> {
        let mut event = self.redo.pop()?;
        swap_snapshot(&mut event, cursors, lines);
        event.kind = event.kind.inverse();
        apply_event(&mut event, lines, cursors, tab_width);
        let at = event.at;
        self.push_undo(event);
        Some(at)
    }

    /// Undo the most recent event, then keep undoing while each next event is
    /// less than the coalescing window older than the one just undone.
    ///
    /// # Returns
    /// Number of events undone; `0` when there was nothing to undo.
    pub fn undo(
        &mut self,
        lines: &mut LineStore,
        cursors: &mut CursorSet,
        tab_width: usize,
    ) -> usize {
        let Some(mut last_at) = self.undo_one(lines, cursors, tab_width) else {
            return 0;
        };
        let mut count = 1;
        while let Some(next_at) = self.undo.last().map(TextEvent::at) {
            if last_at.saturating_duration_since(next_at) >= self.threshold {
                break;
            }
            self.undo_one(lines, cursors, tab_width);
            last_at = next_at;
            count += 1;
        }
        debug!(count, remaining = self.undo.len(), "undo");
        count
    }

    /// Mirror of [`EventHistory::undo`] walking forward in time.
    pub fn redo(
        &mut self,
        lines: &mut LineStore,
        cursors: &mut CursorSet,
        tab_width: usize,
    ) -> usize {
        let Some(mut last_at) = self.redo_one(lines, cursors, tab_width) else {
            return 0;
        };
        let mut count = 1;
        while let Some(next_at) = self.redo.last().map(TextEvent::at) {
            if next_at.saturating_duration_since(last_at) >= self.threshold {
                break;
            }
            self.redo_one(lines, cursors, tab_width);
            last_at = next_at;
            count += 1;
        }
        debug!(count, remaining = self.redo.len(), "redo");
        count
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Most recent undoable event.
    pub fn last_event(&self) -> Option<&TextEvent> {
        self.undo.last()
    }

    /// Forget all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.undo_bytes = 0;
    }
}
