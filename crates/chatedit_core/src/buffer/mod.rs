//! The editable text of one input field: content, cursors, history and
//! modification state behind a single API.

mod actions;

use crate::clock::{Clock, SystemClock};
use crate::config::EditorSettings;
use crate::constants::MAX_READ_PREALLOC_BYTES;
use crate::cursor::{Cursor, Motion, Selection};
use crate::cursor_set::CursorSet;
use crate::diff::{self, ApplyDiffSummary, DiffEdit};
use crate::dirty::{DirtyPolicy, DirtyTracker};
use crate::error::{EditorError, Result};
use crate::history::{Delta, EventHistory, TextEvent};
use crate::line_store::LineStore;
use crate::position::Position;
use crate::text::char_pos_for_visual;
use std::io::Read;
use std::time::Instant;
use tracing::{debug, warn};

/// Text model for one editable field.
///
/// Every mutation is recorded in the undo history and translates all cursors.
/// Positions passed in are validated; out-of-range input is rejected with
/// [`EditorError::InvalidPosition`] rather than clamped.
#[derive(Debug)]
pub struct Buffer {
    lines: LineStore,
    cursors: CursorSet,
    history: EventHistory,
    dirty: DirtyTracker,
    settings: EditorSettings,
    clock: Box<dyn Clock>,
}

impl Buffer {
    /// Create a buffer holding `text`, with one cursor at the start.
    ///
    /// # Errors
    /// [`EditorError::InvalidSettings`] when `settings` fail validation.
    pub fn new(text: &str, settings: EditorSettings) -> Result<Self> {
        Self::with_clock(text, settings, SystemClock)
    }

    /// Like [`Buffer::new`] with an explicit time source for history
    /// timestamps.
    pub fn with_clock(
        text: &str,
        settings: EditorSettings,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        settings.validate()?;
        let lines = LineStore::new(text);
        let policy = settings
            .dirty_policy
            .resolve(lines.len_bytes(), settings.fast_dirty_threshold);
        let cursors = CursorSet::new(Cursor::at(Position::ORIGIN, &lines, settings.tab_width));
        debug!(
            lines = lines.line_count(),
            bytes = lines.len_bytes(),
            ?policy,
            "created buffer"
        );
        Ok(Self {
            dirty: DirtyTracker::new(policy, &lines),
            history: EventHistory::from_settings(&settings),
            lines,
            cursors,
            settings,
            clock: Box::new(clock),
        })
    }

    /// Read the initial content from `reader`. `size_hint` pre-sizes the read
    /// buffer. Invalid UTF-8 is replaced with U+FFFD.
    ///
    /// # Errors
    /// [`EditorError::Io`] when reading fails, or invalid settings.
    pub fn from_reader<R: Read>(
        mut reader: R,
        size_hint: usize,
        settings: EditorSettings,
    ) -> Result<Self> {
        let mut bytes = Vec::with_capacity(size_hint.min(MAX_READ_PREALLOC_BYTES));
        reader.read_to_end(&mut bytes)?;
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                warn!(
                    valid_up_to = err.utf8_error().valid_up_to(),
                    "input is not valid UTF-8; substituting replacement characters"
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        Self::new(&text, settings)
    }

    /// Replace the whole content, forgetting history and all but one cursor.
    /// The new content is the clean baseline.
    pub fn reset(&mut self, text: &str) {
        self.lines = LineStore::new(text);
        self.cursors = CursorSet::new(Cursor::at(
            Position::ORIGIN,
            &self.lines,
            self.settings.tab_width,
        ));
        self.history.clear();
        let policy = self
            .settings
            .dirty_policy
            .resolve(self.lines.len_bytes(), self.settings.fast_dirty_threshold);
        self.dirty = DirtyTracker::new(policy, &self.lines);
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    fn tab_width(&self) -> usize {
        self.settings.tab_width
    }

    fn now(&self) -> Instant {
        self.clock.now()
    }

    // ---- validation ------------------------------------------------------

    fn check_position(&self, position: Position) -> Result<()> {
        check_position_in(&self.lines, position)
    }

    fn check_range(&self, start: Position, end: Position) -> Result<()> {
        check_range_in(&self.lines, start, end)
    }

    fn check_cursor(&self, index: usize) -> Result<()> {
        if index >= self.cursors.len() {
            return Err(EditorError::NoSuchCursor(index));
        }
        Ok(())
    }

    // ---- queries ---------------------------------------------------------

    /// Line `n` without its line break.
    pub fn line(&self, n: usize) -> Option<String> {
        self.lines.line(n)
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    /// Read-only view of the underlying storage.
    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    /// Text in `[start, end)`.
    ///
    /// # Errors
    /// Invalid positions or `start > end`.
    pub fn text_between(&self, start: Position, end: Position) -> Result<String> {
        self.check_range(start, end)?;
        Ok(self.lines.substring(start, end))
    }

    pub fn full_text(&self) -> String {
        self.lines.to_string()
    }

    pub fn start(&self) -> Position {
        self.lines.start()
    }

    pub fn end(&self) -> Position {
        self.lines.end()
    }

    /// Rune at `pos`; `'\n'` at a non-final line end, `None` at the buffer
    /// end.
    pub fn rune_at(&self, pos: Position) -> Result<Option<char>> {
        self.check_position(pos)?;
        Ok(self.lines.rune_at(pos))
    }

    // ---- mutation --------------------------------------------------------

    fn execute(&mut self, event: TextEvent) {
        let tab_width = self.tab_width();
        self.history.execute(event, &mut self.lines, &mut self.cursors, tab_width);
        self.cursors.merge();
        self.dirty.mark_dirty();
    }

    fn snapshot(&self) -> Cursor {
        *self.cursors.primary()
    }

    /// Insert `text` at `pos`.
    pub fn insert(&mut self, pos: Position, text: &str) -> Result<()> {
        self.check_position(pos)?;
        if text.is_empty() {
            return Ok(());
        }
        let event = TextEvent::insert(pos, text, self.snapshot(), self.now());
        self.execute(event);
        Ok(())
    }

    /// Remove the span `[start, end)`.
    pub fn remove(&mut self, start: Position, end: Position) -> Result<()> {
        self.check_range(start, end)?;
        if start == end {
            return Ok(());
        }
        let event = TextEvent::remove(start, end, self.snapshot(), self.now());
        self.execute(event);
        Ok(())
    }

    /// Remove `[start, end)` then insert `text` at `start`. Both events share
    /// a timestamp and undo as one step.
    pub fn replace(&mut self, start: Position, end: Position, text: &str) -> Result<()> {
        self.check_range(start, end)?;
        let at = self.now();
        if start != end {
            let event = TextEvent::remove(start, end, self.snapshot(), at);
            self.execute(event);
        }
        if !text.is_empty() {
            let event = TextEvent::insert(start, text, self.snapshot(), at);
            self.execute(event);
        }
        Ok(())
    }

    /// Apply many replacements as one Replace event.
    ///
    /// Deltas run in order, each against the text left by the ones before,
    /// so order them last-position-first when they refer to the original
    /// text. Each delta is checked against the content it will meet; if any
    /// is out of range nothing is applied.
    pub fn multi_replace(&mut self, deltas: Vec<Delta>) -> Result<()> {
        let mut scratch = self.lines.clone();
        for delta in &deltas {
            check_range_in(&scratch, delta.start, delta.end)?;
            scratch.remove(delta.start, delta.end);
            scratch.insert(delta.start, &delta.text);
        }
        if deltas.is_empty() {
            return Ok(());
        }
        let event = TextEvent::replace(deltas, self.snapshot(), self.now());
        self.execute(event);
        Ok(())
    }

    // ---- history ---------------------------------------------------------

    /// Undo the latest burst of edits.
    ///
    /// # Returns
    /// Number of events undone.
    pub fn undo(&mut self) -> usize {
        let tab_width = self.tab_width();
        let count = self
            .history
            .undo(&mut self.lines, &mut self.cursors, tab_width);
        if count > 0 {
            self.cursors.merge();
            self.dirty.mark_dirty();
        }
        count
    }

    /// Redo the next burst of undone edits.
    pub fn redo(&mut self) -> usize {
        let tab_width = self.tab_width();
        let count = self
            .history
            .redo(&mut self.lines, &mut self.cursors, tab_width);
        if count > 0 {
            self.cursors.merge();
            self.dirty.mark_dirty();
        }
        count
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    /// Rewrite the content to `target` by replaying only the differing spans
    /// as insert/remove events, all sharing one timestamp.
    pub fn apply_diff(&mut self, target: &str) -> ApplyDiffSummary {
        let current = self.full_text();
        let edits = diff::plan_edits(&current, target, self.settings.diff_timeout);
        let at = self.now();
        let mut summary = ApplyDiffSummary::default();
        for edit in edits {
            let event = match edit {
                DiffEdit::Remove { start, end } => {
                    summary.removed_chars += end - start;
                    let start = self.lines.char_to_pos(start);
                    let end = self.lines.char_to_pos(end);
                    TextEvent::remove(start, end, self.snapshot(), at)
                }
                DiffEdit::Insert { at: offset, text } => {
                    summary.inserted_chars += text.chars().count();
                    let pos = self.lines.char_to_pos(offset);
                    TextEvent::insert(pos, &text, self.snapshot(), at)
                }
            };
            self.execute(event);
            summary.edits += 1;
        }
        debug!(
            edits = summary.edits,
            inserted = summary.inserted_chars,
            removed = summary.removed_chars,
            "applied diff"
        );
        summary
    }

    // ---- modification state ----------------------------------------------

    /// Whether the content differs from the last clean baseline.
    pub fn is_modified(&self) -> bool {
        self.dirty.is_modified(&self.lines)
    }

    /// Take the current content as the clean baseline.
    pub fn mark_clean(&mut self) {
        self.dirty.mark_clean(&self.lines);
    }

    /// Policy chosen at load time.
    pub fn dirty_policy(&self) -> DirtyPolicy {
        self.dirty.policy()
    }

    // ---- cursors ---------------------------------------------------------

    pub fn cursors(&self) -> &CursorSet {
        &self.cursors
    }

    pub fn primary_cursor(&self) -> &Cursor {
        self.cursors.primary()
    }

    pub fn cursor(&self, index: usize) -> Option<&Cursor> {
        self.cursors.get(index)
    }

    /// Add a cursor at `pos`.
    ///
    /// # Returns
    /// Its ordinal, or `None` when another cursor already sits there.
    pub fn add_cursor(&mut self, pos: Position) -> Result<Option<usize>> {
        self.check_position(pos)?;
        let cursor = Cursor::at(pos, &self.lines, self.tab_width());
        Ok(self.cursors.add(cursor))
    }

    pub fn remove_cursor(&mut self, index: usize) -> Result<Cursor> {
        self.cursors.remove(index)
    }

    /// Drop cursors sharing a location; returns how many were removed.
    pub fn merge_cursors(&mut self) -> usize {
        self.cursors.merge()
    }

    pub fn clear_cursors(&mut self) {
        self.cursors.clear();
    }

    pub fn set_primary(&mut self, index: usize) -> Result<()> {
        self.cursors.set_primary(index)
    }

    fn with_cursor<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Cursor, &LineStore, usize) -> T,
    ) -> Result<T> {
        let tab_width = self.tab_width();
        let cursor = self
            .cursors
            .get_mut(index)
            .ok_or(EditorError::NoSuchCursor(index))?;
        Ok(f(cursor, &self.lines, tab_width))
    }

    /// Move cursor `index`, extending its selection when `select` is set.
    pub fn move_cursor(&mut self, index: usize, motion: Motion, select: bool) -> Result<()> {
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.apply_motion(motion, select, lines, tab)
        })?;
        self.cursors.merge();
        Ok(())
    }

    /// Move every cursor, then merge any that met.
    pub fn move_cursors(&mut self, motion: Motion, select: bool) {
        let tab_width = self.tab_width();
        for cursor in self.cursors.iter_mut() {
            cursor.apply_motion(motion, select, &self.lines, tab_width);
        }
        self.cursors.merge();
    }

    /// Place cursor `index` at `pos`, dropping its selection.
    pub fn set_cursor_location(&mut self, index: usize, pos: Position) -> Result<()> {
        self.check_position(pos)?;
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.set_location(pos, lines, tab);
            cursor.reset_selection();
        })?;
        self.cursors.merge();
        Ok(())
    }

    /// Drag cursor `index` to `target`, selecting between its origin anchor
    /// and `target`.
    pub fn select_to(&mut self, index: usize, target: Position) -> Result<()> {
        self.check_position(target)?;
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.set_location(target, lines, tab);
            cursor.select_to(target);
        })
    }

    pub fn select_word(&mut self, index: usize) -> Result<()> {
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.select_word(lines);
            cursor.store_visual_x(lines, tab);
        })
    }

    pub fn add_word_to_selection(&mut self, index: usize) -> Result<()> {
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.add_word_to_selection(lines);
            cursor.store_visual_x(lines, tab);
        })
    }

    pub fn select_line(&mut self, index: usize) -> Result<()> {
        self.with_cursor(index, |cursor, lines, tab| cursor.select_line(lines, tab))
    }

    pub fn add_line_to_selection(&mut self, index: usize) -> Result<()> {
        self.with_cursor(index, |cursor, lines, tab| {
            cursor.add_line_to_selection(lines, tab)
        })
    }

    /// Collapse to the primary cursor and select the whole buffer with it.
    pub fn select_all(&mut self) {
        self.cursors.clear();
        let tab_width = self.tab_width();
        self.cursors.primary_mut().select_all(&self.lines, tab_width);
    }

    /// Text selected by cursor `index`; empty without a selection.
    pub fn selected_text(&self, index: usize) -> Result<String> {
        let cursor = self
            .cursors
            .get(index)
            .ok_or(EditorError::NoSuchCursor(index))?;
        let (lo, hi) = cursor.selection().ordered();
        Ok(self.lines.substring(lo, hi))
    }

    /// Remove the selection of cursor `index`, leaving the caret at its
    /// lower bound. No-op without a selection.
    pub fn delete_selection(&mut self, index: usize) -> Result<()> {
        self.check_cursor(index)?;
        let cursor = self.cursors.as_slice()[index];
        if !cursor.has_selection() {
            return Ok(());
        }
        let (lo, hi) = cursor.selection().ordered();
        let event = TextEvent::remove(lo, hi, self.snapshot(), self.now());
        let tab_width = self.tab_width();
        self.history
            .execute(event, &mut self.lines, &mut self.cursors, tab_width);
        if let Some(cursor) = self.cursors.get_mut(index) {
            cursor.set_location(lo, &self.lines, tab_width);
            cursor.reset_selection();
        }
        self.cursors.merge();
        self.dirty.mark_dirty();
        Ok(())
    }

    /// With exactly one cursor holding a selection, put one cursor at the
    /// start of every selected line. A selection ending at column 0 does not
    /// claim its last line.
    ///
    /// # Returns
    /// The number of cursors afterwards.
    pub fn spawn_cursors_on_selected_lines(&mut self) -> usize {
        if self.cursors.len() != 1 || !self.cursors.primary().has_selection() {
            return self.cursors.len();
        }
        let Selection { start, end } = self.cursors.primary().selection();
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let last_y = if hi.x == 0 && hi.y > lo.y { hi.y - 1 } else { hi.y };
        let tab_width = self.tab_width();
        let first = Cursor::at(Position::new(0, lo.y), &self.lines, tab_width);
        self.cursors.primary_mut().goto(&first);
        for y in lo.y + 1..=last_y {
            self.cursors
                .push(Cursor::at(Position::new(0, y), &self.lines, tab_width));
        }
        self.cursors.merge();
        self.cursors.len()
    }

    /// Add a cursor one line above the primary at its visual column.
    pub fn spawn_cursor_above(&mut self) -> Option<usize> {
        let primary = *self.cursors.primary();
        let y = primary.location().y.checked_sub(1)?;
        self.spawn_on_line(y, primary.last_visual_x())
    }

    /// Add a cursor one line below the primary at its visual column.
    pub fn spawn_cursor_below(&mut self) -> Option<usize> {
        let primary = *self.cursors.primary();
        let y = primary.location().y + 1;
        if y >= self.lines.line_count() {
            return None;
        }
        self.spawn_on_line(y, primary.last_visual_x())
    }

    fn spawn_on_line(&mut self, y: usize, visual: usize) -> Option<usize> {
        let line = self.lines.line(y)?;
        let x = char_pos_for_visual(&line, visual, self.tab_width());
        let mut cursor = Cursor::new(Position::new(x, y));
        cursor.last_visual_x = visual;
        self.cursors.add(cursor)
    }
}

fn check_position_in(lines: &LineStore, position: Position) -> Result<()> {
    if position.is_valid(lines) {
        return Ok(());
    }
    let line_count = lines.line_count();
    Err(EditorError::InvalidPosition {
        position,
        line_count,
        line_len: (position.y < line_count).then(|| lines.line_len(position.y)),
    })
}

fn check_range_in(lines: &LineStore, start: Position, end: Position) -> Result<()> {
    check_position_in(lines, start)?;
    check_position_in(lines, end)?;
    if start > end {
        return Err(EditorError::InvalidRange { start, end });
    }
    Ok(())
}
