//! The buffer's cursor list: de-duplication, merging, renumbering, and
//! translation of every tracked position across edits.

use crate::cursor::Cursor;
use crate::error::{EditorError, Result};
use crate::line_store::LineStore;
use crate::position::Position;
use tracing::{debug, trace};

/// Non-empty ordered list of cursors with one primary.
///
/// Ordinals are always `0..len` in list order.
#[derive(Clone, Debug)]
pub struct CursorSet {
    cursors: Vec<Cursor>,
    primary: usize,
}

impl CursorSet {
    /// Set holding `cursor` as its only (primary) cursor.
    pub fn new(cursor: Cursor) -> Self {
        let mut set = Self {
            cursors: vec![cursor],
            primary: 0,
        };
        set.renumber();
        set
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn primary(&self) -> &Cursor {
        &self.cursors[self.primary]
    }

    pub fn primary_mut(&mut self) -> &mut Cursor {
        &mut self.cursors[self.primary]
    }

    pub fn primary_index(&self) -> usize {
        self.primary
    }

    /// Make cursor `index` the primary.
    ///
    /// # Errors
    /// [`EditorError::NoSuchCursor`] when `index` is out of range.
    pub fn set_primary(&mut self, index: usize) -> Result<()> {
        if index >= self.cursors.len() {
            return Err(EditorError::NoSuchCursor(index));
        }
        self.primary = index;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Cursor> {
        self.cursors.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Cursor> {
        self.cursors.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cursor> {
        self.cursors.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cursor> {
        self.cursors.iter_mut()
    }

    pub fn as_slice(&self) -> &[Cursor] {
        &self.cursors
    }

    /// True when some cursor sits exactly at `loc`.
    pub fn is_occupied(&self, loc: Position) -> bool {
        self.cursors.iter().any(|cursor| cursor.loc == loc)
    }

    /// Append `cursor` unless another cursor already sits at its location.
    ///
    /// # Returns
    /// The new cursor's ordinal, or `None` when the spot was occupied.
    pub fn add(&mut self, cursor: Cursor) -> Option<usize> {
        if self.is_occupied(cursor.loc) {
            trace!(loc = %cursor.loc, "rejected cursor on occupied location");
            return None;
        }
        self.push(cursor);
        Some(self.cursors.len() - 1)
    }

    /// Append without the occupancy check; callers must `merge` afterwards.
    pub(crate) fn push(&mut self, cursor: Cursor) {
        self.cursors.push(cursor);
        self.renumber();
    }

    /// Remove cursor `index`, renumbering the rest.
    ///
    /// # Errors
    /// [`EditorError::NoSuchCursor`] for an unknown index and
    /// [`EditorError::LastCursor`] when only one cursor remains.
    pub fn remove(&mut self, index: usize) -> Result<Cursor> {
        if index >= self.cursors.len() {
            return Err(EditorError::NoSuchCursor(index));
        }
        if self.cursors.len() == 1 {
            return Err(EditorError::LastCursor);
        }
        let removed = self.cursors.remove(index);
        if index < self.primary {
            self.primary -= 1;
        }
        self.primary = self.primary.min(self.cursors.len() - 1);
        self.renumber();
        Ok(removed)
    }

    /// Keep only the primary cursor, with its selection dropped.
    pub fn clear(&mut self) {
        let mut primary = self.cursors[self.primary];
        primary.reset_selection();
        self.cursors = vec![primary];
        self.primary = 0;
        self.renumber();
    }

    /// Drop every cursor whose location duplicates an earlier cursor's, then
    /// renumber. If the primary is dropped, the earlier cursor it duplicated
    /// becomes primary.
    ///
    /// # Returns
    /// Number of cursors removed.
    pub fn merge(&mut self) -> usize {
        let before = self.cursors.len();
        let mut kept: Vec<Cursor> = Vec::with_capacity(before);
        let mut primary = 0;
        for (index, cursor) in self.cursors.iter().enumerate() {
            match kept.iter().position(|existing| existing.loc == cursor.loc) {
                Some(survivor) => {
                    if index == self.primary {
                        primary = survivor;
                    }
                }
                None => {
                    if index == self.primary {
                        primary = kept.len();
                    }
                    kept.push(*cursor);
                }
            }
        }
        self.cursors = kept;
        self.primary = primary;
        self.renumber();
        let removed = before - self.cursors.len();
        if removed > 0 {
            debug!(removed, remaining = self.cursors.len(), "merged duplicate cursors");
        }
        removed
    }

    fn renumber(&mut self) {
        for (index, cursor) in self.cursors.iter_mut().enumerate() {
            cursor.num = index;
        }
    }

    /// Translate every cursor's location, selection ends and origin across an
    /// insertion that produced the span `[start, end)`.
    pub(crate) fn relocate_after_insert(
        &mut self,
        start: Position,
        end: Position,
        lines: &LineStore,
        tab_width: usize,
    ) {
        trace!(%start, %end, "relocating cursors after insert");
        self.remap(|pos| pos.after_insert(start, end), lines, tab_width);
    }

    /// Translate every cursor across the removal of `[start, end)`.
    pub(crate) fn relocate_after_remove(
        &mut self,
        start: Position,
        end: Position,
        lines: &LineStore,
        tab_width: usize,
    ) {
        trace!(%start, %end, "relocating cursors after remove");
        self.remap(|pos| pos.after_remove(start, end), lines, tab_width);
    }

    fn remap(&mut self, f: impl Fn(Position) -> Position, lines: &LineStore, tab_width: usize) {
        for cursor in &mut self.cursors {
            cursor.map_positions(&f);
            cursor.relocate(lines);
            cursor.store_visual_x(lines, tab_width);
        }
    }

    /// Clamp every cursor into the valid range of `lines`.
    pub(crate) fn relocate(&mut self, lines: &LineStore) {
        for cursor in &mut self.cursors {
            cursor.relocate(lines);
        }
    }
}
