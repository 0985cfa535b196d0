//! Caret, selection and per-cursor motion.

use crate::line_store::LineStore;
use crate::position::Position;
use crate::text::{char_pos_for_visual, is_whitespace, is_word_char, leading_whitespace, visual_x};

/// A pair of positions. Not necessarily ordered; use [`Selection::ordered`]
/// when direction matters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Zero-width selection at `at`.
    pub const fn empty(at: Position) -> Self {
        Self { start: at, end: at }
    }

    /// True iff both ends are the exact same position.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `(lower, upper)` bounds.
    pub fn ordered(&self) -> (Position, Position) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }

    fn map(self, f: &impl Fn(Position) -> Position) -> Self {
        Self::new(f(self.start), f(self.end))
    }
}

/// Movement commands understood by [`Cursor::apply_motion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// Move up by the given number of lines.
    PageUp(usize),
    /// Move down by the given number of lines.
    PageDown(usize),
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    /// First non-whitespace rune, toggling to column 0 when already there.
    StartOfText,
    BufferStart,
    BufferEnd,
}

/// One caret with its selection state.
///
/// `Cursor` is `Copy`: history snapshots are independent values and can never
/// alias a live cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub(crate) loc: Position,
    pub(crate) selection: Selection,
    /// Selection captured when a select-word/line gesture started; its start
    /// is the fixed anchor for `select_to`.
    pub(crate) origin: Selection,
    pub(crate) last_visual_x: usize,
    pub(crate) num: usize,
}

impl Cursor {
    /// Cursor at `loc` with no selection.
    pub fn new(loc: Position) -> Self {
        Self {
            loc,
            selection: Selection::empty(loc),
            origin: Selection::empty(loc),
            last_visual_x: 0,
            num: 0,
        }
    }

    /// Cursor at `loc` with its visual column computed from `lines`.
    pub fn at(loc: Position, lines: &LineStore, tab_width: usize) -> Self {
        let mut cursor = Self::new(loc);
        cursor.store_visual_x(lines, tab_width);
        cursor
    }

    pub fn location(&self) -> Position {
        self.loc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn origin(&self) -> Selection {
        self.origin
    }

    /// Fixed starting point used by [`Cursor::select_to`].
    pub fn origin_anchor(&self) -> Position {
        self.origin.start
    }

    pub fn last_visual_x(&self) -> usize {
        self.last_visual_x
    }

    /// Position of this cursor in its buffer's cursor list.
    pub fn ordinal(&self) -> usize {
        self.num
    }

    /// True iff the selection ends differ as exact positions.
    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    /// Copy location, selection, origin and visual column from `other`,
    /// keeping this cursor's ordinal.
    pub fn goto(&mut self, other: &Cursor) {
        self.loc = other.loc;
        self.selection = other.selection;
        self.origin = other.origin;
        self.last_visual_x = other.last_visual_x;
    }

    /// Pull every tracked position back into the buffer's valid range.
    pub fn relocate(&mut self, lines: &LineStore) {
        self.map_positions(|pos| pos.clamp(lines));
    }

    pub(crate) fn map_positions(&mut self, f: impl Fn(Position) -> Position) {
        self.loc = f(self.loc);
        self.selection = self.selection.map(&f);
        self.origin = self.origin.map(&f);
    }

    pub fn set_selection_start(&mut self, pos: Position) {
        self.selection.start = pos;
    }

    pub fn set_selection_end(&mut self, pos: Position) {
        self.selection.end = pos;
    }

    /// Drop the selection, collapsing it onto the caret.
    pub fn reset_selection(&mut self) {
        self.selection = Selection::empty(self.loc);
        self.origin = Selection::empty(self.loc);
    }

    /// Move the caret to the lower (`to_start`) or upper bound of the
    /// selection and drop it.
    pub fn deselect(&mut self, to_start: bool, lines: &LineStore, tab_width: usize) {
        if self.has_selection() {
            let (lo, hi) = self.selection.ordered();
            self.loc = if to_start { lo } else { hi };
            self.store_visual_x(lines, tab_width);
        }
        self.reset_selection();
    }

    /// Rune under the caret (`'\n'` at a non-final line end).
    pub fn rune_under(&self, lines: &LineStore) -> Option<char> {
        lines.rune_at(self.loc)
    }

    /// Screen column of the caret.
    pub fn visual_x(&self, lines: &LineStore, tab_width: usize) -> usize {
        let line = lines.line(self.loc.y).unwrap_or_default();
        visual_x(&line, self.loc.x, tab_width)
    }

    /// Remember the current screen column for vertical movement.
    pub fn store_visual_x(&mut self, lines: &LineStore, tab_width: usize) {
        self.last_visual_x = self.visual_x(lines, tab_width);
    }

    /// Place the caret without touching the selection.
    pub(crate) fn set_location(&mut self, pos: Position, lines: &LineStore, tab_width: usize) {
        self.loc = pos;
        self.store_visual_x(lines, tab_width);
    }

    pub fn left(&mut self, lines: &LineStore, tab_width: usize) {
        let next = self.loc.step_left(lines);
        self.set_location(next, lines, tab_width);
    }

    pub fn right(&mut self, lines: &LineStore, tab_width: usize) {
        let next = self.loc.step_right(lines);
        self.set_location(next, lines, tab_width);
    }

    pub fn up(&mut self, lines: &LineStore, tab_width: usize) {
        self.up_n(1, lines, tab_width);
    }

    pub fn down(&mut self, lines: &LineStore, tab_width: usize) {
        self.down_n(1, lines, tab_width);
    }

    /// Move up `amount` lines, landing on the remembered visual column.
    /// On the first line the caret goes to column 0.
    pub fn up_n(&mut self, amount: usize, lines: &LineStore, tab_width: usize) {
        if amount == 0 {
            return;
        }
        if self.loc.y == 0 {
            self.set_location(Position::new(0, 0), lines, tab_width);
            return;
        }
        let y = self.loc.y.saturating_sub(amount);
        self.land_on_line(y, lines, tab_width);
    }

    /// Move down `amount` lines, landing on the remembered visual column.
    /// On the last line the caret goes to the line end.
    pub fn down_n(&mut self, amount: usize, lines: &LineStore, tab_width: usize) {
        if amount == 0 {
            return;
        }
        let last = lines.line_count() - 1;
        if self.loc.y == last {
            let end = Position::new(lines.line_len(last), last);
            self.set_location(end, lines, tab_width);
            return;
        }
        let y = (self.loc.y + amount).min(last);
        self.land_on_line(y, lines, tab_width);
    }

    fn land_on_line(&mut self, y: usize, lines: &LineStore, tab_width: usize) {
        let line = lines.line(y).unwrap_or_default();
        let x = char_pos_for_visual(&line, self.last_visual_x, tab_width);
        self.loc = Position::new(x, y);
    }

    pub fn start(&mut self, lines: &LineStore, tab_width: usize) {
        self.set_location(Position::new(0, self.loc.y), lines, tab_width);
    }

    pub fn end(&mut self, lines: &LineStore, tab_width: usize) {
        let end = Position::new(lines.line_len(self.loc.y), self.loc.y);
        self.set_location(end, lines, tab_width);
    }

    fn first_text_column(&self, lines: &LineStore) -> usize {
        let line = lines.line(self.loc.y).unwrap_or_default();
        leading_whitespace(&line).chars().count()
    }

    pub fn is_start_of_text(&self, lines: &LineStore) -> bool {
        self.loc.x == self.first_text_column(lines)
    }

    /// Go to the first non-whitespace rune, or to column 0 when already there.
    pub fn start_of_text(&mut self, lines: &LineStore, tab_width: usize) {
        let column = self.first_text_column(lines);
        let x = if self.loc.x == column { 0 } else { column };
        self.set_location(Position::new(x, self.loc.y), lines, tab_width);
    }

    /// Skip one whitespace run (crossing lines), then one word run; a
    /// punctuation rune is skipped on its own.
    pub fn word_right(&mut self, lines: &LineStore, tab_width: usize) {
        let mut pos = self.loc;
        while lines.rune_at(pos).is_some_and(is_whitespace) {
            pos = pos.step_right(lines);
        }
        match lines.rune_at(pos) {
            Some(ch) if is_word_char(ch) => {
                while lines.rune_at(pos).is_some_and(is_word_char) {
                    pos = pos.step_right(lines);
                }
            }
            Some(_) => pos = pos.step_right(lines),
            None => {}
        }
        self.set_location(pos, lines, tab_width);
    }

    /// Mirror of [`Cursor::word_right`].
    pub fn word_left(&mut self, lines: &LineStore, tab_width: usize) {
        let rune_before = |pos: Position| {
            if pos == Position::ORIGIN {
                None
            } else {
                lines.rune_at(pos.step_left(lines))
            }
        };
        let mut pos = self.loc;
        while rune_before(pos).is_some_and(is_whitespace) {
            pos = pos.step_left(lines);
        }
        match rune_before(pos) {
            Some(ch) if is_word_char(ch) => {
                while rune_before(pos).is_some_and(is_word_char) {
                    pos = pos.step_left(lines);
                }
            }
            Some(_) => pos = pos.step_left(lines),
            None => {}
        }
        self.set_location(pos, lines, tab_width);
    }

    /// Run one motion. With `select`, the selection grows from the origin
    /// anchor to the new caret; without it, an existing selection is dropped
    /// (horizontal moves collapse onto the matching selection edge instead of
    /// moving).
    pub fn apply_motion(
        &mut self,
        motion: Motion,
        select: bool,
        lines: &LineStore,
        tab_width: usize,
    ) {
        if select {
            if !self.has_selection() {
                self.origin = Selection::empty(self.loc);
            }
            self.run_motion(motion, lines, tab_width);
            self.select_to(self.loc);
            return;
        }
        if self.has_selection() {
            match motion {
                Motion::Left => return self.deselect(true, lines, tab_width),
                Motion::Right => return self.deselect(false, lines, tab_width),
                Motion::Up | Motion::PageUp(_) => self.deselect(true, lines, tab_width),
                Motion::Down | Motion::PageDown(_) => self.deselect(false, lines, tab_width),
                _ => self.reset_selection(),
            }
        }
        self.run_motion(motion, lines, tab_width);
        self.reset_selection();
    }

    fn run_motion(&mut self, motion: Motion, lines: &LineStore, tab_width: usize) {
        match motion {
            Motion::Left => self.left(lines, tab_width),
            Motion::Right => self.right(lines, tab_width),
            Motion::Up => self.up(lines, tab_width),
            Motion::Down => self.down(lines, tab_width),
            Motion::PageUp(amount) => self.up_n(amount, lines, tab_width),
            Motion::PageDown(amount) => self.down_n(amount, lines, tab_width),
            Motion::WordLeft => self.word_left(lines, tab_width),
            Motion::WordRight => self.word_right(lines, tab_width),
            Motion::LineStart => self.start(lines, tab_width),
            Motion::LineEnd => self.end(lines, tab_width),
            Motion::StartOfText => self.start_of_text(lines, tab_width),
            Motion::BufferStart => self.set_location(lines.start(), lines, tab_width),
            Motion::BufferEnd => self.set_location(lines.end(), lines, tab_width),
        }
    }

    /// Select between the origin anchor and `target`, in buffer order.
    /// The caret itself is not moved.
    pub fn select_to(&mut self, target: Position) {
        let anchor = self.origin.start;
        self.selection = if target > anchor {
            Selection::new(anchor, target)
        } else {
            Selection::new(target, anchor)
        };
    }

    fn word_bounds_backward(line: &[char], x: usize) -> usize {
        let mut backward = x.min(line.len());
        while backward > 0 && is_word_char(line[backward - 1]) {
            backward -= 1;
        }
        backward
    }

    /// Exclusive end of the word run containing `x`.
    fn word_bounds_forward(line: &[char], x: usize) -> usize {
        let mut forward = x;
        while forward + 1 < line.len() && is_word_char(line[forward + 1]) {
            forward += 1;
        }
        forward + 1
    }

    /// Select the word under the caret, or the single rune under it when that
    /// rune is not a word rune. The result becomes the new origin.
    pub fn select_word(&mut self, lines: &LineStore) {
        let line: Vec<char> = lines.line(self.loc.y).unwrap_or_default().chars().collect();
        if line.is_empty() {
            return;
        }
        if !self.rune_under(lines).is_some_and(is_word_char) {
            self.selection = Selection::new(self.loc, self.loc.step_right(lines));
            self.origin = self.selection;
            return;
        }
        let y = self.loc.y;
        let start = Position::new(Self::word_bounds_backward(&line, self.loc.x), y);
        let end = Position::new(Self::word_bounds_forward(&line, self.loc.x), y);
        self.selection = Selection::new(start, end);
        self.origin = self.selection;
        self.loc = end;
    }

    /// Grow the selection word-by-word towards the caret while keeping the
    /// originally selected word(s) selected.
    pub fn add_word_to_selection(&mut self, lines: &LineStore) {
        let (origin_lo, origin_hi) = self.origin.ordered();
        if self.loc > origin_lo && self.loc < origin_hi {
            self.selection = self.origin;
            return;
        }
        let line: Vec<char> = lines.line(self.loc.y).unwrap_or_default().chars().collect();
        let y = self.loc.y;
        if self.loc < origin_lo {
            let start = Position::new(Self::word_bounds_backward(&line, self.loc.x), y);
            self.selection = Selection::new(start, origin_hi);
            self.loc = start;
        } else if self.loc > origin_hi {
            let end = if line.is_empty() || self.loc.x >= line.len() {
                self.loc.step_right(lines)
            } else {
                Position::new(Self::word_bounds_forward(&line, self.loc.x), y)
            };
            self.selection = Selection::new(origin_lo, end);
            self.loc = end;
        }
    }

    /// Select the caret's whole line including its line break (when it has
    /// one). The result becomes the new origin.
    pub fn select_line(&mut self, lines: &LineStore, tab_width: usize) {
        self.start(lines, tab_width);
        let start = self.loc;
        self.end(lines, tab_width);
        let end = if self.loc.y + 1 < lines.line_count() {
            self.loc.step_right(lines)
        } else {
            self.loc
        };
        self.selection = Selection::new(start, end);
        self.origin = self.selection;
    }

    /// Grow a line selection to include the caret's line.
    pub fn add_line_to_selection(&mut self, lines: &LineStore, tab_width: usize) {
        let (origin_lo, origin_hi) = self.origin.ordered();
        if self.loc < origin_lo {
            self.start(lines, tab_width);
            self.selection = Selection::new(self.loc, origin_hi);
        } else if self.loc > origin_hi {
            self.end(lines, tab_width);
            let end = self.loc.step_right(lines);
            self.selection = Selection::new(origin_lo, end);
        } else if self.loc > origin_lo && self.loc < origin_hi {
            self.selection = self.origin;
        }
    }

    /// Select the whole buffer, leaving the caret at its end.
    pub fn select_all(&mut self, lines: &LineStore, tab_width: usize) {
        self.selection = Selection::new(lines.start(), lines.end());
        self.origin = self.selection;
        self.set_location(lines.end(), lines, tab_width);
    }
}
