//! Rune-indexed `(x, y)` positions and the arithmetic that moves them across
//! line boundaries.

use crate::line_store::LineStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A `(column, line)` coordinate. Columns count runes, not bytes.
///
/// Ordering is lexicographic on `(y, x)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Position {
    /// First position of every buffer.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// True when `0 <= y < line_count` and `0 <= x <= line_len(y)`.
    pub fn is_valid(self, lines: &LineStore) -> bool {
        self.y < lines.line_count() && self.x <= lines.line_len(self.y)
    }

    /// Pull the position into the valid range of `lines`.
    pub fn clamp(self, lines: &LineStore) -> Self {
        let last = lines.line_count().saturating_sub(1);
        let y = self.y.min(last);
        Self {
            x: self.x.min(lines.line_len(y)),
            y,
        }
    }

    /// One rune to the right, wrapping to the next line's start.
    ///
    /// At the end of the buffer the position is returned unchanged.
    pub fn step_right(self, lines: &LineStore) -> Self {
        if self.x < lines.line_len(self.y) {
            Self::new(self.x + 1, self.y)
        } else if self.y + 1 < lines.line_count() {
            Self::new(0, self.y + 1)
        } else {
            self
        }
    }

    /// One rune to the left, wrapping to the previous line's end.
    ///
    /// At the start of the buffer the position is returned unchanged.
    pub fn step_left(self, lines: &LineStore) -> Self {
        if self.x > 0 {
            Self::new(self.x - 1, self.y)
        } else if self.y > 0 {
            Self::new(lines.line_len(self.y - 1), self.y - 1)
        } else {
            self
        }
    }

    /// Move `n` runes (negative moves left), counting each line break as one
    /// rune. Stops at the buffer's start or end.
    pub fn move_by(self, n: isize, lines: &LineStore) -> Self {
        let mut pos = self.clamp(lines);
        let mut remaining = n.unsigned_abs();
        if n >= 0 {
            while remaining > 0 {
                let room = lines.line_len(pos.y) - pos.x;
                if remaining <= room {
                    pos.x += remaining;
                    break;
                }
                if pos.y + 1 >= lines.line_count() {
                    pos.x = lines.line_len(pos.y);
                    break;
                }
                remaining -= room + 1;
                pos = Self::new(0, pos.y + 1);
            }
        } else {
            while remaining > 0 {
                if remaining <= pos.x {
                    pos.x -= remaining;
                    break;
                }
                if pos.y == 0 {
                    pos.x = 0;
                    break;
                }
                remaining -= pos.x + 1;
                pos = Self::new(lines.line_len(pos.y - 1), pos.y - 1);
            }
        }
        pos
    }

    /// Rune distance between two positions, counting one rune per line break.
    /// Argument order does not matter.
    pub fn distance(a: Self, b: Self, lines: &LineStore) -> usize {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        if lo.y == hi.y {
            return hi.x - lo.x;
        }
        let mut total = lines.line_len(lo.y) - lo.x.min(lines.line_len(lo.y)) + 1;
        for y in lo.y + 1..hi.y {
            total += lines.line_len(y) + 1;
        }
        total + hi.x
    }

    /// Where inserting `text` at `self` leaves the end of the inserted span.
    pub fn advanced_by_text(self, text: &str) -> Self {
        match text.rfind('\n') {
            None => Self::new(self.x + text.chars().count(), self.y),
            Some(last_newline) => {
                let newlines = text.bytes().filter(|b| *b == b'\n').count();
                Self::new(text[last_newline + 1..].chars().count(), self.y + newlines)
            }
        }
    }

    /// Translate a position across an insertion that turned `start` into the
    /// span `[start, end)`.
    pub(crate) fn after_insert(self, start: Self, end: Self) -> Self {
        if self < start {
            return self;
        }
        if self.y == start.y {
            Self::new(end.x + (self.x - start.x), end.y)
        } else {
            Self::new(self.x, self.y + (end.y - start.y))
        }
    }

    /// Translate a position across the removal of `[start, end)`. Positions
    /// inside the removed span collapse onto `start`.
    pub(crate) fn after_remove(self, start: Self, end: Self) -> Self {
        if self <= start {
            return self;
        }
        if self < end {
            return start;
        }
        if self.y == end.y {
            Self::new(start.x + (self.x - end.x), start.y)
        } else {
            Self::new(self.x, self.y - (end.y - start.y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(text: &str) -> LineStore {
        LineStore::new(text)
    }

    #[test]
    fn ordering_is_line_major() {
        assert!(Position::new(9, 0) < Position::new(0, 1));
        assert!(Position::new(1, 2) > Position::new(0, 2));
        assert!(Position::new(3, 3) <= Position::new(3, 3));
    }

    #[test]
    fn step_wraps_across_lines() {
        let lines = store("ab\ncd");
        assert_eq!(Position::new(2, 0).step_right(&lines), Position::new(0, 1));
        assert_eq!(Position::new(0, 1).step_left(&lines), Position::new(2, 0));
    }

    #[test]
    fn step_at_buffer_edges_clamps() {
        let lines = store("ab\ncd");
        assert_eq!(Position::ORIGIN.step_left(&lines), Position::ORIGIN);
        assert_eq!(Position::new(2, 1).step_right(&lines), Position::new(2, 1));
    }

    #[test]
    fn move_by_counts_newlines_as_one_rune() {
        let lines = store("héllo\nwörld\n!");
        assert_eq!(Position::new(3, 0).move_by(3, &lines), Position::new(0, 1));
        assert_eq!(Position::new(0, 2).move_by(-2, &lines), Position::new(4, 1));
        assert_eq!(
            Position::new(1, 1).move_by(-8, &lines),
            Position::new(5, 0).move_by(-6, &lines)
        );
    }

    #[test]
    fn move_by_past_either_end_stops_at_the_edge() {
        let lines = store("ab\ncd");
        assert_eq!(Position::new(1, 0).move_by(100, &lines), Position::new(2, 1));
        assert_eq!(Position::new(1, 1).move_by(-100, &lines), Position::ORIGIN);
    }

    #[test]
    fn distance_sums_line_lengths_and_breaks() {
        let lines = store("one\ntwo\nthree");
        let a = Position::new(1, 0);
        let b = Position::new(2, 2);
        assert_eq!(Position::distance(a, b, &lines), 2 + 1 + 3 + 1 + 2);
        assert_eq!(Position::distance(b, a, &lines), Position::distance(a, b, &lines));
        assert_eq!(a.move_by(Position::distance(a, b, &lines) as isize, &lines), b);
    }

    #[test]
    fn advanced_by_text_tracks_last_line() {
        let start = Position::new(3, 4);
        assert_eq!(start.advanced_by_text("ab"), Position::new(5, 4));
        assert_eq!(start.advanced_by_text("a\nbcd\nef"), Position::new(2, 6));
        assert_eq!(start.advanced_by_text("\n"), Position::new(0, 5));
    }

    #[test]
    fn insert_translation_shifts_following_positions() {
        let start = Position::new(2, 0);
        let end = Position::new(1, 1);
        assert_eq!(Position::new(1, 0).after_insert(start, end), Position::new(1, 0));
        assert_eq!(Position::new(2, 0).after_insert(start, end), Position::new(1, 1));
        assert_eq!(Position::new(5, 0).after_insert(start, end), Position::new(4, 1));
        assert_eq!(Position::new(5, 3).after_insert(start, end), Position::new(5, 4));
    }

    #[test]
    fn remove_translation_collapses_removed_span() {
        let start = Position::new(2, 0);
        let end = Position::new(1, 1);
        assert_eq!(Position::new(4, 0).after_remove(start, end), start);
        assert_eq!(Position::new(3, 1).after_remove(start, end), Position::new(4, 0));
        assert_eq!(Position::new(3, 2).after_remove(start, end), Position::new(3, 1));
    }

    #[test]
    fn clamp_relocates_out_of_range_positions() {
        let lines = store("abc\nd");
        assert_eq!(Position::new(10, 0).clamp(&lines), Position::new(3, 0));
        assert_eq!(Position::new(10, 9).clamp(&lines), Position::new(1, 1));
        assert!(!Position::new(2, 1).is_valid(&lines));
    }
}
