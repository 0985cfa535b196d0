//! Rope-backed line storage.
//!
//! Lines are addressed by index and columns by rune. Only `\n` separates
//! lines, so the line count is always the number of `\n` plus one; `\r` and
//! other Unicode separators are ordinary line content.

use crate::position::Position;
use ropey::Rope;

/// Ordered, mutable collection of newline-free lines.
#[derive(Clone, Debug, Default)]
pub struct LineStore {
    rope: Rope,
}

impl LineStore {
    /// Create storage holding `text`.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Number of lines; never zero.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content length in runes, counting each line break as one rune.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Content length in UTF-8 bytes.
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Returns line `y` without its trailing `\n`.
    pub fn line(&self, y: usize) -> Option<String> {
        if y >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(y);
        Some(slice.slice(..self.line_len(y)).to_string())
    }

    /// Rune length of line `y` without its trailing `\n`; `0` for missing
    /// lines.
    pub fn line_len(&self, y: usize) -> usize {
        if y >= self.line_count() {
            return 0;
        }
        let slice = self.rope.line(y);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// First valid position.
    pub fn start(&self) -> Position {
        Position::ORIGIN
    }

    /// Last valid position: the end of the last line.
    pub fn end(&self) -> Position {
        let y = self.line_count() - 1;
        Position::new(self.line_len(y), y)
    }

    /// Global rune offset of a position. Out-of-range input is clamped.
    pub fn pos_to_char(&self, pos: Position) -> usize {
        let pos = pos.clamp(self);
        self.rope.line_to_char(pos.y) + pos.x
    }

    /// Position of a global rune offset. Out-of-range input is clamped.
    pub fn char_to_pos(&self, char_index: usize) -> Position {
        let clamped = char_index.min(self.len_chars());
        let y = self.rope.char_to_line(clamped);
        Position::new(clamped - self.rope.line_to_char(y), y)
    }

    /// Byte offset within line `y` of rune column `x`.
    pub fn char_to_byte_in_line(&self, y: usize, x: usize) -> usize {
        if y >= self.line_count() {
            return 0;
        }
        let x = x.min(self.line_len(y));
        self.rope.line(y).char_to_byte(x)
    }

    /// Rune column within line `y` of byte offset `byte`, rounding down to
    /// the containing rune.
    pub fn byte_to_char_in_line(&self, y: usize, byte: usize) -> usize {
        if y >= self.line_count() {
            return 0;
        }
        let line = self.rope.line(y);
        let byte = byte.min(line.len_bytes());
        line.byte_to_char(byte).min(self.line_len(y))
    }

    /// Rune at `pos`. The end of a non-final line yields `'\n'`; the end of
    /// the buffer yields `None`.
    pub fn rune_at(&self, pos: Position) -> Option<char> {
        if !pos.is_valid(self) {
            return None;
        }
        let index = self.pos_to_char(pos);
        (index < self.len_chars()).then(|| self.rope.char(index))
    }

    /// Text between two positions, in buffer order regardless of argument
    /// order.
    pub fn substring(&self, start: Position, end: Position) -> String {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let lo = self.pos_to_char(lo);
        let hi = self.pos_to_char(hi);
        self.rope.slice(lo..hi).to_string()
    }

    /// Insert `text` at `pos`, creating lines for each `\n`.
    ///
    /// # Returns
    /// The position just past the inserted text.
    pub fn insert(&mut self, pos: Position, text: &str) -> Position {
        let pos = pos.clamp(self);
        if text.is_empty() {
            return pos;
        }
        let index = self.pos_to_char(pos);
        self.rope.insert(index, text);
        pos.advanced_by_text(text)
    }

    /// Remove the span `[start, end)`, joining the remnants of the first and
    /// last line when the span crosses lines.
    ///
    /// # Returns
    /// The removed text.
    pub fn remove(&mut self, start: Position, end: Position) -> String {
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let lo = self.pos_to_char(lo);
        let hi = self.pos_to_char(hi);
        if lo == hi {
            return String::new();
        }
        let removed = self.rope.slice(lo..hi).to_string();
        self.rope.remove(lo..hi);
        removed
    }

    /// Break a line in two at `pos`.
    pub fn split_line(&mut self, pos: Position) -> Position {
        self.insert(pos, "\n")
    }

    /// Join line `y` with the line after it.
    ///
    /// # Returns
    /// `false` when `y` is the last line.
    pub fn join_lines(&mut self, y: usize) -> bool {
        if y + 1 >= self.line_count() {
            return false;
        }
        let end_of_line = Position::new(self.line_len(y), y);
        self.remove(end_of_line, Position::new(0, y + 1));
        true
    }

    /// Iterate the content in storage chunks without building a `String`.
    pub fn chunks(&self) -> impl Iterator<Item = &str> {
        self.rope.chunks()
    }

    /// Iterate all lines without trailing newlines.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).filter_map(move |y| self.line(y))
    }
}

impl std::fmt::Display for LineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_has_one_empty_line() {
        let lines = LineStore::new("");
        assert_eq!(lines.line_count(), 1);
        assert_eq!(lines.line(0).as_deref(), Some(""));
        assert_eq!(lines.end(), Position::ORIGIN);
    }

    #[test]
    fn line_count_tracks_newlines() {
        let lines = LineStore::new("a\n\nb\n");
        assert_eq!(lines.line_count(), 4);
        assert_eq!(lines.line(3).as_deref(), Some(""));
        assert_eq!(lines.line(4), None);
    }

    #[test]
    fn carriage_returns_stay_in_line_content() {
        let lines = LineStore::new("a\r\nb\rc");
        assert_eq!(lines.line_count(), 2);
        assert_eq!(lines.line(0).as_deref(), Some("a\r"));
        assert_eq!(lines.line(1).as_deref(), Some("b\rc"));
    }

    #[test]
    fn insert_splits_on_newlines() {
        let mut lines = LineStore::new("hello world");
        let end = lines.insert(Position::new(5, 0), ",\nbig\n");
        assert_eq!(end, Position::new(0, 2));
        assert_eq!(lines.line(0).as_deref(), Some("hello,"));
        assert_eq!(lines.line(1).as_deref(), Some("big"));
        assert_eq!(lines.line(2).as_deref(), Some(" world"));
    }

    #[test]
    fn insert_uses_rune_columns() {
        let mut lines = LineStore::new("日本語");
        lines.insert(Position::new(2, 0), "x");
        assert_eq!(lines.line(0).as_deref(), Some("日本x語"));
        assert_eq!(lines.char_to_byte_in_line(0, 2), 6);
        assert_eq!(lines.byte_to_char_in_line(0, 7), 3);
        assert_eq!(lines.byte_to_char_in_line(0, 8), 3);
    }

    #[test]
    fn remove_same_line() {
        let mut lines = LineStore::new("abcdef");
        let removed = lines.remove(Position::new(1, 0), Position::new(4, 0));
        assert_eq!(removed, "bcd");
        assert_eq!(lines.to_string(), "aef");
    }

    #[test]
    fn remove_across_lines_joins_remnants() {
        let mut lines = LineStore::new("first\nmiddle\nlast line");
        let removed = lines.remove(Position::new(2, 0), Position::new(4, 2));
        assert_eq!(removed, "rst\nmiddle\nlast");
        assert_eq!(lines.line_count(), 1);
        assert_eq!(lines.to_string(), "fi line");
    }

    #[test]
    fn remove_newline_spanning_one_rune() {
        let mut lines = LineStore::new("ab\ncd");
        lines.remove(Position::new(0, 0), Position::new(1, 0));
        assert_eq!(lines.line(0).as_deref(), Some("b"));
        assert_eq!(lines.line_count(), 2);
    }

    #[test]
    fn split_and_join_lines() {
        let mut lines = LineStore::new("abcd");
        assert_eq!(lines.split_line(Position::new(2, 0)), Position::new(0, 1));
        assert_eq!(lines.line(1).as_deref(), Some("cd"));
        assert!(lines.join_lines(0));
        assert_eq!(lines.to_string(), "abcd");
        assert!(!lines.join_lines(0));
    }

    #[test]
    fn rune_at_reports_line_breaks() {
        let lines = LineStore::new("ab\nc");
        assert_eq!(lines.rune_at(Position::new(1, 0)), Some('b'));
        assert_eq!(lines.rune_at(Position::new(2, 0)), Some('\n'));
        assert_eq!(lines.rune_at(Position::new(1, 1)), None);
        assert_eq!(lines.rune_at(Position::new(7, 0)), None);
    }

    #[test]
    fn substring_and_char_offsets_roundtrip() {
        let lines = LineStore::new("aé\nbç\nc");
        assert_eq!(lines.substring(Position::new(1, 0), Position::new(1, 1)), "é\nb");
        let offset = lines.pos_to_char(Position::new(2, 1));
        assert_eq!(offset, 5);
        assert_eq!(lines.char_to_pos(offset), Position::new(2, 1));
    }
}
