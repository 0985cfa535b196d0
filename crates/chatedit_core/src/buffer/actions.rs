//! Keyboard-level edits applied at every cursor as one undoable event.

use super::Buffer;
use crate::config::EditorSettings;
use crate::cursor::Cursor;
use crate::history::{Delta, TextEvent};
use crate::line_store::LineStore;
use crate::position::Position;
use crate::text::{leading_whitespace, visual_x};
use tracing::trace;

/// Span to replace for one cursor, and its replacement.
type Planned = (Position, Position, String);

/// Selection bounds, or the caret twice without a selection.
fn target_span(cursor: &Cursor) -> (Position, Position) {
    if cursor.has_selection() {
        cursor.selection().ordered()
    } else {
        (cursor.location(), cursor.location())
    }
}

fn spaces_to_next_stop(lines: &LineStore, pos: Position, tab_width: usize) -> String {
    let line = lines.line(pos.y).unwrap_or_default();
    let column = visual_x(&line, pos.x, tab_width);
    " ".repeat(tab_width - column % tab_width)
}

impl Buffer {
    /// Build one replacement per cursor with `plan` and run them as a single
    /// Replace event, last position first.
    ///
    /// # Returns
    /// `false` when no cursor had anything to do.
    fn edit_at_cursors(
        &mut self,
        plan: impl Fn(&Cursor, &LineStore, &EditorSettings) -> Option<Planned>,
    ) -> bool {
        let mut planned: Vec<Planned> = self
            .cursors
            .iter()
            .filter_map(|cursor| plan(cursor, &self.lines, &self.settings))
            .collect();
        if planned.is_empty() {
            return false;
        }
        planned.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        // Overlapping spans become one span covering both, with their texts
        // joined in buffer order.
        let mut spans: Vec<Planned> = Vec::with_capacity(planned.len());
        for (start, end, text) in planned {
            match spans.last_mut() {
                Some(last) if start < last.1 => {
                    last.1 = last.1.max(end);
                    last.2.push_str(&text);
                }
                _ => spans.push((start, end, text)),
            }
        }
        let deltas: Vec<Delta> = spans
            .into_iter()
            .rev()
            .map(|(start, end, text)| Delta::new(text, start, end))
            .collect();
        trace!(deltas = deltas.len(), "editing at cursors");

        let event = TextEvent::replace(deltas, self.snapshot(), self.now());
        let tab_width = self.tab_width();
        self.history.execute(event, &mut self.lines, &mut self.cursors, tab_width);
        for cursor in self.cursors.iter_mut() {
            cursor.reset_selection();
        }
        self.cursors.merge();
        self.dirty.mark_dirty();
        true
    }

    /// Type `text` at every cursor, replacing selections.
    pub fn type_text(&mut self, text: &str) -> bool {
        self.edit_at_cursors(|cursor, _, _| {
            let (lo, hi) = target_span(cursor);
            (lo != hi || !text.is_empty()).then(|| (lo, hi, text.to_string()))
        })
    }

    /// Break the line at every cursor, carrying the indentation over when
    /// auto-indent is on. Breaking at the end of a line that holds only
    /// whitespace empties it.
    pub fn insert_newline(&mut self) -> bool {
        self.edit_at_cursors(|cursor, lines, settings| {
            let (lo, hi) = target_span(cursor);
            let mut text = String::from("\n");
            if !settings.auto_indent {
                return Some((lo, hi, text));
            }
            let line = lines.line(lo.y).unwrap_or_default();
            let indent: String = leading_whitespace(&line).chars().take(lo.x).collect();
            text.push_str(&indent);
            let blank = !line.is_empty() && leading_whitespace(&line).len() == line.len();
            if blank && lo == hi && lo.x == lines.line_len(lo.y) {
                let line_end = Position::new(lines.line_len(lo.y), lo.y);
                return Some((Position::new(0, lo.y), line_end, text));
            }
            Some((lo, hi, text))
        })
    }

    /// Insert one indentation step at every cursor, replacing selections.
    pub fn insert_tab(&mut self) -> bool {
        self.edit_at_cursors(|cursor, lines, settings| {
            let (lo, hi) = target_span(cursor);
            let text = if settings.tabs_to_spaces {
                spaces_to_next_stop(lines, lo, settings.tab_width)
            } else {
                "\t".to_string()
            };
            Some((lo, hi, text))
        })
    }

    /// Delete the selection, or the rune before each cursor. With
    /// `tabs_to_spaces`, a caret inside space-only indentation deletes back
    /// to the previous tab stop.
    pub fn backspace(&mut self) -> bool {
        self.edit_at_cursors(|cursor, lines, settings| {
            if cursor.has_selection() {
                let (lo, hi) = cursor.selection().ordered();
                return Some((lo, hi, String::new()));
            }
            let loc = cursor.location();
            if loc == Position::ORIGIN {
                return None;
            }
            if settings.tabs_to_spaces && loc.x > 0 {
                let line = lines.line(loc.y).unwrap_or_default();
                let before: String = line.chars().take(loc.x).collect();
                if before.chars().all(|ch| ch == ' ') {
                    let width = settings.tab_width;
                    let count = (loc.x - 1) % width + 1;
                    return Some((Position::new(loc.x - count, loc.y), loc, String::new()));
                }
            }
            Some((loc.step_left(lines), loc, String::new()))
        })
    }

    /// Delete the selection, or the rune after each cursor.
    pub fn delete_forward(&mut self) -> bool {
        self.edit_at_cursors(|cursor, lines, _| {
            if cursor.has_selection() {
                let (lo, hi) = cursor.selection().ordered();
                return Some((lo, hi, String::new()));
            }
            let loc = cursor.location();
            let next = loc.step_right(lines);
            (next != loc).then(|| (loc, next, String::new()))
        })
    }

    /// Delete every cursor's selection; cursors without one stay put.
    pub fn delete_selections(&mut self) -> bool {
        self.edit_at_cursors(|cursor, _, _| {
            cursor.has_selection().then(|| {
                let (lo, hi) = cursor.selection().ordered();
                (lo, hi, String::new())
            })
        })
    }

    /// Text one indentation step inserts under the current settings.
    pub fn indent_string(&self) -> String {
        self.settings.indent_string()
    }
}
