//! Character classes and visual-column helpers shared by cursor motion and
//! edit actions.

use unicode_width::UnicodeWidthChar;

/// ASCII alphanumerics, `_`, and every non-ASCII rune count as word runes.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || !ch.is_ascii()
}

/// Space, tab and line break.
pub fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

fn advance(col: usize, ch: char, tab_width: usize) -> usize {
    if ch == '\t' {
        let tab_width = tab_width.max(1);
        col + tab_width - col % tab_width
    } else {
        col + ch.width().unwrap_or(0)
    }
}

/// Screen column of rune column `x` in `line`, expanding tabs to the next
/// tab stop and counting wide runes as two columns.
pub fn visual_x(line: &str, x: usize, tab_width: usize) -> usize {
    line.chars()
        .take(x)
        .fold(0, |col, ch| advance(col, ch, tab_width))
}

/// Rune column in `line` whose screen column covers `visual`. Targets past
/// the end of the line map to the line length.
pub fn char_pos_for_visual(line: &str, visual: usize, tab_width: usize) -> usize {
    let mut col = 0;
    for (index, ch) in line.chars().enumerate() {
        let next = advance(col, ch, tab_width);
        if next > visual {
            return index;
        }
        col = next;
    }
    line.chars().count()
}

/// Leading run of spaces and tabs.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, ch)| *ch != ' ' && *ch != '\t')
        .map_or(line.len(), |(index, _)| index);
    &line[..end]
}
