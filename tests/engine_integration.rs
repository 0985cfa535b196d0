use chatedit::{Buffer, Cursor, EditorSettings, ManualClock, Motion, Position};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn setup_buffer(text: &str) -> (Buffer, ManualClock) {
    let clock = ManualClock::new();
    let buffer =
        Buffer::with_clock(text, EditorSettings::default(), clock.clone()).expect("buffer");
    (buffer, clock)
}

fn locations(buffer: &Buffer) -> Vec<Position> {
    buffer.cursors().iter().map(Cursor::location).collect()
}

fn assert_cursors_in_bounds(buffer: &Buffer) {
    for cursor in buffer.cursors().iter() {
        let loc = cursor.location();
        assert!(loc.y < buffer.line_count(), "cursor {} past last line", loc);
        let line = buffer.line(loc.y).expect("line exists");
        assert!(loc.x <= line.chars().count(), "cursor {} past line end", loc);
        let selection = cursor.selection();
        assert!(selection.start.is_valid(buffer.lines()));
        assert!(selection.end.is_valid(buffer.lines()));
    }
}

#[test]
fn test_insert_into_empty_buffer() {
    let (mut buffer, _clock) = setup_buffer("");
    buffer.insert(Position::new(0, 0), "hello").expect("insert");
    assert_eq!(buffer.line(0).as_deref(), Some("hello"));
    assert_eq!(buffer.end(), Position::new(5, 0));
}

#[test]
fn test_remove_keeps_line_count() {
    let (mut buffer, _clock) = setup_buffer("ab\ncd");
    buffer
        .remove(Position::new(0, 0), Position::new(1, 0))
        .expect("remove");
    assert_eq!(buffer.line(0).as_deref(), Some("b"));
    assert_eq!(buffer.line_count(), 2);
}

#[test]
fn test_word_left_from_word_end() {
    let (mut buffer, _clock) = setup_buffer("hello world");
    buffer
        .set_cursor_location(0, Position::new(5, 0))
        .expect("place cursor");
    buffer.move_cursor(0, Motion::WordLeft, false).expect("move");
    assert_eq!(buffer.primary_cursor().location(), Position::new(0, 0));
}

#[test]
fn test_fast_inserts_undo_together() {
    let (mut buffer, clock) = setup_buffer("");
    buffer.insert(Position::new(0, 0), "a").expect("insert");
    clock.advance(Duration::from_millis(200));
    buffer.insert(Position::new(1, 0), "b").expect("insert");
    buffer.undo();
    assert_eq!(buffer.full_text(), "");
    assert_eq!(buffer.undo(), 0);
    assert_eq!(buffer.full_text(), "");
}

#[test]
fn test_merge_identical_cursors() {
    let (mut buffer, _clock) = setup_buffer("text");
    // Adding on an occupied spot is rejected, so walk one onto it.
    buffer.add_cursor(Position::new(1, 0)).expect("valid");
    buffer.move_cursor(1, Motion::Left, false).expect("move");
    assert_eq!(buffer.cursors().len(), 1);
    assert_eq!(buffer.merge_cursors(), 0);
    assert_eq!(buffer.primary_cursor().location(), Position::new(0, 0));
}

#[test]
fn test_replace_then_undo() {
    let (mut buffer, _clock) = setup_buffer("line1\nline2");
    buffer
        .replace(Position::new(0, 0), Position::new(5, 0), "LINE1")
        .expect("replace");
    buffer.undo();
    assert_eq!(buffer.full_text(), "line1\nline2");
}

#[test]
fn test_undo_redo_round_trip() {
    let (mut buffer, clock) = setup_buffer("fn main() {}");
    buffer.move_cursors(Motion::LineEnd, false);
    buffer.move_cursors(Motion::Left, false);
    buffer.insert_newline();
    clock.advance(Duration::from_secs(1));
    buffer.type_text("run();");
    clock.advance(Duration::from_secs(1));
    buffer.insert_newline();
    clock.advance(Duration::from_secs(1));

    let mut states = vec![(buffer.full_text(), locations(&buffer))];
    while buffer.undo() > 0 {
        states.push((buffer.full_text(), locations(&buffer)));
    }
    assert_eq!(buffer.full_text(), "fn main() {}");
    states.pop();
    while let Some((text, cursors)) = states.pop() {
        assert!(buffer.redo() > 0);
        assert_eq!(buffer.full_text(), text);
        assert_eq!(locations(&buffer), cursors);
    }
    assert_eq!(buffer.redo(), 0);
}

#[test]
fn test_merge_is_idempotent() {
    let (mut buffer, _clock) = setup_buffer("one\ntwo\nthree");
    buffer.select_all();
    buffer.spawn_cursors_on_selected_lines();
    buffer.move_cursors(Motion::BufferStart, false);
    let once = locations(&buffer);
    assert_eq!(buffer.merge_cursors(), 0);
    assert_eq!(locations(&buffer), once);
    assert_eq!(once, vec![Position::new(0, 0)]);
}

#[test]
fn test_multi_cursor_consistency() {
    let (mut whole, _clock) = setup_buffer("abc def");
    whole.set_cursor_location(0, Position::new(1, 0)).expect("a");
    whole.add_cursor(Position::new(5, 0)).expect("b");
    whole.insert(Position::new(1, 0), "XYZ").expect("insert");

    let (mut typed, _clock) = setup_buffer("abc def");
    typed.set_cursor_location(0, Position::new(1, 0)).expect("a");
    typed.add_cursor(Position::new(5, 0)).expect("b");
    for (offset, ch) in "XYZ".chars().enumerate() {
        typed
            .insert(Position::new(1 + offset, 0), &ch.to_string())
            .expect("insert");
    }

    assert_eq!(whole.full_text(), typed.full_text());
    assert_eq!(whole.cursor(1).map(Cursor::location), Some(Position::new(8, 0)));
    assert_eq!(
        whole.cursor(1).map(Cursor::location),
        typed.cursor(1).map(Cursor::location)
    );
    let b = whole.cursor(1).map(Cursor::location).expect("b");
    assert_eq!(whole.rune_at(b).expect("valid"), Some('e'));
}

#[test]
fn test_cursors_stay_in_bounds_through_edits() {
    let (mut buffer, clock) = setup_buffer("alpha\nbeta\ngamma");
    buffer.add_cursor(Position::new(4, 1)).expect("valid");
    buffer.add_cursor(Position::new(5, 2)).expect("valid");
    buffer.move_cursors(Motion::WordLeft, true);
    assert_cursors_in_bounds(&buffer);
    buffer.backspace();
    assert_cursors_in_bounds(&buffer);
    buffer.type_text("é\n");
    assert_cursors_in_bounds(&buffer);
    clock.advance(Duration::from_secs(1));
    buffer.apply_diff("x");
    assert_cursors_in_bounds(&buffer);
    buffer.undo();
    assert_cursors_in_bounds(&buffer);
    buffer.redo();
    assert_cursors_in_bounds(&buffer);
    assert_eq!(buffer.full_text(), "x");
}

#[test]
fn test_buffer_from_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(b"first\nsecond\r\nthird").expect("write");
    let size = file.as_file().metadata().expect("metadata").len() as usize;
    let reader = file.reopen().expect("reopen");

    let buffer = Buffer::from_reader(reader, size, EditorSettings::default()).expect("buffer");
    assert_eq!(buffer.line_count(), 3);
    assert_eq!(buffer.line(1).as_deref(), Some("second\r"));
    assert!(!buffer.is_modified());
}

#[test]
fn test_settings_from_json() {
    let settings: EditorSettings =
        serde_json::from_str(r#"{"tab_width": 2, "tabs_to_spaces": true}"#).expect("json");
    let mut buffer = Buffer::new("", settings).expect("buffer");
    buffer.insert_tab();
    assert_eq!(buffer.full_text(), "  ");
}
