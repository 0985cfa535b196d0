//! Root crate facade for the chatedit text-editing engine.

pub use chatedit_core::{
    buffer, clock, config, cursor, cursor_set, diff, dirty, error, history, line_store, position,
    text, ApplyDiffSummary, Buffer, Clock, Cursor, CursorSet, Delta, DirtyPolicy, EditorError,
    EditorSettings, EventHistory, EventKind, LineStore, ManualClock, Motion, Position, Selection,
    SystemClock, TextEvent,
};
