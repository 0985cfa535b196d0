//! Text-editing engine behind multi-line input fields: line storage, cursors
//! and selections, multi-cursor editing, and coalescing undo/redo.

/// Editable buffer combining storage, cursors and history.
pub mod buffer;
pub mod clock;
/// Typed engine settings.
pub mod config;
pub mod constants;
pub mod cursor;
pub mod cursor_set;
/// Diff planning for content rewrites.
pub mod diff;
pub mod dirty;
/// Engine error types.
pub mod error;
/// Undo/redo events and stacks.
pub mod history;
pub mod line_store;
pub mod position;
pub mod text;

pub use buffer::Buffer;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EditorSettings;
pub use cursor::{Cursor, Motion, Selection};
pub use cursor_set::CursorSet;
pub use diff::ApplyDiffSummary;
pub use dirty::DirtyPolicy;
pub use error::{EditorError, Result};
pub use history::{Delta, EventHistory, EventKind, TextEvent};
pub use line_store::LineStore;
pub use position::Position;
