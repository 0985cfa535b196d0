//! Shared defaults for the editing engine.

use std::time::Duration;

/// Default number of columns between tab stops.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Events closer together than this are undone and redone as one step.
pub const DEFAULT_UNDO_THRESHOLD: Duration = Duration::from_millis(500);

/// Content size in bytes above which `DirtyPolicy::Auto` switches to the
/// cheap boolean flag instead of hashing.
pub const DEFAULT_FAST_DIRTY_THRESHOLD: usize = 50_000;

/// Upper bound on retained undo events.
pub const DEFAULT_MAX_HISTORY_EVENTS: usize = 1_000;
/// Upper bound on retained undo text, in bytes.
pub const DEFAULT_MAX_HISTORY_BYTES: usize = 8 * 1024 * 1024;

/// Largest up-front reservation `Buffer::from_reader` makes from a caller's
/// size hint; bigger inputs grow the buffer as they are read.
pub const MAX_READ_PREALLOC_BYTES: usize = 64 * 1024 * 1024;

/// Deadline for a single `apply_diff` computation.
pub const DEFAULT_DIFF_TIMEOUT: Duration = Duration::from_millis(250);

/// Environment variable names read by `EditorSettings::from_env`.
pub const ENV_TAB_WIDTH: &str = "CHATEDIT_TAB_WIDTH";
/// Insert spaces instead of `\t` for tab presses.
pub const ENV_TABS_TO_SPACES: &str = "CHATEDIT_TABS_TO_SPACES";
/// Copy leading whitespace onto new lines.
pub const ENV_AUTO_INDENT: &str = "CHATEDIT_AUTO_INDENT";
/// Undo coalescing window in milliseconds.
pub const ENV_UNDO_THRESHOLD_MS: &str = "CHATEDIT_UNDO_THRESHOLD_MS";
/// Force the boolean dirty flag regardless of size.
pub const ENV_FAST_DIRTY: &str = "CHATEDIT_FAST_DIRTY";
/// Diff deadline in milliseconds; `0` disables the deadline.
pub const ENV_DIFF_TIMEOUT_MS: &str = "CHATEDIT_DIFF_TIMEOUT_MS";
