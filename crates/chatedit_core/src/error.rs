//! Error type for the editing engine.
use crate::position::Position;
use thiserror::Error;

/// Top-level engine error type.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid position {position}: {line_count} lines, target line length {line_len:?}")]
    InvalidPosition {
        position: Position,
        line_count: usize,
        /// Rune length of the addressed line, when the line exists.
        line_len: Option<usize>,
    },

    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: Position, end: Position },

    #[error("No cursor with ordinal {0}")]
    NoSuchCursor(usize),

    #[error("Cannot remove the last cursor")]
    LastCursor,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the engine.
pub type Result<T> = std::result::Result<T, EditorError>;
