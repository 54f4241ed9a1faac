//! Line editing.
//!
//! - **buffer**: `EditBuffer`, the line being composed and its cursor
//! - **line_editor**: `LineEditor`, applies edit commands to buffer + history
//! - **reader**: `LineReader`, the public entry point tying terminal, editor
//!   and history together
//!
//! # Read cycle
//!
//! ```text
//! LineReader::read_line
//! ├── PassThrough: read_until('\n') on stdin
//! └── Interactive
//!     ├── Session::ensure_open (raw mode)
//!     └── loop: EventSource → KeyMapper → LineEditor::apply → LineRenderer
//! ```

pub mod buffer;
pub mod line_editor;
pub mod reader;

pub use buffer::EditBuffer;
pub use line_editor::{LineEditor, Step};
pub use reader::LineReader;

/// Outcome of one `read_line` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineResult {
    /// A submitted line, without its terminator
    Line(String),
    /// Input is exhausted (Ctrl+D on an empty line, or closed stream)
    EndOfInput,
    /// Ctrl+C or SIGINT; the partial line was discarded
    Interrupted,
}

/// Replacement proposed by a [`Completer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    /// Char offset where the replaced span starts; the span ends at the cursor
    pub start: usize,
    pub replacement: String,
}

/// Tab-completion hook.
///
/// `cursor` is a char offset into `line`. Returning `None` leaves the line
/// untouched.
pub trait Completer {
    fn complete(&self, line: &str, cursor: usize) -> Option<Completion>;
}
