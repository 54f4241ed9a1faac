//! replline - interactive line reader for REPLs
//!
//! Reads one line at a time from a terminal with in-line editing, a
//! configurable prompt and history recall. When input is redirected, lines
//! are read straight from the stream instead.
//!
//! # Features
//!
//! - **Editing**: insert anywhere, Backspace/Delete, Ctrl+K/U/W kills
//! - **Navigation**: arrows, Home/End, Ctrl+A/E/B/F
//! - **History**: Up/Down or Ctrl+P/N, with the in-progress line restored
//! - **Terminal safety**: raw mode is restored on exit, panic and fatal signals
//! - **Pass-through**: piped input works without a terminal
//!
//! # Example
//!
//! ```no_run
//! use replline::{LineReader, LineResult};
//!
//! let mut reader = LineReader::new("lambdatron");
//! reader.set_prompt("user=> ");
//! loop {
//!     match reader.read_line(None)? {
//!         LineResult::Line(line) => reader.write_output(&format!("{}\n", line))?,
//!         LineResult::Interrupted => continue,
//!         LineResult::EndOfInput => break,
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | Enter, Ctrl+J/M | Submit line |
//! | Ctrl+C | Discard line, return `Interrupted` |
//! | Ctrl+D | End of input (empty line) or submit |
//! | Up/Down, Ctrl+P/N | Recall history |
//! | Ctrl+L | Clear screen |
//! | Tab | Completion hook |

pub mod config;
pub mod core;
pub mod editor;
pub mod error;
pub mod history;
pub mod ui;

pub use crate::config::Config;
pub use crate::core::Session;
pub use crate::editor::{Completer, Completion, EditBuffer, LineReader, LineResult};
pub use crate::error::{LineError, Result};
pub use crate::history::History;
