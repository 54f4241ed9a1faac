//! Error types for replline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineError {
    /// stdin or stdout is not attached to a terminal
    #[error("no controlling terminal available")]
    TerminalUnavailable,

    #[error("history file {}: {source}", .path.display())]
    History {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, LineError>;
