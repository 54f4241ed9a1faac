//! Line history for replline
//!
//! Stores completed lines in chronological order and tracks the recall cursor
//! used by Up/Down navigation. Persistence is caller-driven through
//! [`History::load`] and [`History::save`].

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::HistoryConfig;
use crate::error::{LineError, Result};

/// Default maximum number of history entries
pub const HISTORY_LIMIT: usize = 1000;

/// Recall navigation state
#[derive(Clone, Debug, PartialEq, Eq)]
enum Recall {
    /// Cursor is past the newest entry
    Editing,
    /// Cursor sits on `index`; `draft` is the buffer that was in progress
    /// when recall started
    Recalling { index: usize, draft: String },
}

/// Ordered list of previously submitted lines
#[derive(Clone, Debug)]
pub struct History {
    /// All entries (newest last)
    entries: Vec<String>,
    recall: Recall,
    /// Maximum entries
    max_entries: usize,
    /// Skip a line identical to the newest entry
    dedup_consecutive: bool,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    /// Create an empty history with the default policy
    pub fn new() -> Self {
        Self::with_config(&HistoryConfig::default())
    }

    /// Create an empty history using the configured limits
    pub fn with_config(config: &HistoryConfig) -> Self {
        Self {
            entries: Vec::new(),
            recall: Recall::Editing,
            max_entries: config.max_entries.max(1),
            dedup_consecutive: config.dedup_consecutive,
        }
    }

    /// Add a line to the end of the history.
    ///
    /// Returns `false` when the line was rejected: empty, containing a line
    /// break (`\n` or `\r`), or (with dedup enabled) equal to the newest
    /// entry. Accepted entries survive a save/load round trip unchanged.
    pub fn append(&mut self, line: &str) -> bool {
        self.recall = Recall::Editing;

        if line.is_empty() || line.contains(['\n', '\r']) {
            return false;
        }

        if self.dedup_consecutive && self.entries.last().map(String::as_str) == Some(line) {
            return false;
        }

        self.entries.push(line.to_string());

        // Trim if exceeding limit
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }
        true
    }

    /// Step back towards the oldest entry.
    ///
    /// `current` is the buffer being edited; it is kept as the draft when this
    /// is the first recall step. Returns `None` at the oldest entry or when
    /// the history is empty.
    pub fn recall_previous(&mut self, current: &str) -> Option<String> {
        let index = match self.recall {
            Recall::Editing => {
                let newest = self.entries.len().checked_sub(1)?;
                self.recall = Recall::Recalling {
                    index: newest,
                    draft: current.to_string(),
                };
                newest
            }
            Recall::Recalling { index: 0, .. } => return None,
            Recall::Recalling { ref mut index, .. } => {
                *index -= 1;
                *index
            }
        };
        debug!(index, "recall previous");
        self.entries.get(index).cloned()
    }

    /// Step forward towards the newest entry.
    ///
    /// Moving past the newest entry returns the saved draft and leaves recall
    /// mode. Returns `None` when not recalling.
    pub fn recall_next(&mut self) -> Option<String> {
        let Recall::Recalling { index, .. } = &mut self.recall else {
            return None;
        };

        if *index + 1 < self.entries.len() {
            *index += 1;
            debug!(index = *index, "recall next");
            return self.entries.get(*index).cloned();
        }

        match std::mem::replace(&mut self.recall, Recall::Editing) {
            Recall::Recalling { draft, .. } => Some(draft),
            Recall::Editing => None,
        }
    }

    /// Leave recall mode, placing the cursor past the newest entry
    pub fn reset_cursor(&mut self) {
        self.recall = Recall::Editing;
    }

    /// Whether a recall sequence is in progress
    pub fn is_recalling(&self) -> bool {
        matches!(self.recall, Recall::Recalling { .. })
    }

    /// Replace the history with the entries stored at `path`
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let content = fs::read_to_string(path).map_err(|source| LineError::History {
            path: path.to_path_buf(),
            source,
        })?;

        self.entries.clear();
        self.recall = Recall::Editing;
        for line in content.lines().filter(|l| !l.is_empty()) {
            self.entries.push(line.to_string());
        }
        if self.entries.len() > self.max_entries {
            let excess = self.entries.len() - self.max_entries;
            self.entries.drain(..excess);
        }

        debug!(path = %path.display(), entries = self.entries.len(), "history loaded");
        Ok(())
    }

    /// Write all entries to `path`, one per line
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| LineError::History {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut content = self.entries.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(path, content).map_err(io_err)?;

        debug!(path = %path.display(), entries = self.entries.len(), "history saved");
        Ok(())
    }

    /// Get entry by chronological index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Iterate entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Get entry count
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
