//! Configuration management for replline.
//!
//! Settings are read from `~/.<program>/config.toml`, where `<program>` is the
//! identity passed to [`crate::LineReader::new`]:
//!
//! ```toml
//! # Prompt used when read_line is called without an override
//! prompt = "> "
//!
//! # Render the prompt even when input is piped
//! echo_prompt_when_piped = false
//!
//! [history]
//! max_entries = 1000
//! dedup_consecutive = false
//! # file = "/path/to/history"
//! ```
//!
//! A missing file yields the defaults. A malformed file is logged and also
//! yields the defaults.

use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::warn;

use crate::history::HISTORY_LIMIT;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Session default prompt
    pub prompt: String,
    /// Render the prompt in pass-through mode
    pub echo_prompt_when_piped: bool,
    /// History settings
    pub history: HistoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            echo_prompt_when_piped: false,
            history: HistoryConfig::default(),
        }
    }
}

/// History configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub max_entries: usize,
    pub dedup_consecutive: bool,
    /// Overrides `~/.<program>/history`
    pub file: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: HISTORY_LIMIT,
            dedup_consecutive: false,
            file: None,
        }
    }
}

impl Config {
    /// Load configuration for `identity`, falling back to defaults
    pub fn load(identity: &str) -> Self {
        match Self::config_path(identity) {
            Some(path) if path.exists() => match fs::read_to_string(&path) {
                Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                    warn!("Ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }),
                Err(e) => {
                    warn!("Failed to read config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Get config file path
    pub fn config_path(identity: &str) -> Option<PathBuf> {
        program_dir(identity).map(|dir| dir.join("config.toml"))
    }

    /// History file used for caller-driven persistence
    pub fn history_path(&self, identity: &str) -> Option<PathBuf> {
        self.history
            .file
            .clone()
            .or_else(|| program_dir(identity).map(|dir| dir.join("history")))
    }
}

/// `~/.<identity>`, derived from the program path's file name
pub fn program_dir(identity: &str) -> Option<PathBuf> {
    let name = program_name(identity);
    home_dir().map(|home| home.join(format!(".{}", name)))
}

/// Strip any directory and extension from an argv[0]-style identity
pub fn program_name(identity: &str) -> String {
    let path = std::path::Path::new(identity);
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "replline".to_string())
}

// Get home directory
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history.max_entries, HISTORY_LIMIT);
        assert!(!config.history.dedup_consecutive);
        assert!(!config.echo_prompt_when_piped);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[history]\ndedup_consecutive = true\n").unwrap();
        assert!(config.history.dedup_consecutive);
        assert_eq!(config.history.max_entries, HISTORY_LIMIT);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn test_full_file() {
        let config = Config::parse(
            "prompt = \"user=> \"\necho_prompt_when_piped = true\n\n[history]\nmax_entries = 5\nfile = \"/tmp/h\"\n",
        )
        .unwrap();
        assert_eq!(config.prompt, "user=> ");
        assert!(config.echo_prompt_when_piped);
        assert_eq!(config.history.max_entries, 5);
        assert_eq!(config.history_path("x"), Some(PathBuf::from("/tmp/h")));
    }

    #[test]
    fn test_malformed_file_is_error() {
        assert!(Config::parse("prompt = [").is_err());
    }

    #[test]
    fn test_program_name() {
        assert_eq!(program_name("/usr/local/bin/lambdatron"), "lambdatron");
        assert_eq!(program_name("repl.exe"), "repl");
        assert_eq!(program_name(""), "replline");
    }
}
