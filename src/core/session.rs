//! Terminal session management
//!
//! A [`Session`] owns the controlling terminal's input mode: byte-at-a-time
//! delivery with echo off, so the line editor can render its own echo. The
//! mode stays raw between reads until [`Session::close`] or process teardown.

use std::io::{self, IsTerminal};

use crossterm::terminal;
use tracing::{info, warn};

use super::teardown;
use crate::error::{LineError, Result};

/// Switch between the original terminal mode and raw mode
pub trait RawMode {
    fn enable(&mut self) -> io::Result<()>;
    fn disable(&mut self) -> io::Result<()>;
}

/// Raw mode through crossterm, backed by the process-wide teardown hooks
pub struct CrosstermRawMode;

impl RawMode for CrosstermRawMode {
    fn enable(&mut self) -> io::Result<()> {
        teardown::register_once();
        #[cfg(unix)]
        teardown::snapshot_termios();
        terminal::enable_raw_mode()?;
        teardown::mark_raw();
        // Without it a multi-line paste arrives as keys and Enter submits
        if let Err(e) = teardown::set_bracketed_paste(&mut io::stdout(), true) {
            warn!("Failed to enable bracketed paste: {}", e);
        }
        Ok(())
    }

    fn disable(&mut self) -> io::Result<()> {
        teardown::restore_terminal()
    }
}

/// Ownership of the terminal mode for one program
pub struct Session {
    /// Program identity (argv[0]-style), used for history/config paths
    identity: String,
    /// Raw mode currently held
    active: bool,
    mode: Box<dyn RawMode>,
}

impl Session {
    /// Take over the controlling terminal.
    ///
    /// Fails with [`LineError::TerminalUnavailable`] when stdin or stdout is
    /// redirected.
    pub fn open(identity: &str) -> Result<Self> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            return Err(LineError::TerminalUnavailable);
        }
        Self::with_mode(identity, Box::new(CrosstermRawMode))
    }

    /// Open a session over an arbitrary mode switch
    pub fn with_mode(identity: &str, mode: Box<dyn RawMode>) -> Result<Self> {
        let mut session = Self {
            identity: identity.to_string(),
            active: false,
            mode,
        };
        session.ensure_open()?;
        Ok(session)
    }

    /// Enter raw mode unless already there
    pub fn ensure_open(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        self.mode.enable()?;
        self.active = true;
        info!("Terminal session opened for {}", self.identity);
        Ok(())
    }

    /// Restore the original mode. Repeated calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.mode.disable()?;
        info!("Terminal session closed for {}", self.identity);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Counts mode switches instead of touching a terminal
    #[derive(Clone, Default)]
    pub(crate) struct RecordingMode {
        pub enabled: Rc<Cell<u32>>,
        pub disabled: Rc<Cell<u32>>,
    }

    impl RawMode for RecordingMode {
        fn enable(&mut self) -> io::Result<()> {
            self.enabled.set(self.enabled.get() + 1);
            Ok(())
        }

        fn disable(&mut self) -> io::Result<()> {
            self.disabled.set(self.disabled.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_open_is_idempotent() {
        let mode = RecordingMode::default();
        let mut session = Session::with_mode("repl", Box::new(mode.clone())).unwrap();
        session.ensure_open().unwrap();
        session.ensure_open().unwrap();
        assert_eq!(mode.enabled.get(), 1);
        assert!(session.is_active());
        assert_eq!(session.identity(), "repl");
    }

    #[test]
    fn test_close_restores_once() {
        let mode = RecordingMode::default();
        let mut session = Session::with_mode("repl", Box::new(mode.clone())).unwrap();
        session.close().unwrap();
        session.close().unwrap();
        drop(session);
        assert_eq!(mode.disabled.get(), 1);
    }

    #[test]
    fn test_drop_restores() {
        let mode = RecordingMode::default();
        {
            let _session = Session::with_mode("repl", Box::new(mode.clone())).unwrap();
        }
        assert_eq!(mode.disabled.get(), 1);
    }

    #[test]
    fn test_reopen_after_close() {
        let mode = RecordingMode::default();
        let mut session = Session::with_mode("repl", Box::new(mode.clone())).unwrap();
        session.close().unwrap();
        session.ensure_open().unwrap();
        assert_eq!(mode.enabled.get(), 2);
        assert!(session.is_active());
    }
}
