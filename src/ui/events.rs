//! Input event sources
//!
//! The read loop pulls [`InputEvent`]s from an [`EventSource`]. The terminal
//! implementation decodes key bytes with crossterm and folds in the external
//! SIGINT flag.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::core::teardown;

/// How long one poll slice waits before re-checking the interrupt flag
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One unit of input seen by the line editor
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// Decoded key press (control sequences already folded into one key)
    Key(KeyEvent),
    /// Bracketed paste
    Paste(String),
    /// Terminal resized to (cols, rows)
    Resize(u16, u16),
    /// External interrupt signal
    Interrupt,
}

/// Blocking producer of input events.
///
/// `ErrorKind::UnexpectedEof` signals that no more input will arrive.
pub trait EventSource {
    fn next_event(&mut self) -> io::Result<InputEvent>;
}

/// Events read from the controlling terminal
pub struct TerminalEvents {
    poll_interval: Duration,
}

impl Default for TerminalEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalEvents {
    pub fn new() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl EventSource for TerminalEvents {
    fn next_event(&mut self) -> io::Result<InputEvent> {
        loop {
            if teardown::take_interrupt() {
                return Ok(InputEvent::Interrupt);
            }

            match event::poll(self.poll_interval) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(InputEvent::Key(key));
                }
                Event::Paste(text) => return Ok(InputEvent::Paste(text)),
                Event::Resize(cols, rows) => return Ok(InputEvent::Resize(cols, rows)),
                // Mouse, focus and key release events
                _ => {}
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::collections::VecDeque;

    /// Replays a fixed list of events, then reports end of input
    pub(crate) struct ScriptedEvents(pub VecDeque<InputEvent>);

    impl ScriptedEvents {
        pub fn new(events: Vec<InputEvent>) -> Self {
            Self(events.into())
        }
    }

    impl EventSource for ScriptedEvents {
        fn next_event(&mut self) -> io::Result<InputEvent> {
            self.0
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }
    }

    pub(crate) fn key(code: KeyCode) -> InputEvent {
        InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    pub(crate) fn ctrl(ch: char) -> InputEvent {
        InputEvent::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    pub(crate) fn typed(text: &str) -> Vec<InputEvent> {
        text.chars().map(|ch| key(KeyCode::Char(ch))).collect()
    }

    #[test]
    fn test_scripted_source_ends_with_eof() {
        let mut source = ScriptedEvents::new(vec![key(KeyCode::Enter)]);
        assert_eq!(source.next_event().unwrap(), key(KeyCode::Enter));
        let err = source.next_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
