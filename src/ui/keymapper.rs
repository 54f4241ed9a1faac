//! Key mapping for line editing
//!
//! Converts input events into logical edit commands, using the emacs-style
//! bindings common to readline and EditLine.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::events::InputEvent;

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Logical edit command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditCommand {
    /// Insert a printable character at the cursor
    Insert(char),
    /// Insert pasted text at the cursor
    InsertText(String),
    /// Backspace
    DeleteBackward,
    /// Delete the character under the cursor
    DeleteForward,
    MoveLeft,
    MoveRight,
    MoveHome,
    MoveEnd,
    /// Ctrl+K
    KillToEnd,
    /// Ctrl+U
    KillToStart,
    /// Ctrl+W
    DeleteWordBackward,
    HistoryPrevious,
    HistoryNext,
    /// Tab
    Complete,
    /// Ctrl+L
    ClearScreen,
    Resize(u16, u16),
    Submit,
    Interrupt,
    EndOfInput,
}

/// Key mapper for converting input events to edit commands
pub struct KeyMapper;

impl KeyMapper {
    /// Map an input event; `None` means the event is ignored
    pub fn map(event: &InputEvent) -> Option<EditCommand> {
        match event {
            InputEvent::Key(key) => Self::map_key(key),
            InputEvent::Paste(text) => {
                let text: String = text.chars().filter(|ch| !ch.is_control()).collect();
                if text.is_empty() {
                    None
                } else {
                    Some(EditCommand::InsertText(text))
                }
            }
            InputEvent::Resize(cols, rows) => Some(EditCommand::Resize(*cols, *rows)),
            InputEvent::Interrupt => Some(EditCommand::Interrupt),
        }
    }

    /// Map a crossterm KeyEvent
    pub fn map_key(event: &KeyEvent) -> Option<EditCommand> {
        let mods = Modifiers::from(event.modifiers);

        match event.code {
            KeyCode::Char(ch) if mods.contains(Modifiers::CTRL) && !mods.contains(Modifiers::ALT) => {
                Self::map_ctrl(ch)
            }
            // Meta bindings are not supported
            KeyCode::Char(_) if mods.contains(Modifiers::ALT) => None,
            KeyCode::Char(ch) if ch.is_control() => None,
            KeyCode::Char(ch) => Some(EditCommand::Insert(ch)),

            KeyCode::Enter => Some(EditCommand::Submit),
            KeyCode::Backspace => Some(EditCommand::DeleteBackward),
            KeyCode::Delete => Some(EditCommand::DeleteForward),
            KeyCode::Tab => Some(EditCommand::Complete),

            KeyCode::Left => Some(EditCommand::MoveLeft),
            KeyCode::Right => Some(EditCommand::MoveRight),
            KeyCode::Home => Some(EditCommand::MoveHome),
            KeyCode::End => Some(EditCommand::MoveEnd),
            KeyCode::Up => Some(EditCommand::HistoryPrevious),
            KeyCode::Down => Some(EditCommand::HistoryNext),

            _ => None,
        }
    }

    /// Ctrl + letter bindings
    fn map_ctrl(ch: char) -> Option<EditCommand> {
        let command = match ch.to_ascii_lowercase() {
            'a' => EditCommand::MoveHome,
            'b' => EditCommand::MoveLeft,
            'c' => EditCommand::Interrupt,
            'd' => EditCommand::EndOfInput,
            'e' => EditCommand::MoveEnd,
            'f' => EditCommand::MoveRight,
            'h' => EditCommand::DeleteBackward,
            'j' | 'm' => EditCommand::Submit,
            'k' => EditCommand::KillToEnd,
            'l' => EditCommand::ClearScreen,
            'n' => EditCommand::HistoryNext,
            'p' => EditCommand::HistoryPrevious,
            'u' => EditCommand::KillToStart,
            'w' => EditCommand::DeleteWordBackward,
            _ => return None,
        };
        Some(command)
    }
}
