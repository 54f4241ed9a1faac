//! Line renderer using crossterm
//!
//! Draws prompt + edit buffer on the current terminal row. Every redraw
//! rewrites the whole row, so any earlier damage (a failed write, a resize)
//! is repaired by the next one. Lines wider than the terminal scroll
//! horizontally so the cursor stays visible.

use std::io::{self, Write};

use crossterm::{
    cursor::{MoveTo, MoveToColumn},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::editor::EditBuffer;

/// Fallback width when the terminal size is unknown
pub const DEFAULT_COLUMNS: u16 = 80;

/// Single-row line renderer
#[derive(Debug)]
pub struct LineRenderer {
    /// Terminal width in columns
    cols: u16,
    /// First buffer char shown after the prompt
    scroll: usize,
}

impl Default for LineRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS)
    }
}

impl LineRenderer {
    pub fn new(cols: u16) -> Self {
        Self {
            cols: cols.max(1),
            scroll: 0,
        }
    }

    /// Width as reported by the terminal, or the default
    pub fn for_terminal() -> Self {
        let cols = crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(DEFAULT_COLUMNS);
        Self::new(cols)
    }

    pub fn set_width(&mut self, cols: u16) {
        self.cols = cols.max(1);
    }

    /// Redraw the current row: prompt, visible buffer slice, cursor
    pub fn render<W: Write>(&mut self, out: &mut W, prompt: &str, buffer: &EditBuffer) -> io::Result<()> {
        let prompt_width = prompt.width();
        let (visible, cursor_offset) = self.layout(prompt_width, buffer);
        let column = to_column(prompt_width + cursor_offset);

        queue!(
            out,
            MoveToColumn(0),
            Print(prompt),
            Print(visible),
            Clear(ClearType::UntilNewLine),
            MoveToColumn(column)
        )?;
        out.flush()
    }

    /// Leave the edited row and start a fresh one
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.scroll = 0;
        queue!(out, Print("\r\n"))?;
        out.flush()
    }

    /// Ctrl+L: clear the screen and home the cursor
    pub fn clear_screen<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        out.flush()
    }

    /// Pick the buffer slice to show and the cursor offset within it
    fn layout(&mut self, prompt_width: usize, buffer: &EditBuffer) -> (String, usize) {
        let chars = buffer.chars();
        let cursor = buffer.cursor();
        let available = (self.cols as usize).saturating_sub(prompt_width + 1).max(1);

        if text_width(chars) <= available {
            self.scroll = 0;
        }
        self.scroll = self.scroll.min(cursor);
        while self.scroll < cursor && text_width(&chars[self.scroll..cursor]) > available {
            self.scroll += 1;
        }

        let mut visible = String::new();
        let mut used = 0;
        for &ch in &chars[self.scroll..] {
            let w = ch.width().unwrap_or(0);
            if used + w > available {
                break;
            }
            used += w;
            visible.push(ch);
        }

        (visible, text_width(&chars[self.scroll..cursor]))
    }
}

fn text_width(chars: &[char]) -> usize {
    chars.iter().map(|ch| ch.width().unwrap_or(0)).sum()
}

fn to_column(width: usize) -> u16 {
    u16::try_from(width).unwrap_or(u16::MAX)
}
