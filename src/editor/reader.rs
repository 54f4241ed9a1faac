//! Line reader: the public entry point.
//!
//! The input variant is chosen once, on the first [`LineReader::read_line`]:
//! an interactive terminal session when stdin and stdout are terminals,
//! otherwise a pass-through reader over stdin.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::buffer::EditBuffer;
use super::line_editor::{LineEditor, Step};
use super::{Completer, LineResult};
use crate::config::Config;
use crate::core::{teardown, Session};
use crate::error::{LineError, Result};
use crate::history::History;
use crate::ui::{EditCommand, EventSource, KeyMapper, LineRenderer, TerminalEvents};

/// Interactive line reader with history
pub struct LineReader {
    /// Program identity (argv[0]-style)
    identity: String,
    config: Config,
    /// Session default prompt
    prompt: String,
    history: History,
    completer: Option<Box<dyn Completer>>,
    /// Selected on first read
    input: Option<Input>,
}

/// The two ways lines are read
enum Input {
    Interactive(Interactive),
    PassThrough(PassThrough),
}

/// Raw-mode editing on the controlling terminal
struct Interactive {
    session: Session,
    events: Box<dyn EventSource>,
    out: Box<dyn Write>,
    renderer: LineRenderer,
}

/// Plain newline-delimited reads from a redirected stream
struct PassThrough {
    reader: Box<dyn BufRead>,
    out: Box<dyn Write>,
}

impl LineReader {
    /// Create a reader for `identity`, loading `~/.<identity>/config.toml`.
    ///
    /// The terminal is not touched until the first `read_line`.
    pub fn new(identity: &str) -> Self {
        Self::with_config(identity, Config::load(identity))
    }

    pub fn with_config(identity: &str, config: Config) -> Self {
        Self {
            identity: identity.to_string(),
            prompt: config.prompt.clone(),
            history: History::with_config(&config.history),
            config,
            completer: None,
            input: None,
        }
    }

    /// Reader that always uses pass-through mode over `reader`
    pub fn from_reader<R: BufRead + 'static>(identity: &str, reader: R) -> Self {
        Self::from_reader_with_config(identity, Config::default(), reader)
    }

    pub fn from_reader_with_config<R: BufRead + 'static>(
        identity: &str,
        config: Config,
        reader: R,
    ) -> Self {
        let mut line_reader = Self::with_config(identity, config);
        line_reader.input = Some(Input::PassThrough(PassThrough {
            reader: Box::new(reader),
            out: Box::new(io::stdout()),
        }));
        line_reader
    }

    /// Reader that edits interactively over the given session and streams
    pub fn from_parts(
        identity: &str,
        config: Config,
        session: Session,
        events: Box<dyn EventSource>,
        out: Box<dyn Write>,
        renderer: LineRenderer,
    ) -> Self {
        let mut line_reader = Self::with_config(identity, config);
        line_reader.input = Some(Input::Interactive(Interactive {
            session,
            events,
            out,
            renderer,
        }));
        line_reader
    }

    /// Set the session default prompt
    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn set_completer(&mut self, completer: Box<dyn Completer>) {
        self.completer = Some(completer);
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// `~/.<identity>/history`, or the configured override
    pub fn default_history_path(&self) -> Option<PathBuf> {
        self.config.history_path(&self.identity)
    }

    pub fn load_history(&mut self, path: &Path) -> Result<()> {
        self.history.load(path)
    }

    pub fn save_history(&self, path: &Path) -> Result<()> {
        self.history.save(path)
    }

    /// `Some(true)` once an interactive session is in use, `None` before the
    /// first read
    pub fn is_interactive(&self) -> Option<bool> {
        self.input
            .as_ref()
            .map(|input| matches!(input, Input::Interactive(_)))
    }

    /// Read one line, rendering `prompt` or the session default
    pub fn read_line(&mut self, prompt: Option<&str>) -> Result<LineResult> {
        let prompt = prompt.unwrap_or(&self.prompt).to_string();
        let input = self
            .input
            .get_or_insert_with(|| Input::detect(&self.identity));

        let result = match input {
            Input::Interactive(term) => {
                term.read_line(&prompt, &mut self.history, self.completer.as_deref())?
            }
            Input::PassThrough(pipe) => {
                pipe.read_line(&prompt, self.config.echo_prompt_when_piped, &mut self.history)?
            }
        };

        debug!(?result, "read_line finished");
        Ok(result)
    }

    /// Write caller output, translating `\n` to `\r\n` while raw mode is on
    pub fn write_output(&mut self, text: &str) -> io::Result<()> {
        match &mut self.input {
            Some(Input::Interactive(term)) if term.session.is_active() => {
                term.out.write_all(to_raw_newlines(text).as_bytes())?;
                term.out.flush()
            }
            Some(Input::Interactive(term)) => {
                term.out.write_all(text.as_bytes())?;
                term.out.flush()
            }
            Some(Input::PassThrough(pipe)) => {
                pipe.out.write_all(text.as_bytes())?;
                pipe.out.flush()
            }
            None => {
                let mut stdout = io::stdout();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()
            }
        }
    }

    /// Release the terminal. Later reads re-enter raw mode.
    pub fn close(&mut self) -> Result<()> {
        if let Some(Input::Interactive(term)) = &mut self.input {
            term.session.close()?;
        }
        Ok(())
    }
}

impl Input {
    fn detect(identity: &str) -> Self {
        match Session::open(identity) {
            Ok(session) => {
                info!("Interactive input on terminal");
                Input::Interactive(Interactive {
                    session,
                    events: Box::new(TerminalEvents::new()),
                    out: Box::new(io::stdout()),
                    renderer: LineRenderer::for_terminal(),
                })
            }
            Err(e) => {
                if matches!(e, LineError::TerminalUnavailable) {
                    info!("No terminal, using pass-through input");
                } else {
                    warn!("Failed to open terminal session, using pass-through input: {}", e);
                }
                Input::PassThrough(PassThrough {
                    reader: Box::new(io::stdin().lock()),
                    out: Box::new(io::stdout()),
                })
            }
        }
    }
}

impl Interactive {
    fn read_line(
        &mut self,
        prompt: &str,
        history: &mut History,
        completer: Option<&dyn Completer>,
    ) -> Result<LineResult> {
        self.session.ensure_open()?;
        if teardown::take_interrupt() {
            debug!("discarding interrupt raised between reads");
        }
        history.reset_cursor();

        let mut editor = LineEditor::new();
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                needs_redraw = !self.redraw(prompt, editor.buffer());
            }

            let command = match self.events.next_event() {
                Ok(event) => match KeyMapper::map(&event) {
                    Some(command) => command,
                    None => continue,
                },
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    debug!("event source exhausted");
                    EditCommand::EndOfInput
                }
                Err(e) => return Err(e.into()),
            };

            match editor.apply(command, history, completer) {
                Step::Continue { redraw } => needs_redraw |= redraw,
                Step::ClearScreen => {
                    if let Err(e) = self.renderer.clear_screen(&mut self.out) {
                        warn!("Failed to clear screen: {}", e);
                    }
                    needs_redraw = true;
                }
                Step::Resize(cols, rows) => {
                    debug!(cols, rows, "terminal resized");
                    self.renderer.set_width(cols);
                    needs_redraw = true;
                }
                Step::Finished(result) => {
                    if let LineResult::Line(_) = &result {
                        // Show the line from its end before leaving the row
                        let mut shown = editor.buffer().clone();
                        shown.move_end();
                        self.redraw(prompt, &shown);
                    }
                    if let Err(e) = self.renderer.finish(&mut self.out) {
                        warn!("Failed to terminate line: {}", e);
                    }
                    return Ok(result);
                }
            }
        }
    }

    /// Returns whether the redraw reached the terminal
    fn redraw(&mut self, prompt: &str, buffer: &EditBuffer) -> bool {
        match self.renderer.render(&mut self.out, prompt, buffer) {
            Ok(()) => true,
            Err(e) => {
                warn!("Render failed, retrying on next event: {}", e);
                false
            }
        }
    }
}

impl PassThrough {
    fn read_line(&mut self, prompt: &str, echo_prompt: bool, history: &mut History) -> Result<LineResult> {
        if echo_prompt {
            self.out.write_all(prompt.as_bytes())?;
            self.out.flush()?;
        }

        let mut bytes = Vec::new();
        if self.reader.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(LineResult::EndOfInput);
        }

        if bytes.last() == Some(&b'\n') {
            bytes.pop();
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
        }

        let line = String::from_utf8_lossy(&bytes).into_owned();
        history.append(&line);
        Ok(LineResult::Line(line))
    }
}

fn to_raw_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous = None;
    for ch in text.chars() {
        if ch == '\n' && previous != Some('\r') {
            out.push('\r');
        }
        out.push(ch);
        previous = Some(ch);
    }
    out
}
