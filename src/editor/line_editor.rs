//! Command interpreter for one line-read cycle.
//!
//! `LineEditor` applies [`EditCommand`]s to its buffer and to the shared
//! history, and tells the read loop what to do next. It never touches the
//! terminal, so every editing rule is testable in isolation.

use tracing::debug;

use super::buffer::EditBuffer;
use super::{Completer, LineResult};
use crate::history::History;
use crate::ui::EditCommand;

/// What the read loop should do after a command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Keep reading; redraw when the visible line changed
    Continue { redraw: bool },
    /// Clear the screen, then redraw
    ClearScreen,
    /// Terminal width changed, redraw
    Resize(u16, u16),
    /// The read cycle is over
    Finished(LineResult),
}

/// Editing state of one `read_line` call
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: EditBuffer,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Apply one command
    pub fn apply(
        &mut self,
        command: EditCommand,
        history: &mut History,
        completer: Option<&dyn Completer>,
    ) -> Step {
        let edited = match command {
            EditCommand::Insert(ch) => {
                self.buffer.insert(ch);
                true
            }
            EditCommand::InsertText(text) => {
                self.buffer.insert_str(&text);
                !text.is_empty()
            }
            EditCommand::DeleteBackward => self.buffer.delete_backward(),
            EditCommand::DeleteForward => self.buffer.delete_forward(),
            EditCommand::KillToEnd => self.buffer.kill_to_end(),
            EditCommand::KillToStart => self.buffer.kill_to_start(),
            EditCommand::DeleteWordBackward => self.buffer.delete_word_backward(),
            EditCommand::Complete => self.complete(completer),

            // Cursor moves keep the recall position
            EditCommand::MoveLeft => return redraw(self.buffer.move_left()),
            EditCommand::MoveRight => return redraw(self.buffer.move_right()),
            EditCommand::MoveHome => return redraw(self.buffer.move_home()),
            EditCommand::MoveEnd => return redraw(self.buffer.move_end()),

            EditCommand::HistoryPrevious => {
                let recalled = history.recall_previous(&self.buffer.text());
                return self.show_recalled(recalled);
            }
            EditCommand::HistoryNext => {
                let recalled = history.recall_next();
                return self.show_recalled(recalled);
            }

            EditCommand::ClearScreen => return Step::ClearScreen,
            EditCommand::Resize(cols, rows) => return Step::Resize(cols, rows),

            EditCommand::Submit => return self.submit(history),
            EditCommand::EndOfInput if self.buffer.is_empty() => {
                history.reset_cursor();
                return Step::Finished(LineResult::EndOfInput);
            }
            // End of input on a partial line submits it
            EditCommand::EndOfInput => return self.submit(history),
            EditCommand::Interrupt => {
                debug!(discarded = self.buffer.len(), "line interrupted");
                self.buffer.clear();
                history.reset_cursor();
                return Step::Finished(LineResult::Interrupted);
            }
        };

        if edited {
            // Editing a recalled line makes it the new draft
            history.reset_cursor();
        }
        redraw(edited)
    }

    fn show_recalled(&mut self, recalled: Option<String>) -> Step {
        match recalled {
            Some(text) => {
                self.buffer.set_text(&text);
                redraw(true)
            }
            None => redraw(false),
        }
    }

    fn complete(&mut self, completer: Option<&dyn Completer>) -> bool {
        let Some(completer) = completer else {
            return false;
        };
        let line = self.buffer.text();
        match completer.complete(&line, self.buffer.cursor()) {
            Some(completion) => {
                self.buffer
                    .replace_before_cursor(completion.start, &completion.replacement);
                true
            }
            None => false,
        }
    }

    fn submit(&mut self, history: &mut History) -> Step {
        let line = self.buffer.text();
        if line.is_empty() {
            history.reset_cursor();
        } else {
            history.append(&line);
        }
        Step::Finished(LineResult::Line(line))
    }
}

fn redraw(changed: bool) -> Step {
    Step::Continue { redraw: changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::Completion;

    fn run(editor: &mut LineEditor, history: &mut History, commands: Vec<EditCommand>) -> Option<Step> {
        let mut last = None;
        for command in commands {
            last = Some(editor.apply(command, history, None));
        }
        last
    }

    fn type_text(text: &str) -> Vec<EditCommand> {
        text.chars().map(EditCommand::Insert).collect()
    }

    #[test]
    fn test_submit_appends_non_empty() {
        let mut history = History::new();
        let mut editor = LineEditor::new();
        let mut commands = type_text("(+ 1 2)");
        commands.push(EditCommand::Submit);
        let step = run(&mut editor, &mut history, commands);
        assert_eq!(step, Some(Step::Finished(LineResult::Line("(+ 1 2)".to_string()))));
        assert_eq!(history.iter().collect::<Vec<_>>(), vec!["(+ 1 2)"]);
    }

    #[test]
    fn test_submit_empty_appends_nothing() {
        let mut history = History::new();
        let mut editor = LineEditor::new();
        let step = editor.apply(EditCommand::Submit, &mut history, None);
        assert_eq!(step, Step::Finished(LineResult::Line(String::new())));
        assert!(history.is_empty());
    }

    #[test]
    fn test_end_of_input() {
        let mut history = History::new();
        let mut editor = LineEditor::new();
        assert_eq!(
            editor.apply(EditCommand::EndOfInput, &mut history, None),
            Step::Finished(LineResult::EndOfInput)
        );

        let mut editor = LineEditor::new();
        let mut commands = type_text("partial");
        commands.push(EditCommand::EndOfInput);
        let step = run(&mut editor, &mut history, commands);
        assert_eq!(step, Some(Step::Finished(LineResult::Line("partial".to_string()))));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_interrupt_discards_buffer() {
        let mut history = History::new();
        let mut editor = LineEditor::new();
        let mut commands = type_text("oops");
        commands.push(EditCommand::Interrupt);
        let step = run(&mut editor, &mut history, commands);
        assert_eq!(step, Some(Step::Finished(LineResult::Interrupted)));
        assert!(editor.buffer().is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn test_recall_past_oldest_is_noop() {
        let mut history = History::new();
        for line in ["a", "b", "c"] {
            history.append(line);
        }
        let mut editor = LineEditor::new();
        for _ in 0..3 {
            editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        }
        assert_eq!(editor.buffer().text(), "a");
        let step = editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        assert_eq!(step, Step::Continue { redraw: false });
        assert_eq!(editor.buffer().text(), "a");
    }

    #[test]
    fn test_recall_round_trip_restores_draft() {
        let mut history = History::new();
        history.append("first");
        history.append("second");
        let mut editor = LineEditor::new();
        run(&mut editor, &mut history, type_text("draft"));

        run(
            &mut editor,
            &mut history,
            vec![EditCommand::HistoryPrevious, EditCommand::HistoryPrevious],
        );
        assert_eq!(editor.buffer().text(), "first");

        run(
            &mut editor,
            &mut history,
            vec![EditCommand::HistoryNext, EditCommand::HistoryNext],
        );
        assert_eq!(editor.buffer().text(), "draft");
        assert_eq!(editor.buffer().cursor(), 5);

        let step = editor.apply(EditCommand::HistoryNext, &mut history, None);
        assert_eq!(step, Step::Continue { redraw: false });
    }

    #[test]
    fn test_editing_recalled_line_starts_new_draft() {
        let mut history = History::new();
        history.append("one");
        history.append("two");
        let mut editor = LineEditor::new();

        editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        editor.apply(EditCommand::Insert('!'), &mut history, None);
        assert!(!history.is_recalling());

        // Recall starts again from the newest entry, keeping the edit
        editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        assert_eq!(editor.buffer().text(), "two");
        editor.apply(EditCommand::HistoryNext, &mut history, None);
        assert_eq!(editor.buffer().text(), "one!");
    }

    #[test]
    fn test_cursor_moves_keep_recall() {
        let mut history = History::new();
        history.append("one");
        let mut editor = LineEditor::new();
        editor.apply(EditCommand::HistoryPrevious, &mut history, None);
        editor.apply(EditCommand::MoveHome, &mut history, None);
        assert!(history.is_recalling());
    }

    #[test]
    fn test_completion_seam() {
        struct Words;
        impl Completer for Words {
            fn complete(&self, line: &str, cursor: usize) -> Option<Completion> {
                let chars: Vec<char> = line.chars().collect();
                let start = chars[..cursor]
                    .iter()
                    .rposition(|ch| *ch == ' ')
                    .map(|i| i + 1)
                    .unwrap_or(0);
                let word: String = chars[start..cursor].iter().collect();
                "defn".starts_with(&word).then(|| Completion {
                    start,
                    replacement: "defn".to_string(),
                })
            }
        }

        let mut history = History::new();
        let mut editor = LineEditor::new();
        run(&mut editor, &mut history, type_text("(de"));
        // No completer: Tab is ignored
        assert_eq!(
            editor.apply(EditCommand::Complete, &mut history, None),
            Step::Continue { redraw: false }
        );

        let mut editor = LineEditor::new();
        run(&mut editor, &mut history, type_text("x de"));
        let step = editor.apply(EditCommand::Complete, &mut history, Some(&Words));
        assert_eq!(step, Step::Continue { redraw: true });
        assert_eq!(editor.buffer().text(), "x defn");

        // Offsets are in chars, not bytes
        let mut editor = LineEditor::new();
        run(&mut editor, &mut history, type_text("λ d"));
        editor.apply(EditCommand::Complete, &mut history, Some(&Words));
        assert_eq!(editor.buffer().text(), "λ defn");
        assert_eq!(editor.buffer().cursor(), 6);
    }

    #[test]
    fn test_screen_commands_pass_through() {
        let mut history = History::new();
        let mut editor = LineEditor::new();
        assert_eq!(
            editor.apply(EditCommand::ClearScreen, &mut history, None),
            Step::ClearScreen
        );
        assert_eq!(
            editor.apply(EditCommand::Resize(100, 30), &mut history, None),
            Step::Resize(100, 30)
        );
    }
}
