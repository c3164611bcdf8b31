//! Sources of command lines for interactive mode.

use crate::line_editor::LineEditor;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, Read, Write};

/// Anything that can show a prompt and hand back one line of input.
pub trait LineSource {
    /// Print `prompt` and read one line.
    ///
    /// `Ok(None)` means the input is exhausted and the session should end.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

/// Terminal input with history, backed by [`rustyline`].
pub struct Editor {
    rl: DefaultEditor,
}

impl Editor {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            rl: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.rl.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.rl.add_history_entry(line.as_str()) {
                        log::debug!("history: {}", e);
                    }
                }
                Ok(Some(line))
            }
            // Ctrl-C drops the pending line; the loop shows a fresh prompt
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(err) => Err(io::Error::other(err.to_string())),
        }
    }
}

/// Raw byte input edited by a [`LineEditor`], echoing to `W`.
pub struct RawTerminal<R, W> {
    input: R,
    echo: W,
    editor: LineEditor,
}

impl<R: Read, W: Write> RawTerminal<R, W> {
    pub fn new(input: R, echo: W) -> Self {
        Self {
            input,
            echo,
            editor: LineEditor::new(),
        }
    }

    pub fn into_echo(self) -> W {
        self.echo
    }
}

impl<R: Read, W: Write> LineSource for RawTerminal<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.echo.write_all(prompt.as_bytes())?;
        self.echo.flush()?;
        self.editor.read_line(&mut self.input, &mut self.echo)
    }
}
