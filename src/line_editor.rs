//! Minimal line editing over a raw byte stream.
//!
//! Used when the shell reads from something that is not a terminal, or from a
//! terminal that does no editing of its own. Printable bytes are echoed and
//! appended, backspace and delete erase the last byte, and carriage return or
//! newline completes the line.

use std::io::{self, Read, Write};

/// Longest line accepted; input beyond it completes the line early.
pub const MAX_LINE: usize = 1023;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;
const ERASE: &[u8] = b"\x08 \x08";
const NEWLINE: &[u8] = b"\r\n";

/// Accumulates one line of input, byte by byte.
#[derive(Debug, Default)]
pub struct LineEditor {
    buffer: Vec<u8>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes entered so far on the current line.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    /// Process one input byte, writing its echo to `echo`.
    ///
    /// Returns the finished line once a line terminator arrives or the line
    /// reaches [`MAX_LINE`] bytes; the editor is then empty again.
    pub fn feed(&mut self, byte: u8, echo: &mut dyn Write) -> io::Result<Option<String>> {
        match byte {
            b'\r' | b'\n' => {
                echo.write_all(NEWLINE)?;
                return Ok(Some(self.take()));
            }
            BACKSPACE | DELETE => {
                if self.buffer.pop().is_some() {
                    echo.write_all(ERASE)?;
                }
            }
            other => {
                echo.write_all(&[other])?;
                self.buffer.push(other);
            }
        }
        echo.flush()?;

        if self.buffer.len() >= MAX_LINE {
            return Ok(Some(self.take()));
        }
        Ok(None)
    }

    /// Read bytes from `input` until a line is complete.
    ///
    /// Returns `None` when the input ends before anything was typed; a partial
    /// line cut off by end of input is returned as is.
    pub fn read_line(
        &mut self,
        input: &mut dyn Read,
        echo: &mut dyn Write,
    ) -> io::Result<Option<String>> {
        let mut byte = [0u8; 1];
        loop {
            match input.read(&mut byte) {
                Ok(0) => {
                    return Ok(if self.buffer.is_empty() {
                        None
                    } else {
                        Some(self.take())
                    });
                }
                Ok(_) => {
                    if let Some(line) = self.feed(byte[0], echo)? {
                        return Ok(Some(line));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn take(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buffer);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_printable_is_echoed_and_buffered() {
        let mut editor = LineEditor::new();
        let mut echo = Vec::new();
        for b in b"ls" {
            assert_eq!(editor.feed(*b, &mut echo).unwrap(), None);
        }
        assert_eq!(editor.pending(), b"ls");
        assert_eq!(echo, b"ls");
    }

    #[test]
    fn test_backspace_removes_one_char() {
        let mut editor = LineEditor::new();
        let mut echo = Vec::new();
        editor.feed(b'a', &mut echo).unwrap();
        editor.feed(b'b', &mut echo).unwrap();
        editor.feed(BACKSPACE, &mut echo).unwrap();

        assert_eq!(editor.pending(), b"a");
        assert_eq!(echo, b"ab\x08 \x08");

        editor.feed(DELETE, &mut echo).unwrap();
        assert_eq!(editor.pending(), b"");
        assert_eq!(echo, b"ab\x08 \x08\x08 \x08");
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut editor = LineEditor::new();
        let mut echo = Vec::new();
        assert_eq!(editor.feed(BACKSPACE, &mut echo).unwrap(), None);
        assert_eq!(editor.feed(DELETE, &mut echo).unwrap(), None);
        assert!(editor.pending().is_empty());
        assert!(echo.is_empty());
    }

    #[test]
    fn test_enter_completes_line() {
        let mut editor = LineEditor::new();
        let mut echo = Vec::new();
        editor.feed(b'x', &mut echo).unwrap();
        assert_eq!(
            editor.feed(b'\r', &mut echo).unwrap(),
            Some("x".to_string())
        );
        assert!(editor.pending().is_empty());
        assert_eq!(echo, b"x\r\n");
    }

    #[test]
    fn test_read_line_applies_edits() {
        let mut editor = LineEditor::new();
        let mut input = Cursor::new(b"lx\x7fs -l\nnext\n".to_vec());
        let mut echo = Vec::new();
        assert_eq!(
            editor.read_line(&mut input, &mut echo).unwrap(),
            Some("ls -l".to_string())
        );
        assert_eq!(
            editor.read_line(&mut input, &mut echo).unwrap(),
            Some("next".to_string())
        );
        assert_eq!(editor.read_line(&mut input, &mut echo).unwrap(), None);
    }

    #[test]
    fn test_read_line_partial_at_eof() {
        let mut editor = LineEditor::new();
        let mut input = Cursor::new(b"half".to_vec());
        let mut echo = Vec::new();
        assert_eq!(
            editor.read_line(&mut input, &mut echo).unwrap(),
            Some("half".to_string())
        );
    }

    #[test]
    fn test_long_line_is_cut() {
        let mut editor = LineEditor::new();
        let mut input = Cursor::new(vec![b'a'; MAX_LINE + 5]);
        let mut echo = Vec::new();
        let first = editor.read_line(&mut input, &mut echo).unwrap().unwrap();
        assert_eq!(first.len(), MAX_LINE);
        let rest = editor.read_line(&mut input, &mut echo).unwrap().unwrap();
        assert_eq!(rest.len(), 5);
    }
}
