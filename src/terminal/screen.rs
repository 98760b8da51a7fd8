//! Frame output to the controlling terminal.

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use crate::session::Screen;

/// Fallback size when the terminal cannot be queried (e.g. output is piped).
pub const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// Writes frames to a terminal-like writer, clearing between frames.
pub struct ConsoleScreen<W: Write> {
    out: W,
}

impl ConsoleScreen<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Screen for ConsoleScreen<W> {
    fn size(&mut self) -> io::Result<(u16, u16)> {
        Ok(crossterm::terminal::size().unwrap_or(FALLBACK_SIZE))
    }

    fn present(&mut self, frame: &str, footer: Option<&str>) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.write_all(frame.as_bytes())?;
        if let Some(footer) = footer {
            writeln!(self.out, "{}", footer)?;
        }
        self.out.flush()
    }

    fn progress(&mut self, done: usize, total: usize) -> io::Result<()> {
        if total > 0 {
            write!(self.out, "\rExported {}/{} frames", done, total)?;
        } else {
            write!(self.out, "\rExported {} frames", done)?;
        }
        self.out.flush()
    }
}
