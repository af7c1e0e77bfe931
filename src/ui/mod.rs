//! Colored output plumbing
//!
//! An explicit UI value owning its writers and color switch, passed by
//! reference into whatever produces output. There is no process-wide
//! writer or color registry; tests inject in-memory writers.

use std::io::{self, IsTerminal, Write};

use colored::Colorize;

/// Line-oriented output sink: events and info on `out`, warnings and
/// errors on `err`, with optional ANSI color on the message streams.
pub struct Ui {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
    color: bool,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui").field("color", &self.color).finish()
    }
}

impl Ui {
    /// UI over stdout/stderr, colored when stderr is a terminal
    pub fn stdio() -> Self {
        let color = io::stderr().is_terminal();
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
            color,
        }
    }

    /// UI over injected writers (tests, embedding callers)
    pub fn from_writers(
        out: Box<dyn Write + Send>,
        err: Box<dyn Write + Send>,
        color: bool,
    ) -> Self {
        Self { out, err, color }
    }

    /// Write one event or result line to the output stream
    pub fn output(&mut self, line: &str) {
        let _ = writeln!(self.out, "{}", line);
        let _ = self.out.flush();
    }

    /// Write an informational message
    pub fn info(&mut self, message: &str) {
        let line = self.paint(message, |m| m.green().to_string());
        let _ = writeln!(self.err, "{}", line);
        let _ = self.err.flush();
    }

    /// Write a warning message
    pub fn warn(&mut self, message: &str) {
        let line = self.paint(message, |m| m.yellow().to_string());
        let _ = writeln!(self.err, "{}", line);
        let _ = self.err.flush();
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) {
        let line = self.paint(message, |m| m.red().to_string());
        let _ = writeln!(self.err, "{}", line);
        let _ = self.err.flush();
    }

    fn paint(&self, message: &str, style: impl Fn(&str) -> String) -> String {
        if self.color {
            style(message)
        } else {
            message.to_string()
        }
    }
}
