//! Transient progress line and terminal cursor handling

use std::io::{self, Write};

/// Erase from the cursor to the end of the line
pub const CLEAR_LINE: &str = "\x1b[K";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Wrap formatted progress text so the next write overwrites it in place
pub fn progress_line(text: &str) -> String {
    format!("{}{}\r", CLEAR_LINE, text)
}

/// Hides the terminal cursor and shows it again when dropped, including on
/// early returns and panics that unwind.
pub struct CursorGuard<W: Write> {
    out: W,
    active: bool,
}

impl CursorGuard<io::Stdout> {
    pub fn stdout(enabled: bool) -> Self {
        Self::new(io::stdout(), enabled)
    }
}

impl<W: Write> CursorGuard<W> {
    /// A disabled guard writes nothing at all
    pub fn new(mut out: W, enabled: bool) -> Self {
        if enabled {
            let _ = out.write_all(HIDE_CURSOR.as_bytes());
            let _ = out.flush();
        }
        Self { out, active: enabled }
    }

    /// Write a progress line without moving to the next line
    pub fn progress(&mut self, text: &str) {
        if self.active {
            let _ = self.out.write_all(progress_line(text).as_bytes());
            let _ = self.out.flush();
        }
    }

    /// Replace the progress text with a line that stays on screen
    pub fn persist(&mut self, text: &str) {
        if self.active {
            let _ = writeln!(self.out, "{}{}", CLEAR_LINE, text);
            let _ = self.out.flush();
        }
    }

    /// Clear whatever progress text is on the current line
    pub fn clear_line(&mut self) {
        if self.active {
            let _ = self.out.write_all(CLEAR_LINE.as_bytes());
            let _ = self.out.flush();
        }
    }

    fn restore(&mut self) {
        if self.active {
            let _ = self.out.write_all(SHOW_CURSOR.as_bytes());
            let _ = self.out.flush();
            self.active = false;
        }
    }
}

impl<W: Write> Drop for CursorGuard<W> {
    fn drop(&mut self) {
        self.restore();
    }
}
