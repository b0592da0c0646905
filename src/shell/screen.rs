//! Output surface the shell draws frames on.

use std::io;

use console::Term;

/// Somewhere a frame can be shown.
pub trait Screen {
    /// Current size as `(rows, columns)`, when it can be determined.
    fn size(&self) -> Option<(u16, u16)>;

    /// Replace whatever is on screen with `lines`.
    fn show(&mut self, lines: &[String]) -> io::Result<()>;
}

impl Screen for Term {
    fn size(&self) -> Option<(u16, u16)> {
        self.size_checked()
    }

    fn show(&mut self, lines: &[String]) -> io::Result<()> {
        self.clear_screen()?;
        self.write_str(&lines.join("\n"))?;
        Term::flush(self)
    }
}
