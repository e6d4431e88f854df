// SPDX-License-Identifier: MIT
//
// Frame composition — one screen, one write.
//
// Every cycle composes the entire screen into a `Frame` and then writes
// it with a single `write_all`. The order inside the frame is fixed:
// hide the cursor, home, paint every row (clear-to-end-of-line first,
// then content), reposition the cursor, show it again. Hiding during
// the repaint is what stops the cursor from ghosting across the screen
// while rows are being replaced.
//
// Row content in this snapshot: a centered title on the top row, a
// geometry/cursor diagnostic on the bottom row, everything between left
// blank for future consumers (text buffer, status bar). Both strings
// truncate to the column count on narrow terminals.

use std::io::{self, Write};

use crate::ansi;
use crate::cursor::CursorPosition;
use crate::error::TermError;
use crate::frame::Frame;
use crate::geometry::ScreenGeometry;

/// Composes frames and writes each one atomically.
pub struct Renderer {
    frame: Frame,
    title: String,
}

impl Renderer {
    /// Renderer with the default title line.
    #[must_use]
    pub fn new() -> Self {
        Self::with_title(format!("quill -- version {}", env!("CARGO_PKG_VERSION")))
    }

    /// Renderer with a custom title line.
    #[must_use]
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            frame: Frame::new(),
            title: title.into(),
        }
    }

    /// Compose the current state into one frame and write it to `out`
    /// in a single call.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Io`] if the final write to `out` fails.
    /// Composition itself cannot fail — the frame is memory-backed.
    pub fn render(
        &mut self,
        out: &mut impl Write,
        geometry: ScreenGeometry,
        cursor: CursorPosition,
    ) -> Result<(), TermError> {
        self.compose(geometry, cursor)?;
        self.frame.flush_to(out)?;
        Ok(())
    }

    /// Build the full escape/text sequence for one frame.
    fn compose(
        &mut self,
        geometry: ScreenGeometry,
        cursor: CursorPosition,
    ) -> io::Result<()> {
        let f = &mut self.frame;
        f.clear();

        ansi::cursor_hide(f)?;
        ansi::cursor_home(f)?;

        let last_row = geometry.rows - 1;
        for row in 0..geometry.rows {
            ansi::clear_line(f)?;

            if row == last_row {
                // The bottom row carries the diagnostic; on a one-row
                // screen it wins over the title.
                let diag = format!(
                    "{}x{} -- cursor {},{}",
                    geometry.cols, geometry.rows, cursor.row, cursor.col
                );
                f.push(truncated(&diag, geometry.cols));
            } else if row == 0 {
                push_centered(f, &self.title, geometry.cols);
            }

            if row != last_row {
                f.push(b"\r\n");
            }
        }

        ansi::cursor_to(f, cursor.row, cursor.col)?;
        ansi::cursor_show(f)?;
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate `text` to at most `cols` bytes.
///
/// Content here is ASCII-only; Unicode-aware widths are a non-goal.
fn truncated(text: &str, cols: u16) -> &[u8] {
    let limit = (cols as usize).min(text.len());
    &text.as_bytes()[..limit]
}

/// Append `text` centered in `cols` columns (left padding only — the
/// clear-to-end-of-line already blanked the right side).
fn push_centered(f: &mut Frame, text: &str, cols: u16) {
    let text = truncated(text, cols);
    let pad = (cols as usize - text.len()) / 2;
    f.push(" ".repeat(pad).as_bytes());
    f.push(text);
}

// ─── Tests ───────────────────────────────────────────────────────────────────
