// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Screen geometry — direct query plus an escape-sequence fallback.
//
// The primary method asks the terminal driver via `ioctl(TIOCGWINSZ)`.
// Some terminals (serial lines, odd emulators) don't answer, or answer
// with zero columns; for those the fallback pushes the cursor to the
// farthest reachable bottom-right cell with clamping motions, asks the
// terminal to report where the cursor landed, and parses the reply. The
// reply parse is strict: a bounded read-until-terminator loop and a
// two-field integer parse that fails loudly on anything malformed —
// this path IS the geometry on non-ioctl terminals, so leniency here
// would mean silently wrong screen sizes.
//
// Geometry is resolved once at startup and immutable afterwards; live
// resize is out of scope.

use std::io::Write;

use tracing::debug;

use crate::ansi;
use crate::error::TermError;
use crate::input::{ByteSource, InputDecoder};

/// Longest cursor position report we accept: `ESC [ 65535 ; 65535` is
/// 13 bytes, so 32 leaves generous slack without unbounded buffering.
const REPORT_MAX: usize = 32;

// ─── ScreenGeometry ─────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both fields are strictly
/// positive once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenGeometry {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl ScreenGeometry {
    /// Total number of cells (`rows × cols`).
    #[inline]
    #[must_use]
    pub const fn area(self) -> u32 {
        self.rows as u32 * self.cols as u32
    }
}

// ─── Direct query ───────────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// driver reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn from_ioctl() -> Option<ScreenGeometry> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(ScreenGeometry {
            rows: ws.ws_row,
            cols: ws.ws_col,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn from_ioctl() -> Option<ScreenGeometry> {
    None
}

// ─── Probe ──────────────────────────────────────────────────────────────────

/// Resolve the screen geometry, preferring the direct query.
///
/// `out` must be the terminal the decoder's byte source reads from — the
/// fallback writes motion and report-request sequences there and expects
/// the reply on the input side.
///
/// # Errors
///
/// Returns [`TermError::Geometry`] when no method yields valid rows and
/// columns, [`TermError::Io`] when the probe write itself fails.
pub fn probe<S: ByteSource>(
    decoder: &mut InputDecoder<S>,
    out: &mut impl Write,
) -> Result<ScreenGeometry, TermError> {
    if let Some(geometry) = from_ioctl() {
        debug!(rows = geometry.rows, cols = geometry.cols, "geometry via ioctl");
        return Ok(geometry);
    }
    let geometry = probe_via_report(decoder, out)?;
    debug!(rows = geometry.rows, cols = geometry.cols, "geometry via cursor report");
    Ok(geometry)
}

/// Fallback: derive geometry from a cursor position report.
///
/// Moves the cursor to the farthest reachable bottom-right cell (both
/// motions clamp at the edges), requests a position report, and parses
/// the `ESC [ rows ; cols R` reply.
///
/// # Errors
///
/// Returns [`TermError::Geometry`] on a malformed or missing reply.
pub fn probe_via_report<S: ByteSource>(
    decoder: &mut InputDecoder<S>,
    out: &mut impl Write,
) -> Result<ScreenGeometry, TermError> {
    ansi::cursor_to_limit(out)?;
    ansi::cursor_report_request(out)?;
    out.flush()?;

    // Collect the reply one byte at a time until the terminator. A read
    // deadline mid-reply means the terminal stopped talking — parse what
    // arrived and let the strict parse reject a truncated report.
    let mut reply = [0u8; REPORT_MAX];
    let mut len = 0;
    while len < reply.len() {
        match decoder.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => {
                reply[len] = b;
                len += 1;
            }
        }
    }

    parse_cursor_report(&reply[..len])
}

/// Parse a cursor position report body: `ESC [ <rows> ; <cols>` (the `R`
/// terminator already stripped by the read loop).
///
/// # Errors
///
/// Returns [`TermError::Geometry`] if the introducer pair is missing,
/// either field is empty, non-numeric, zero, or out of `u16` range.
fn parse_cursor_report(reply: &[u8]) -> Result<ScreenGeometry, TermError> {
    let body = reply
        .strip_prefix(b"\x1b[")
        .ok_or(TermError::Geometry("report missing ESC [ introducer"))?;

    let delim = body
        .iter()
        .position(|&b| b == b';')
        .ok_or(TermError::Geometry("report missing ; delimiter"))?;

    let rows = parse_field(&body[..delim])?;
    let cols = parse_field(&body[delim + 1..])?;

    Ok(ScreenGeometry { rows, cols })
}

/// Strict positive-integer parse of one report field.
fn parse_field(field: &[u8]) -> Result<u16, TermError> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(TermError::Geometry("report field is not a number"));
    }
    let mut value: u16 = 0;
    for &b in field {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u16::from(b - b'0')))
            .ok_or(TermError::Geometry("report field out of range"))?;
    }
    if value == 0 {
        return Err(TermError::Geometry("report field is zero"));
    }
    Ok(value)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::io;

    use super::*;

    struct Feed(VecDeque<u8>);

    impl Feed {
        fn new(bytes: &[u8]) -> Self {
            Self(bytes.iter().copied().collect())
        }
    }

    impl ByteSource for Feed {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.0.pop_front())
        }
    }

    fn resolve(reply: &[u8]) -> Result<ScreenGeometry, TermError> {
        let mut decoder = InputDecoder::new(Feed::new(reply));
        let mut out = Vec::new();
        probe_via_report(&mut decoder, &mut out)
    }

    // ── ScreenGeometry ───────────────────────────────────────────────

    #[test]
    fn area() {
        assert_eq!(ScreenGeometry { rows: 24, cols: 80 }.area(), 1920);
    }

    #[test]
    fn from_ioctl_does_not_panic() {
        let _ = from_ioctl();
    }

    // ── Fallback probe ───────────────────────────────────────────────

    #[test]
    fn fallback_parses_report() {
        let geometry = resolve(b"\x1b[24;80R").unwrap();
        assert_eq!(geometry, ScreenGeometry { rows: 24, cols: 80 });
    }

    #[test]
    fn fallback_writes_clamp_then_request() {
        let mut decoder = InputDecoder::new(Feed::new(b"\x1b[24;80R"));
        let mut out = Vec::new();
        probe_via_report(&mut decoder, &mut out).unwrap();
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn fallback_handles_large_dimensions() {
        let geometry = resolve(b"\x1b[120;480R").unwrap();
        assert_eq!(
            geometry,
            ScreenGeometry {
                rows: 120,
                cols: 480
            }
        );
    }

    // ── Malformed replies ────────────────────────────────────────────

    #[test]
    fn missing_introducer_fails() {
        assert!(matches!(resolve(b"24;80R"), Err(TermError::Geometry(_))));
    }

    #[test]
    fn missing_delimiter_fails() {
        assert!(matches!(resolve(b"\x1b[2480R"), Err(TermError::Geometry(_))));
    }

    #[test]
    fn non_digit_field_fails() {
        assert!(matches!(
            resolve(b"\x1b[24;8x0R"),
            Err(TermError::Geometry(_))
        ));
    }

    #[test]
    fn empty_field_fails() {
        assert!(matches!(resolve(b"\x1b[;80R"), Err(TermError::Geometry(_))));
        assert!(matches!(resolve(b"\x1b[24;R"), Err(TermError::Geometry(_))));
    }

    #[test]
    fn zero_field_fails() {
        assert!(matches!(resolve(b"\x1b[0;80R"), Err(TermError::Geometry(_))));
    }

    #[test]
    fn oversized_field_fails() {
        assert!(matches!(
            resolve(b"\x1b[24;99999R"),
            Err(TermError::Geometry(_))
        ));
    }

    #[test]
    fn silent_terminal_fails() {
        // No reply at all: every read hits the deadline.
        assert!(matches!(resolve(b""), Err(TermError::Geometry(_))));
    }

    #[test]
    fn truncated_reply_fails() {
        // Terminal went quiet mid-report.
        assert!(matches!(resolve(b"\x1b[24"), Err(TermError::Geometry(_))));
    }

    #[test]
    fn runaway_reply_is_bounded() {
        // 64 digits with no terminator must not buffer unboundedly.
        let mut reply = b"\x1b[".to_vec();
        reply.extend(std::iter::repeat_n(b'9', 64));
        assert!(matches!(resolve(&reply), Err(TermError::Geometry(_))));
    }
}
