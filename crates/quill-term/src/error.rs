// SPDX-License-Identifier: MIT
//
// Crate-wide error type.
//
// Three failure classes, all fatal at the event-loop boundary: the binary
// clears the screen, lets the session guard restore termios, and exits
// nonzero. The read timeout is NOT an error — it surfaces as `Ok(None)`
// from the byte source and is normal control flow. Allocation failure on
// frame append is logged at the append site and never propagates here.

use std::io;

use thiserror::Error;

/// Terminal-control failures, all treated as fatal by the caller.
#[derive(Debug, Error)]
pub enum TermError {
    /// Getting or setting terminal attributes failed (tcgetattr/tcsetattr).
    #[error("terminal attribute change failed: {0}")]
    Terminal(#[source] io::Error),

    /// No method produced a valid screen geometry.
    #[error("could not determine terminal geometry: {0}")]
    Geometry(&'static str),

    /// A terminal read or write failed for a reason other than the
    /// expected poll timeout.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: TermError = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, TermError::Io(_)));
    }

    #[test]
    fn display_names_the_failure() {
        let err = TermError::Geometry("report carried no delimiter");
        assert!(err.to_string().contains("geometry"));
        assert!(err.to_string().contains("delimiter"));
    }

    #[test]
    fn terminal_keeps_the_source() {
        use std::error::Error as _;
        let err = TermError::Terminal(io::Error::new(io::ErrorKind::Other, "tcgetattr"));
        assert!(err.source().is_some());
    }
}
