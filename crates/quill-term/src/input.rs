// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal input decoding.
//
// Turns raw stdin bytes into logical keys. The byte source is a trait so
// the decoder (and the geometry probe, which borrows its raw byte path)
// can be driven from scripted bytes in tests and from the raw-mode tty
// in production.
//
// # Escape vs escape-sequence ambiguity
//
// A bare ESC byte (0x1B) could be either a standalone Escape keypress or
// the start of a multi-byte sequence — both begin identically. Raw mode
// configures reads to return empty after a 100 ms silence (VMIN=0 /
// VTIME=1 in `session`), so the decoder attempts the two follow-up bytes
// and reports a lone Escape when either attempt comes back empty. An
// empty read is a normal polling outcome, never an error.
//
// Unrecognized two-byte sequences degrade silently to Escape. That is the
// documented simplification of this layer; recognizing further sequences
// is additive and deliberately not done here.

use std::io;

use crate::error::TermError;

/// The escape introducer byte.
const ESC: u8 = 0x1b;

/// Map a printable character to its Ctrl-combination byte (`q` → 0x11).
#[inline]
#[must_use]
pub const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

// ─── LogicalKey ─────────────────────────────────────────────────────────────

/// A decoded logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A printable byte (0x20..=0x7E and the high half).
    Printable(u8),
    /// A control byte (< 0x20, other than ESC, or DEL 0x7F).
    Control(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// A standalone Escape press, or an unrecognized escape sequence.
    Escape,
}

/// Classify a non-ESC byte as printable or control.
///
/// DEL (0x7F) counts as control, matching C's `iscntrl`.
#[inline]
#[must_use]
const fn classify(b: u8) -> Key {
    if b < 0x20 || b == 0x7f {
        Key::Control(b)
    } else {
        Key::Printable(b)
    }
}

// ─── ByteSource ─────────────────────────────────────────────────────────────

/// A byte-at-a-time input source with a bounded read deadline.
///
/// `Ok(Some(b))` is a byte; `Ok(None)` means the deadline passed with no
/// input — normal control flow, not a failure. `Err` is a genuine read
/// failure and is fatal upstream.
pub trait ByteSource {
    /// Read one byte, or `None` once the read deadline elapses.
    ///
    /// # Errors
    ///
    /// Returns an error only for a genuine read failure, never for the
    /// deadline case.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Production byte source: the raw-mode controlling terminal.
///
/// Relies on the VMIN=0/VTIME=1 configuration installed by
/// [`RawModeSession::enter`](crate::session::RawModeSession::enter) for
/// its 100 ms deadline. Outside raw mode, reads block line-buffered like
/// any other stdin consumer.
#[derive(Debug, Default)]
pub struct TtySource;

impl TtySource {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl ByteSource for TtySource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut b: u8 = 0;
        let n = unsafe {
            libc::read(libc::STDIN_FILENO, (&raw mut b).cast::<libc::c_void>(), 1)
        };
        match n {
            1 => Ok(Some(b)),
            0 => Ok(None), // VTIME deadline: no input yet.
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::WouldBlock {
                    // EAGAIN from a non-blocking fd is the same "no data
                    // within timeout" outcome, not a failure.
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }
}

/// Non-unix fallback: plain blocking reads, no deadline.
#[cfg(not(unix))]
impl ByteSource for TtySource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use io::Read;
        let mut b = [0u8; 1];
        match io::stdin().lock().read(&mut b)? {
            0 => Ok(None),
            _ => Ok(Some(b[0])),
        }
    }
}

// ─── InputDecoder ───────────────────────────────────────────────────────────

/// Decodes a byte stream into [`Key`]s, one key per call.
///
/// No sequence longer than three bytes is recognized.
pub struct InputDecoder<S> {
    source: S,
}

impl<S: ByteSource> InputDecoder<S> {
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Read one raw byte, or `None` on the read deadline.
    ///
    /// This is the raw path the geometry probe uses to collect the cursor
    /// position report — those bytes must not pass through key decoding.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Io`] on a genuine read failure.
    pub fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        Ok(self.source.read_byte()?)
    }

    /// Block until one logical key resolves.
    ///
    /// Empty reads before the first byte are retried — the deadline is a
    /// polling tick, not an end-of-input condition. Once an ESC arrives,
    /// each follow-up byte gets exactly one read attempt: an empty read
    /// there means the ESC stood alone.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Io`] on a genuine read failure.
    pub fn read_key(&mut self) -> Result<Key, TermError> {
        let first = loop {
            if let Some(b) = self.read_byte()? {
                break b;
            }
        };

        if first != ESC {
            return Ok(classify(first));
        }

        // ESC arrived. One attempt per follow-up byte; a timeout on either
        // means the user pressed Escape itself.
        let Some(b1) = self.read_byte()? else {
            return Ok(Key::Escape);
        };
        let Some(b2) = self.read_byte()? else {
            return Ok(Key::Escape);
        };

        Ok(match (b1, b2) {
            (b'[', b'A') => Key::ArrowUp,
            (b'[', b'B') => Key::ArrowDown,
            (b'[', b'C') => Key::ArrowRight,
            (b'[', b'D') => Key::ArrowLeft,
            // Anything else is downgraded to Escape rather than erroring.
            _ => Key::Escape,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
