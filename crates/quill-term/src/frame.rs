// SPDX-License-Identifier: MIT
//
// Frame buffer — accumulates one complete screen update.
//
// Instead of dozens of small writes per frame (cursor moves, clears,
// row content), everything goes into this buffer first. A single flush
// at frame end writes it all at once, so the terminal never observes a
// torn frame and the user never sees flicker.
//
// Growth is fallible by contract: an append that cannot allocate is
// logged and dropped, and everything appended before it stays valid and
// writable. A failed append never corrupts the buffer.

use std::io::{self, Write};

use tracing::warn;

/// Initial capacity — covers a full frame on common terminal sizes
/// without reallocation.
const DEFAULT_CAPACITY: usize = 4096;

/// A byte buffer holding one in-progress frame.
///
/// Created empty, appended to in the renderer's fixed order, and drained
/// by a single write at the end of the cycle. The allocation is reused
/// across cycles; the contents never are.
pub struct Frame {
    buf: Vec<u8>,
}

impl Frame {
    /// Create an empty frame buffer with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `bytes`, preserving prior content and order.
    ///
    /// On allocation failure the append is dropped and logged; content
    /// appended so far remains intact and the buffer stays usable.
    pub fn push(&mut self, bytes: &[u8]) {
        if let Err(e) = self.buf.try_reserve(bytes.len()) {
            warn!(dropped = bytes.len(), error = %e, "frame append dropped");
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Clear the buffer for the next cycle (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Yield the accumulated bytes and reset the buffer to empty.
    #[must_use]
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }

    /// Write the accumulated bytes to `w` in one call and clear the buffer.
    ///
    /// The writer sees either the whole frame or, if it errors, nothing
    /// more from this frame — no partial re-sends.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for Frame {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.push(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing via flush_to().
        Ok(())
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
