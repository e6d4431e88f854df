// SPDX-License-Identifier: MIT
//
// Raw-mode session — termios control with RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), isatty, and raw fd writes. These are the standard POSIX
// interfaces for terminal control — there is no safe alternative. Each
// unsafe block is minimal and documented.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. Acquiring a session captures
// the original attributes, installs raw attributes derived from them, and
// guarantees restoration on drop — even if the editor panics mid-frame.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. This prevents deadlock if the panic
// happened while holding the stdout lock (common during frame rendering).
// One raw write, termios restored from the global backup, then the
// original panic handler prints its message to a working terminal.
//
// The raw attributes double as the input timing contract: VMIN=0/VTIME=1
// makes every read return after one byte or a 100 ms silence. That silence
// is what lets the input decoder tell a lone Escape keypress apart from
// the start of a multi-byte sequence.

use std::io;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

#[cfg(unix)]
use tracing::info;

use crate::error::TermError;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`RawModeSession`] guard owns its own copy, but the panic hook
/// can't access it. This global backup — behind a [`Mutex`], not
/// `static mut` — lets the hook restore raw mode without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Screen restore sequence for emergency use: show cursor, clear, home.
///
/// Leaves the shell prompt on a blank screen with a visible cursor instead
/// of whatever half-drawn frame the panic interrupted.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message. Our hook
/// writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing Rust's stdout
/// lock to avoid deadlock), restores termios, then delegates to the
/// original panic handler so the error prints to a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the screen restore sequence directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        use std::io::Write;
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── RawModeSession ─────────────────────────────────────────────────────────

/// Raw-mode terminal session with RAII cleanup.
///
/// [`enter`](Self::enter) captures the original termios, installs the raw
/// attributes, and returns a guard. The original attributes are restored
/// when the guard is dropped — on every path out of the event loop,
/// including error returns and panics. This is the only component that
/// mutates terminal driver state.
///
/// # Example
///
/// ```no_run
/// use quill_term::session::RawModeSession;
///
/// let session = RawModeSession::enter()?;
/// // ... render frames, read keys ...
/// drop(session); // original attributes restored
/// # Ok::<(), quill_term::error::TermError>(())
/// ```
pub struct RawModeSession {
    /// Original termios saved before entering raw mode. `None` once restored.
    #[cfg(unix)]
    original: Option<libc::termios>,
}

#[cfg(unix)]
impl RawModeSession {
    /// Capture the current terminal attributes and switch to raw mode.
    ///
    /// Raw mode disables output post-processing, break signals, parity
    /// checking, 8th-bit stripping, software flow control, CR→LF
    /// translation, echo, canonical buffering, signal keys, and extended
    /// input processing; character size is forced to 8 bits. `VMIN=0` /
    /// `VTIME=1` gives every read a 100 ms deadline: it returns one byte
    /// if available, or zero bytes once the deadline passes.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Terminal`] if the attribute query or install
    /// fails (e.g., stdin is not a terminal).
    pub fn enter() -> Result<Self, TermError> {
        use std::os::unix::io::AsRawFd;

        let fd = io::stdin().as_raw_fd();

        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(fd, &raw mut original) } != 0 {
            return Err(TermError::Terminal(io::Error::last_os_error()));
        }

        // Save to the global backup for the panic hook, then arm the hook.
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }
        install_panic_hook();

        let mut raw = original;
        raw.c_iflag &=
            !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

        // VMIN=0, VTIME=1: read() returns after 1 byte or a 100ms timeout
        // with zero bytes. The timeout underlies escape disambiguation.
        raw.c_cc[libc::VMIN] = 0;
        raw.c_cc[libc::VTIME] = 1;

        if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const raw) } != 0 {
            return Err(TermError::Terminal(io::Error::last_os_error()));
        }

        info!("raw mode enabled");
        Ok(Self {
            original: Some(original),
        })
    }

    /// Reinstall the captured original attributes.
    ///
    /// Idempotent: the first effective call restores; later calls no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Terminal`] if the attribute install fails.
    pub fn restore(&mut self) -> Result<(), TermError> {
        use std::os::unix::io::AsRawFd;

        if let Some(ref original) = self.original {
            let fd = io::stdin().as_raw_fd();

            if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, original) } != 0 {
                return Err(TermError::Terminal(io::Error::last_os_error()));
            }

            // Clear the global backup — we've restored successfully.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original = None;
            info!("original terminal attributes restored");
        }

        Ok(())
    }
}

#[cfg(not(unix))]
impl RawModeSession {
    /// Raw mode requires a unix terminal; other platforms always fail.
    ///
    /// # Errors
    ///
    /// Always returns [`TermError::Terminal`].
    pub fn enter() -> Result<Self, TermError> {
        Err(TermError::Terminal(io::Error::new(
            io::ErrorKind::Unsupported,
            "raw mode requires a unix terminal",
        )))
    }

    /// No attributes to restore on non-unix platforms.
    #[allow(clippy::unnecessary_wraps)]
    pub fn restore(&mut self) -> Result<(), TermError> {
        Ok(())
    }
}

impl Drop for RawModeSession {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_is_valid_utf8() {
        std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
    }

    #[test]
    fn emergency_restore_shows_cursor_first() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.starts_with("\x1b[?25h"));
    }

    #[test]
    fn emergency_restore_clears_and_homes() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[2J"), "must clear the screen");
        assert!(s.ends_with("\x1b[H"), "must leave the cursor at home");
    }

    // ── Session lifecycle (only meaningful on a real terminal) ──────

    #[test]
    fn enter_restore_cycle() {
        if !is_tty() {
            return; // CI runs without a controlling terminal.
        }
        let mut session = RawModeSession::enter().unwrap();
        session.restore().unwrap();
        session.restore().unwrap(); // Second call must be a no-op.
    }

    #[test]
    fn drop_restores() {
        if !is_tty() {
            return;
        }
        let session = RawModeSession::enter().unwrap();
        drop(session); // Must not panic; restores via Drop.
    }

    #[test]
    fn enter_fails_off_terminal() {
        if is_tty() {
            return;
        }
        assert!(matches!(
            RawModeSession::enter(),
            Err(TermError::Terminal(_))
        ));
    }
}
