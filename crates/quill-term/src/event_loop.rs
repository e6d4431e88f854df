// SPDX-License-Identifier: MIT
//
// Event loop — render, read one key, dispatch, repeat.
//
// Single-threaded and synchronous: the only suspension point is the
// bounded-timeout read inside the input decoder. Each cycle renders the
// current state BEFORE reading, and decodes exactly one key — no
// batching of keys per frame, so the screen always reflects the state
// that produced it.
//
// Dispatch in this snapshot: Ctrl-Q clears the screen, homes the cursor,
// and quits (termios restoration happens via the session guard in the
// caller, not here); arrow keys move the wrapping cursor. Every other
// key is a no-op, reserved for future editing commands.

use std::io::Write;

use crate::ansi;
use crate::cursor::{CursorPosition, Direction};
use crate::error::TermError;
use crate::geometry::ScreenGeometry;
use crate::input::{ctrl, ByteSource, InputDecoder, Key};
use crate::render::Renderer;

/// The quit combination: Ctrl-Q.
const QUIT: u8 = ctrl(b'q');

/// What a dispatched key tells the loop to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// The orchestrator: owns the decoder, geometry, cursor, and renderer.
///
/// The raw-mode session guard stays with the caller so restoration is
/// tied to the caller's scope, not to the loop's happy path.
pub struct EventLoop<S> {
    input: InputDecoder<S>,
    geometry: ScreenGeometry,
    cursor: CursorPosition,
    renderer: Renderer,
}

impl<S: ByteSource> EventLoop<S> {
    /// Build a loop over an already-resolved geometry, cursor at the origin.
    pub fn new(input: InputDecoder<S>, geometry: ScreenGeometry) -> Self {
        Self {
            input,
            geometry,
            cursor: CursorPosition::ORIGIN,
            renderer: Renderer::new(),
        }
    }

    /// The resolved geometry this loop renders against.
    #[inline]
    #[must_use]
    pub const fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    /// The current cursor position.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Run until the user quits.
    ///
    /// Returns `Ok(())` on a clean quit; the caller maps that to exit
    /// code 0 and lets its session guard restore the terminal.
    ///
    /// # Errors
    ///
    /// Returns the first fatal [`TermError`] from rendering or input.
    pub fn run(&mut self, out: &mut impl Write) -> Result<(), TermError> {
        loop {
            self.renderer.render(out, self.geometry, self.cursor)?;
            let key = self.input.read_key()?;
            if self.dispatch(key, out)? == Action::Quit {
                return Ok(());
            }
        }
    }

    /// Apply one key to the loop state.
    fn dispatch(&mut self, key: Key, out: &mut impl Write) -> Result<Action, TermError> {
        match key {
            Key::Control(QUIT) => {
                ansi::clear_screen(out)?;
                ansi::cursor_home(out)?;
                out.flush()?;
                Ok(Action::Quit)
            }
            Key::ArrowUp => self.step(Direction::Up),
            Key::ArrowDown => self.step(Direction::Down),
            Key::ArrowLeft => self.step(Direction::Left),
            Key::ArrowRight => self.step(Direction::Right),
            // Printable, control, and Escape keys are reserved for the
            // editing layer that will sit on top of this loop.
            Key::Printable(_) | Key::Control(_) | Key::Escape => Ok(Action::Continue),
        }
    }

    fn step(&mut self, direction: Direction) -> Result<Action, TermError> {
        self.cursor.step(direction, self.geometry);
        Ok(Action::Continue)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
