// SPDX-License-Identifier: MIT
//
// quill — a terminal-native screen editor core.
//
// This binary wires the quill-term crate into a running program:
//
//   session  → raw mode with guaranteed restoration
//   geometry → resolved once at startup (ioctl, then escape fallback)
//   input    → byte stream decoded into logical keys
//   loop     → render one frame, read one key, dispatch
//
// Keys in this snapshot: arrows move the wrapping cursor, Ctrl-Q quits.
// Everything else is reserved for the editing layer to come.
//
// Diagnostics go to a log file, never to the raw-mode terminal — a
// stray println! would be drawn straight into the frame.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Mutex;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use quill_term::event_loop::EventLoop;
use quill_term::geometry;
use quill_term::input::{InputDecoder, TtySource};
use quill_term::session::RawModeSession;

fn main() {
    init_logging();

    if let Err(err) = run() {
        // The session guard has already restored cooked mode by the time
        // run() returns; leave the screen blank and the cursor home so
        // the report below is readable.
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x1b[2J\x1b[H");
        let _ = stdout.flush();

        eprintln!("quill: {err:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let session = RawModeSession::enter().context("failed to enter raw mode")?;

    let mut stdout = io::stdout();
    let mut input = InputDecoder::new(TtySource::new());

    let geometry = geometry::probe(&mut input, &mut stdout)
        .context("failed to resolve screen geometry")?;
    info!(rows = geometry.rows, cols = geometry.cols, "session started");

    let mut event_loop = EventLoop::new(input, geometry);
    event_loop.run(&mut stdout)?;

    drop(session); // Restore cooked mode before a clean exit.
    info!("clean exit");
    Ok(())
}

/// Initialize file-backed logging under `$HOME/.quill/`.
///
/// Best-effort: with no home directory or an unwritable log path the
/// editor simply runs unlogged. `RUST_LOG` overrides the default `info`
/// filter.
fn init_logging() {
    let Some(home) = std::env::var_os("HOME").map(PathBuf::from) else {
        return;
    };

    let dir = home.join(".quill");
    let _ = std::fs::create_dir_all(&dir);

    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("quill.log"))
    else {
        return;
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
