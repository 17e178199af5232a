// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Operator cancellation.
//!
//! Cancellation can be observed in three places: the Ctrl-C signal itself,
//! a terminal prompt that swallowed the keystroke, or a child process that
//! got killed by it. All of them end up in [`acknowledge`], which tells the
//! operator and exits successfully exactly once.

use std::{
    io::Write,
    process::exit,
    sync::atomic::{AtomicBool, Ordering},
    thread,
};
use tokio::task::JoinHandle;
use tracing::debug;

static ACKNOWLEDGED: AtomicBool = AtomicBool::new(false);

/// Listen for Ctrl-C for the rest of the process.
///
/// Must be called from within a tokio runtime, before any prompting starts.
/// The handler is installed by the time this returns.
///
/// # Errors
///
/// - Return [`std::io::Error`] if the signal handler cannot be installed.
#[cfg(unix)]
pub fn listen() -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        if interrupts.recv().await.is_some() {
            acknowledge();
        }
        debug!("interrupt stream closed");
    }))
}

/// Listen for Ctrl-C for the rest of the process.
///
/// Must be called from within a tokio runtime, before any prompting starts.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn listen() -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => acknowledge(),
            Err(error) => debug!("cannot listen for interrupts: {error}"),
        }
    }))
}

/// Acknowledge operator cancellation, and exit cleanly.
///
/// Later callers never print or exit a second time. They park until the
/// first caller has taken the process down.
pub fn acknowledge() -> ! {
    if ACKNOWLEDGED.swap(true, Ordering::SeqCst) {
        loop {
            thread::park();
        }
    }

    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "\nInterrupted by user");
    let _ = stdout.flush();
    exit(0)
}
