//! Interrupt handling
//!
//! Ctrl+C sets a process-wide flag which the menu polls between reads, so
//! the session can close its connection and exit cleanly. A second Ctrl+C
//! exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::status::ExitStatus;

/// Global flag for Ctrl+C interrupt handling
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

/// Check if the application was interrupted (Ctrl+C pressed)
#[inline]
pub fn was_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Set the interrupted flag (called from signal handler)
#[inline]
pub fn set_interrupted() {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Reset the interrupted flag
#[inline]
pub fn reset_interrupted() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Register the Ctrl+C handler.
pub fn install() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        // Second press exits without cleanup.
        if was_interrupted() {
            std::process::exit(ExitStatus::Interrupted as i32);
        }
        set_interrupted();
        eprintln!("\nInterrupted");
    })
}
