//! Scoped raw mode for single keystroke reads.

use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// True while a key read holds the terminal in raw mode.
static IN_RAW_MODE: AtomicBool = AtomicBool::new(false);

static PANIC_HOOK: Once = Once::new();

/// Holds raw mode for the duration of one key read.
///
/// Call [`RawModeGuard::finish`] to restore cooked mode and see the error;
/// dropping the guard restores it silently.
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    /// Switch the terminal to raw mode.
    ///
    /// # Errors
    /// Fails when stdin is not a terminal.
    pub fn enter() -> io::Result<Self> {
        PANIC_HOOK.call_once(|| {
            let previous = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                restore();
                previous(info);
            }));
        });

        enable_raw_mode()?;
        IN_RAW_MODE.store(true, Ordering::SeqCst);
        Ok(Self { _private: () })
    }

    /// Restore cooked mode, reporting failure.
    pub fn finish(self) -> io::Result<()> {
        let was_raw = IN_RAW_MODE.swap(false, Ordering::SeqCst);
        std::mem::forget(self);
        if was_raw {
            disable_raw_mode()?;
        }
        Ok(())
    }

    /// Whether the terminal is currently held in raw mode.
    pub fn is_active() -> bool {
        IN_RAW_MODE.load(Ordering::SeqCst)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        restore();
    }
}

fn restore() {
    if IN_RAW_MODE.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_round_trip_on_tty() {
        // Needs a real terminal
        let Ok(guard) = RawModeGuard::enter() else {
            return;
        };
        assert!(RawModeGuard::is_active());
        guard.finish().unwrap();
        assert!(!RawModeGuard::is_active());
    }
}
