//! Terminal collaborators - raw-mode key input and frame output.

mod keys;
mod raw_mode;
mod screen;

pub use keys::{map_key, KeyEvents};
pub use raw_mode::RawModeGuard;
pub use screen::{ConsoleScreen, FALLBACK_SIZE};
