//! Keyboard input mapped to session events.

use std::io;

use crossterm::event::{self, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::raw_mode::RawModeGuard;
use crate::session::{Event, EventSource};

/// Map a key press to a session event.
///
/// Bindings:
/// - Enter: play
/// - s: export
/// - q, Esc, Ctrl+C: quit
/// - e/d: contrast up/down
/// - r/f: brightness up/down
/// - t/g: FPS up/down
pub fn map_key(event: KeyEvent) -> Event {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') | KeyCode::Char('C') => Event::Quit,
            _ => Event::Other,
        };
    }

    match code {
        KeyCode::Enter => Event::Confirm,
        KeyCode::Esc => Event::Quit,
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            's' => Event::StartExport,
            'q' => Event::Quit,
            'e' => Event::IncreaseContrast,
            'd' => Event::DecreaseContrast,
            'r' => Event::IncreaseBrightness,
            'f' => Event::DecreaseBrightness,
            't' => Event::IncreaseFps,
            'g' => Event::DecreaseFps,
            _ => Event::Other,
        },
        _ => Event::Other,
    }
}

/// Reads one keystroke per event from the controlling terminal.
///
/// Raw mode is held only while waiting for the key, so output written
/// between events keeps normal newline handling.
#[derive(Debug, Default)]
pub struct KeyEvents;

impl KeyEvents {
    pub fn new() -> Self {
        Self
    }
}

impl EventSource for KeyEvents {
    fn next_event(&mut self) -> io::Result<Event> {
        let guard = RawModeGuard::enter()?;
        let result = loop {
            match event::read()? {
                event::Event::Key(key) if key.kind == KeyEventKind::Press => break map_key(key),
                // Redraw the preview at the new size
                event::Event::Resize(_, _) => break Event::Other,
                _ => {}
            }
        };
        guard.finish()?;
        Ok(result)
    }
}
