//! End-to-end tests for the interactive session state machine.
//!
//! The session runs against scripted input, in-memory frames and a screen
//! that records everything it is asked to show.

use std::collections::VecDeque;
use std::io;

use braille_player::braille::ToneParams;
use braille_player::decoder::{DecodeError, FrameSource, MemorySource};
use braille_player::frame::{PixelFrame, Rgb};
use braille_player::render::{render, RenderMode};
use braille_player::session::{
    CancelToken, Event, EventSource, Mode, Outcome, Screen, Session, SessionConfig, SessionError,
};

struct Script(VecDeque<Event>);

impl Script {
    fn new(events: &[Event]) -> Self {
        Self(events.iter().copied().collect())
    }
}

impl EventSource for Script {
    fn next_event(&mut self) -> io::Result<Event> {
        self.0
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

#[derive(Default)]
struct RecordingScreen {
    size: (u16, u16),
    frames: Vec<String>,
    footers: Vec<Option<String>>,
    progress: Vec<(usize, usize)>,
    /// Cancel once this many frames or progress reports have been seen
    cancel_at: Option<(usize, CancelToken)>,
}

impl RecordingScreen {
    fn with_size(cols: u16, rows: u16) -> Self {
        Self {
            size: (cols, rows),
            ..Default::default()
        }
    }

    fn cancelling_at(mut self, count: usize, token: CancelToken) -> Self {
        self.cancel_at = Some((count, token));
        self
    }

    fn check_cancel(&self, seen: usize) {
        if let Some((count, token)) = &self.cancel_at {
            if seen >= *count {
                token.cancel();
            }
        }
    }
}

impl Screen for RecordingScreen {
    fn size(&mut self) -> io::Result<(u16, u16)> {
        Ok(self.size)
    }

    fn present(&mut self, frame: &str, footer: Option<&str>) -> io::Result<()> {
        self.frames.push(frame.to_string());
        self.footers.push(footer.map(str::to_string));
        self.check_cancel(self.frames.len());
        Ok(())
    }

    fn progress(&mut self, done: usize, total: usize) -> io::Result<()> {
        self.progress.push((done, total));
        self.check_cancel(self.progress.len());
        Ok(())
    }
}

fn config() -> SessionConfig {
    SessionConfig {
        tone: ToneParams::default(),
        fps: 1000,
        reserved_rows: 0,
    }
}

fn frames() -> Vec<PixelFrame> {
    vec![
        PixelFrame::filled(4, 8, Rgb::WHITE),
        PixelFrame::filled(4, 8, Rgb::gray(100)),
        PixelFrame::filled(4, 8, Rgb::BLACK),
    ]
}

/// Mirror of the driver: read the preview frame, then start the session.
fn session(frames: Vec<PixelFrame>, config: SessionConfig) -> Session<MemorySource> {
    let mut source = MemorySource::new(frames);
    let first = source.read_next().unwrap().unwrap();
    Session::new(config, source, first)
}

#[test]
fn test_quit_from_preview() {
    let mut session = session(frames(), config());
    let mut screen = RecordingScreen::with_size(2, 2);
    let outcome = session
        .run(&mut Script::new(&[Event::Quit]), &mut screen)
        .unwrap();

    assert_eq!(outcome, Outcome::Quit);
    assert_eq!(session.state().mode, Mode::Quit);
    assert_eq!(screen.frames.len(), 1);
    assert_eq!(
        screen.frames[0],
        render(&frames()[0], 4, 8, RenderMode::Live)
    );
}

#[test]
fn test_preview_rerenders_after_each_event() {
    let mut session = session(frames(), config());
    let mut screen = RecordingScreen::with_size(2, 2);
    let script = [Event::IncreaseContrast, Event::Other, Event::DecreaseFps, Event::Quit];
    session.run(&mut Script::new(&script), &mut screen).unwrap();

    assert_eq!(screen.frames.len(), 4);
    let footers: Vec<String> = screen.footers.iter().map(|f| f.clone().unwrap()).collect();
    assert!(footers[0].starts_with("Contrast: 1.0 | Brightness: 0.00 | FPS: 1000 | Terminal: 2x2"));
    assert!(footers[1].starts_with("Contrast: 1.1 |"));
    assert!(footers[3].contains("FPS: 999"));
    assert!(footers[0].contains("Enter : play video"));
}

#[test]
fn test_preview_uses_latest_tone() {
    let mut session = session(vec![PixelFrame::filled(2, 4, Rgb::gray(100))], config());
    let mut screen = RecordingScreen::with_size(1, 1);
    let script = [
        Event::IncreaseBrightness,
        Event::IncreaseBrightness,
        Event::IncreaseBrightness,
        Event::IncreaseBrightness,
        Event::IncreaseBrightness,
        Event::IncreaseBrightness,
        Event::Quit,
    ];
    session.run(&mut Script::new(&script), &mut screen).unwrap();

    assert!(screen.frames[0].contains('\u{2800}'));
    // brightness 0.30 lifts 100 to about 176
    assert!(screen.frames.last().unwrap().contains('\u{28FF}'));
}

#[test]
fn test_reserved_rows_shrink_the_grid() {
    let mut config = config();
    config.reserved_rows = 3;
    let mut session = session(frames(), config);
    let mut screen = RecordingScreen::with_size(2, 4);
    session.run(&mut Script::new(&[Event::Quit]), &mut screen).unwrap();

    // One usable row: 4x8 source fits as 2x4 pixels -> one glyph
    assert_eq!(screen.frames[0].matches('\u{28FF}').count(), 1);
    assert!(screen.footers[0].as_ref().unwrap().contains("Terminal: 2x1"));
}

#[test]
fn test_tiny_terminal_previews_empty_frame() {
    let mut config = config();
    config.reserved_rows = 5;
    let mut session = session(frames(), config);
    let mut screen = RecordingScreen::with_size(2, 2);
    session.run(&mut Script::new(&[Event::Quit]), &mut screen).unwrap();
    assert_eq!(screen.frames[0], "");
}

#[test]
fn test_playback_renders_every_frame_from_start() {
    let mut session = session(frames(), config());
    let mut screen = RecordingScreen::with_size(2, 2);
    let outcome = session
        .run(&mut Script::new(&[Event::Confirm]), &mut screen)
        .unwrap();

    assert_eq!(outcome, Outcome::Finished { frames: 3 });
    assert_eq!(session.state().mode, Mode::Playing);
    // preview + three playback frames, starting again at the first frame
    assert_eq!(screen.frames.len(), 4);
    assert_eq!(screen.frames[1], screen.frames[0]);
    assert!(screen.frames[3].contains('\u{2800}'));
    assert!(screen.footers[1..].iter().all(Option::is_none));
}

#[test]
fn test_export_collects_escaped_frames() {
    let mut session = session(frames(), config());
    let mut screen = RecordingScreen::with_size(2, 2);
    let script = [Event::DecreaseFps, Event::StartExport];
    let outcome = session.run(&mut Script::new(&script), &mut screen).unwrap();

    let Outcome::Exported(animation) = outcome else {
        panic!("expected export, got {:?}", outcome);
    };
    assert_eq!(animation.len(), 3);
    // 999 fps
    assert_eq!(animation.frame_delay_us(), 1001);
    for (exported, frame) in animation.frames().iter().zip(frames()) {
        assert_eq!(exported, &render(&frame, 4, 8, RenderMode::Export));
        assert!(!exported.contains('\x1b'));
    }
    assert_eq!(screen.progress, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_export_applies_tone() {
    let mut session = session(vec![PixelFrame::filled(2, 4, Rgb::gray(100))], config());
    let mut screen = RecordingScreen::with_size(1, 1);
    let script = [
        Event::IncreaseContrast,
        Event::IncreaseContrast,
        Event::IncreaseContrast,
        Event::IncreaseContrast,
        Event::StartExport,
    ];
    let Outcome::Exported(animation) = session.run(&mut Script::new(&script), &mut screen).unwrap()
    else {
        panic!("expected export");
    };
    // contrast 1.4 -> 140
    assert_eq!(
        animation.frames()[0],
        "\\033[38;2;140;140;140m\u{28FF}\\033[0m\\n"
    );
}

#[test]
fn test_cancelled_playback_is_interrupted() {
    let token = CancelToken::new();
    let mut session = session(frames(), config()).with_cancel_token(token.clone());
    // preview, then one playback frame
    let mut screen = RecordingScreen::with_size(2, 2).cancelling_at(2, token);
    let outcome = session
        .run(&mut Script::new(&[Event::Confirm]), &mut screen)
        .unwrap();
    assert_eq!(outcome, Outcome::Interrupted { frames: 1 });
    assert_eq!(screen.frames.len(), 2);
}

#[test]
fn test_cancelled_export_is_interrupted() {
    let token = CancelToken::new();
    let mut session = session(frames(), config()).with_cancel_token(token.clone());
    let mut screen = RecordingScreen::with_size(2, 2).cancelling_at(1, token);
    let outcome = session
        .run(&mut Script::new(&[Event::StartExport]), &mut screen)
        .unwrap();
    assert_eq!(outcome, Outcome::Interrupted { frames: 1 });
    assert_eq!(screen.progress, vec![(1, 3)]);
}

#[test]
fn test_cancel_before_start_quits() {
    let token = CancelToken::new();
    token.cancel();
    let mut session = session(frames(), config()).with_cancel_token(token);
    let mut screen = RecordingScreen::with_size(2, 2);
    let outcome = session
        .run(&mut Script::new(&[Event::Confirm]), &mut screen)
        .unwrap();
    assert_eq!(outcome, Outcome::Quit);
    assert_eq!(session.state().mode, Mode::Quit);
    assert!(screen.frames.is_empty());
}

/// Cancels the token as it hands out its only event.
struct CancellingScript {
    event: Event,
    token: CancelToken,
}

impl EventSource for CancellingScript {
    fn next_event(&mut self) -> io::Result<Event> {
        self.token.cancel();
        Ok(self.event)
    }
}

#[test]
fn test_cancel_while_adjusting_overrides_key() {
    let token = CancelToken::new();
    let mut session = session(frames(), config()).with_cancel_token(token.clone());
    let mut screen = RecordingScreen::with_size(2, 2);
    let mut events = CancellingScript {
        event: Event::Confirm,
        token,
    };
    let outcome = session.run(&mut events, &mut screen).unwrap();
    assert_eq!(outcome, Outcome::Quit);
    // only the preview, no playback frames
    assert_eq!(screen.frames.len(), 1);
}

#[test]
fn test_input_failure_is_session_error() {
    let mut session = session(frames(), config());
    let mut screen = RecordingScreen::with_size(2, 2);
    let err = session
        .run(&mut Script::new(&[]), &mut screen)
        .unwrap_err();
    assert!(matches!(err, SessionError::Io(_)));
}

struct FailingRewind(MemorySource);

impl FrameSource for FailingRewind {
    fn read_next(&mut self) -> Result<Option<PixelFrame>, DecodeError> {
        self.0.read_next()
    }

    fn rewind_to_start(&mut self) -> Result<(), DecodeError> {
        Err(DecodeError::FfmpegNotFound("ffmpeg"))
    }

    fn frame_count_hint(&self) -> usize {
        self.0.frame_count_hint()
    }
}

#[test]
fn test_decoder_failure_is_session_error() {
    let mut session = Session::new(
        config(),
        FailingRewind(MemorySource::new(frames())),
        frames()[0].clone(),
    );
    let mut screen = RecordingScreen::with_size(2, 2);
    let err = session
        .run(&mut Script::new(&[Event::Confirm]), &mut screen)
        .unwrap_err();
    assert!(matches!(err, SessionError::Decode(DecodeError::FfmpegNotFound(_))));
}
