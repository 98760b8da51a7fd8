//! Interactive session: tune the preview, then play back or export.
//!
//! The session is a small state machine. It starts in [`Mode::Adjusting`],
//! where each input event either tweaks the tone/fps settings or moves to one
//! of the terminal modes. Nothing transitions back to `Adjusting`.
//!
//! Input, output and frame acquisition are injected through the
//! [`EventSource`], [`Screen`] and [`FrameSource`] traits so the whole flow
//! can be driven by scripted events in tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::braille::{self, ToneParams};
use crate::decoder::{DecodeError, FrameSource};
use crate::export::{self, AnimationExport};
use crate::frame::PixelFrame;
use crate::render::{FrameRenderer, RenderMode};

/// Contrast change per adjustment event.
pub const CONTRAST_STEP: f32 = 0.1;

/// Brightness change per adjustment event.
pub const BRIGHTNESS_STEP: f32 = 0.05;

/// Lowest allowed playback rate.
pub const MIN_FPS: u32 = 1;

/// Key help shown under the preview.
pub const HELP: &str = "\
COMMANDS:
  e/d   : contrast +/-
  r/f   : brightness +/-
  t/g   : FPS +/-
  Enter : play video
  s     : export animation
  q     : quit";

/// One user input, already decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Confirm,
    StartExport,
    Quit,
    IncreaseContrast,
    DecreaseContrast,
    IncreaseBrightness,
    DecreaseBrightness,
    IncreaseFps,
    DecreaseFps,
    /// Any input without a binding
    Other,
}

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Adjusting,
    Playing,
    Exporting,
    Quit,
}

/// Settings the session starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub tone: ToneParams,
    pub fps: u32,
    /// Terminal rows kept free below the rendered frame
    pub reserved_rows: u16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tone: ToneParams::default(),
            fps: 24,
            reserved_rows: 3,
        }
    }
}

/// Mutable session settings and the current phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub tone: ToneParams,
    pub fps: u32,
    pub mode: Mode,
}

impl SessionState {
    /// Initial state for a config, with values clamped to their ranges.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            tone: config.tone.clamped(),
            fps: config.fps.max(MIN_FPS),
            mode: Mode::Adjusting,
        }
    }

    /// Apply one event. Events are ignored outside `Adjusting`.
    ///
    /// # Returns
    /// The mode after the event.
    pub fn apply(&mut self, event: Event) -> Mode {
        if self.mode != Mode::Adjusting {
            return self.mode;
        }

        match event {
            Event::Confirm => self.mode = Mode::Playing,
            Event::StartExport => self.mode = Mode::Exporting,
            Event::Quit => self.mode = Mode::Quit,
            Event::IncreaseContrast => self.tone.contrast += CONTRAST_STEP,
            Event::DecreaseContrast => self.tone.contrast -= CONTRAST_STEP,
            Event::IncreaseBrightness => self.tone.brightness += BRIGHTNESS_STEP,
            Event::DecreaseBrightness => self.tone.brightness -= BRIGHTNESS_STEP,
            Event::IncreaseFps => self.fps = self.fps.saturating_add(1),
            Event::DecreaseFps => self.fps = self.fps.saturating_sub(1).max(MIN_FPS),
            Event::Other => {}
        }
        self.tone = self.tone.clamped();

        if self.mode != Mode::Adjusting {
            log::info!(
                "Leaving adjustment: {:?} (contrast {:.1}, brightness {:.2}, {} fps)",
                self.mode,
                self.tone.contrast,
                self.tone.brightness,
                self.fps
            );
        }
        self.mode
    }

    /// Delay between frames during playback.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(MIN_FPS) as f64)
    }

    /// One-line summary shown under the preview.
    pub fn status_line(&self, cols: u16, rows: u16) -> String {
        format!(
            "Contrast: {:.1} | Brightness: {:.2} | FPS: {} | Terminal: {}x{}",
            self.tone.contrast, self.tone.brightness, self.fps, cols, rows
        )
    }
}

/// Source of input events.
pub trait EventSource {
    /// Block until the next event is available.
    fn next_event(&mut self) -> io::Result<Event>;
}

/// Output surface for rendered frames.
pub trait Screen {
    /// Terminal size as `(columns, rows)`.
    fn size(&mut self) -> io::Result<(u16, u16)>;

    /// Clear the screen and show one rendered frame, optionally followed by
    /// footer text.
    fn present(&mut self, frame: &str, footer: Option<&str>) -> io::Result<()>;

    /// Report export progress. `total` is 0 when the frame count is unknown.
    fn progress(&mut self, done: usize, total: usize) -> io::Result<()>;
}

/// Shared flag that stops playback or export between frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// User quit from the adjustment screen
    Quit,
    /// Playback reached the end of the stream
    Finished { frames: usize },
    /// Every frame was encoded for export
    Exported(AnimationExport),
    /// Playback or export was cancelled before the end of the stream
    Interrupted { frames: usize },
}

/// Errors that end a session early.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Drives preview, playback and export over a frame source.
pub struct Session<S> {
    config: SessionConfig,
    state: SessionState,
    source: S,
    preview: PixelFrame,
    renderer: FrameRenderer,
    cancel: CancelToken,
}

impl<S: FrameSource> Session<S> {
    /// Create a session previewing `first_frame`, which the caller has already
    /// read from `source`.
    pub fn new(config: SessionConfig, source: S, first_frame: PixelFrame) -> Self {
        Self {
            state: SessionState::new(&config),
            config,
            source,
            preview: first_frame,
            renderer: FrameRenderer::new(),
            cancel: CancelToken::new(),
        }
    }

    /// Use `token` to interrupt playback and export.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Run the session until it reaches a terminal outcome.
    ///
    /// Cancelling while adjusting ends the session with [`Outcome::Quit`];
    /// cancelling during playback or export gives [`Outcome::Interrupted`].
    pub fn run(
        &mut self,
        events: &mut impl EventSource,
        screen: &mut impl Screen,
    ) -> Result<Outcome, SessionError> {
        loop {
            match self.state.mode {
                Mode::Adjusting if self.cancel.is_cancelled() => {
                    log::info!("Cancelled during adjustment");
                    self.state.apply(Event::Quit);
                }
                Mode::Adjusting => {
                    self.show_preview(screen)?;
                    let event = events.next_event()?;
                    log::debug!("Event {:?}", event);
                    // A cancel raised while waiting wins over the key
                    if !self.cancel.is_cancelled() {
                        self.state.apply(event);
                    }
                }
                Mode::Playing => return self.play(screen),
                Mode::Exporting => return self.export(screen),
                Mode::Quit => return Ok(Outcome::Quit),
            }
        }
    }

    /// Terminal grid available for the frame itself.
    fn grid(&self, screen: &mut impl Screen) -> io::Result<(u16, u16)> {
        let (cols, rows) = screen.size()?;
        Ok((cols, rows.saturating_sub(self.config.reserved_rows)))
    }

    fn show_preview(&mut self, screen: &mut impl Screen) -> io::Result<()> {
        let (cols, rows) = self.grid(screen)?;
        let footer = format!("{}\n{}", self.state.status_line(cols, rows), HELP);

        let toned = braille::adjust(&self.preview, self.state.tone);
        let (w, h) = braille::plan(toned.width, toned.height, cols, rows);
        let text = self.renderer.render(&toned, w, h, RenderMode::Live);
        screen.present(text, Some(&footer))
    }

    /// Tone, scale and render one frame for the current terminal size.
    fn encode(
        &mut self,
        mut frame: PixelFrame,
        screen: &mut impl Screen,
        mode: RenderMode,
    ) -> io::Result<&str> {
        let (cols, rows) = self.grid(screen)?;
        braille::adjust_into(&mut frame, self.state.tone);
        let (w, h) = braille::plan(frame.width, frame.height, cols, rows);
        Ok(self.renderer.render(&frame, w, h, mode))
    }

    fn play(&mut self, screen: &mut impl Screen) -> Result<Outcome, SessionError> {
        self.source.rewind_to_start()?;
        let delay = self.state.frame_delay();
        let mut frames = 0;

        while let Some(frame) = self.source.read_next()? {
            if self.cancel.is_cancelled() {
                log::info!("Playback interrupted after {} frames", frames);
                return Ok(Outcome::Interrupted { frames });
            }
            let text = self.encode(frame, screen, RenderMode::Live)?;
            screen.present(text, None)?;
            frames += 1;
            std::thread::sleep(delay);
        }

        log::info!("Playback finished after {} frames", frames);
        Ok(Outcome::Finished { frames })
    }

    fn export(&mut self, screen: &mut impl Screen) -> Result<Outcome, SessionError> {
        self.source.rewind_to_start()?;
        let total = self.source.frame_count_hint();
        let mut animation = AnimationExport::new(export::frame_delay_us(self.state.fps));

        while let Some(frame) = self.source.read_next()? {
            if self.cancel.is_cancelled() {
                log::info!("Export interrupted after {} frames", animation.len());
                return Ok(Outcome::Interrupted {
                    frames: animation.len(),
                });
            }
            let text = self.encode(frame, screen, RenderMode::Export)?.to_owned();
            animation.push(text);
            screen.progress(animation.len(), total)?;
        }

        log::info!("Encoded {} frames for export", animation.len());
        Ok(Outcome::Exported(animation))
    }
}
