//! Serialization of frames into colored braille text.
//!
//! A rendered frame is one glyph per terminal cell, each wrapped in a 24-bit
//! foreground color escape and a reset:
//!
//! ```text
//! ESC[38;2;{r};{g};{b}m{glyph}ESC[0m
//! ```
//!
//! Rows end with a separator, including the last row. In [`RenderMode::Live`]
//! the escape is the ESC control byte and the separator a newline; in
//! [`RenderMode::Export`] both are written as the C escapes `\033` and `\n`
//! so the frame can be pasted verbatim into a string literal.

use std::fmt::Write as _;

use crate::braille::{self, GlyphBlock, BLOCK_HEIGHT, BLOCK_WIDTH, DEFAULT_THRESHOLD};
use crate::frame::PixelFrame;

/// Output flavor for a rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Raw escape sequences for direct terminal output
    Live,
    /// Escapes spelled out for embedding in a C string literal
    Export,
}

impl RenderMode {
    fn escape(self) -> &'static str {
        match self {
            RenderMode::Live => "\x1b",
            RenderMode::Export => "\\033",
        }
    }

    fn row_separator(self) -> &'static str {
        match self {
            RenderMode::Live => "\n",
            RenderMode::Export => "\\n",
        }
    }
}

/// Rewrite live output into its export form.
///
/// Replaces each ESC byte with `\033` and each newline with `\n`.
pub fn escape_for_export(live: &str) -> String {
    let mut out = String::with_capacity(live.len() + live.len() / 4);
    for c in live.chars() {
        match c {
            '\x1b' => out.push_str("\\033"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

/// Renders frames while reusing its resample and text buffers.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    scaled: PixelFrame,
    out: String,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `frame` at `target_w` x `target_h` pixels.
    ///
    /// The frame is box-resampled to the target size, tiled into 2x4 blocks
    /// row-major, and each block is encoded at the default threshold. A
    /// target of 0 on either axis yields an empty string.
    ///
    /// The returned slice borrows the internal buffer and is overwritten by
    /// the next call.
    pub fn render(
        &mut self,
        frame: &PixelFrame,
        target_w: u32,
        target_h: u32,
        mode: RenderMode,
    ) -> &str {
        self.out.clear();

        let written = braille::resize_area_into(frame, target_w, target_h, &mut self.scaled.data);
        if written == 0 {
            return &self.out;
        }
        self.scaled.width = target_w;
        self.scaled.height = target_h;

        let cols = (target_w / BLOCK_WIDTH) as usize;
        let rows = (target_h / BLOCK_HEIGHT) as usize;
        // "\033[38;2;255;255;255m" + glyph + "\033[0m" is at most 36 bytes
        self.out.reserve(rows * (cols * 36 + 2));

        let esc = mode.escape();
        let separator = mode.row_separator();

        for by in (0..target_h).step_by(BLOCK_HEIGHT as usize) {
            for bx in (0..target_w).step_by(BLOCK_WIDTH as usize) {
                let block = GlyphBlock::sample(&self.scaled, bx, by);
                let glyph = braille::encode(&block, DEFAULT_THRESHOLD);
                // Writing into a String cannot fail
                let _ = write!(
                    self.out,
                    "{esc}[38;2;{}m{}{esc}[0m",
                    glyph.color, glyph.codepoint
                );
            }
            self.out.push_str(separator);
        }

        &self.out
    }
}

/// Render a single frame into a freshly allocated string.
pub fn render(frame: &PixelFrame, target_w: u32, target_h: u32, mode: RenderMode) -> String {
    FrameRenderer::new()
        .render(frame, target_w, target_h, mode)
        .to_owned()
}
