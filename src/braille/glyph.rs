//! Block sampling and braille glyph encoding.
//!
//! Each braille character represents a 2x4 dot matrix, so one glyph covers
//! 8 subpixels of the resampled frame. Dot bit positions follow the
//! column-major layout `bit = dy + dx * 4`:
//! ```text
//! dx=0    dx=1
//! bit 0   bit 4   dy=0
//! bit 1   bit 5   dy=1
//! bit 2   bit 6   dy=2
//! bit 3   bit 7   dy=3
//! ```

use crate::frame::{PixelFrame, Rgb};

/// Braille base character (U+2800, empty braille pattern).
pub const BRAILLE_BASE: char = '\u{2800}';

/// Width of a glyph block in pixels.
pub const BLOCK_WIDTH: u32 = 2;

/// Height of a glyph block in pixels.
pub const BLOCK_HEIGHT: u32 = 4;

/// Luma above which a subpixel becomes a raised dot.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// A 2x4 group of pixels, indexed `pixels[dx][dy]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GlyphBlock {
    pub pixels: [[Rgb; 4]; 2],
}

impl GlyphBlock {
    /// A block where every subpixel has the same color.
    pub fn uniform(color: Rgb) -> Self {
        Self {
            pixels: [[color; 4]; 2],
        }
    }

    /// Sample the block whose top-left corner is at `(x, y)`.
    ///
    /// The block must lie fully inside the frame: `x + 2 <= width` and
    /// `y + 4 <= height`. Planned target sizes are always multiples of the
    /// block size, so tiling a resampled frame never violates this.
    pub fn sample(frame: &PixelFrame, x: u32, y: u32) -> Self {
        debug_assert!(x + BLOCK_WIDTH <= frame.width && y + BLOCK_HEIGHT <= frame.height);
        let mut pixels = [[Rgb::BLACK; 4]; 2];
        for (dx, column) in pixels.iter_mut().enumerate() {
            for (dy, px) in column.iter_mut().enumerate() {
                *px = frame.pixel(x + dx as u32, y + dy as u32);
            }
        }
        Self { pixels }
    }
}

/// One encoded block: a braille code point and the block's mean color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedGlyph {
    pub codepoint: char,
    pub color: Rgb,
}

impl EncodedGlyph {
    /// The dot mask this glyph encodes.
    pub fn mask(&self) -> u8 {
        (self.codepoint as u32 - BRAILLE_BASE as u32) as u8
    }
}

/// ITU-R BT.601 luma scaled by 1000 (0..=255_000).
///
/// Integer coefficients keep the threshold comparison exact:
/// `0.299*R + 0.587*G + 0.114*B > t` iff `luma_milli > t * 1000`.
#[inline]
fn luma_milli(px: Rgb) -> u32 {
    299 * px.r as u32 + 587 * px.g as u32 + 114 * px.b as u32
}

/// Luma of a pixel on the 0-255 scale, truncated.
pub fn luma(px: Rgb) -> u8 {
    (luma_milli(px) / 1000) as u8
}

/// Map an 8-bit dot mask to its braille character.
pub fn mask_to_braille(mask: u8) -> char {
    char::from_u32(BRAILLE_BASE as u32 + mask as u32).unwrap_or(BRAILLE_BASE)
}

/// Encode a block into a braille glyph.
///
/// A dot is raised when the subpixel luma is strictly greater than
/// `threshold`; a luma equal to the threshold stays dark. The color is the
/// truncated channel-wise mean of all 8 subpixels.
pub fn encode(block: &GlyphBlock, threshold: u8) -> EncodedGlyph {
    let limit = threshold as u32 * 1000;
    let mut mask = 0u8;
    let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);

    for (dx, column) in block.pixels.iter().enumerate() {
        for (dy, px) in column.iter().enumerate() {
            if luma_milli(*px) > limit {
                mask |= 1 << (dy + dx * 4);
            }
            r += px.r as u32;
            g += px.g as u32;
            b += px.b as u32;
        }
    }

    EncodedGlyph {
        codepoint: mask_to_braille(mask),
        color: Rgb::new((r / 8) as u8, (g / 8) as u8, (b / 8) as u8),
    }
}
