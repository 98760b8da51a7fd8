//! Braille encoding pipeline for converting video frames to terminal glyphs.
//!
//! Frames flow through these stages before serialization:
//!
//! 1. **Tone adjustment** - contrast/brightness applied per channel
//! 2. **Scaling plan** - target size that fits the terminal grid on 2x4 blocks
//! 3. **Resampling** - box filter down (or up) to the planned size
//! 4. **Glyph encoding** - each 2x4 block becomes one braille code point plus
//!    its average color
//!
//! Serialization into terminal or C-literal text lives in [`crate::render`].

mod dimensions;
pub mod glyph;
mod resample;
mod tone;

pub use dimensions::plan;
pub use glyph::{
    encode, luma, EncodedGlyph, GlyphBlock, BLOCK_HEIGHT, BLOCK_WIDTH, BRAILLE_BASE,
    DEFAULT_THRESHOLD,
};
pub use resample::{resize_area, resize_area_into};
pub use tone::{adjust, adjust_into, ToneParams};
