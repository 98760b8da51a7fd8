//! Target size calculation for block-aligned braille rendering.

use super::glyph::{BLOCK_HEIGHT, BLOCK_WIDTH};

/// Calculate the pixel size a frame should be resampled to.
///
/// Every terminal cell holds one 2x4 braille glyph, so the pixel budget is
/// `cols * 2` by `rows * 4`. The source is scaled uniformly by the largest
/// factor that fits that budget (upscaling is allowed), then each axis is
/// floored to a whole number of blocks.
///
/// # Arguments
/// * `source_w` - Width of the source frame in pixels
/// * `source_h` - Height of the source frame in pixels
/// * `cols` - Available terminal columns
/// * `rows` - Available terminal rows
///
/// # Returns
/// `(target_w, target_h)`, multiples of 2 and 4 respectively. Either may be 0
/// when the terminal is too small or the source is degenerate; the renderer
/// produces an empty frame in that case.
///
/// # Example
/// ```ignore
/// // 640x480 into an 80x24 terminal: budget 160x96, scale 0.2
/// assert_eq!(plan(640, 480, 80, 24), (128, 96));
/// ```
pub fn plan(source_w: u32, source_h: u32, cols: u16, rows: u16) -> (u32, u32) {
    if source_w == 0 || source_h == 0 || cols == 0 || rows == 0 {
        return (0, 0);
    }

    let max_w = cols as u32 * BLOCK_WIDTH;
    let max_h = rows as u32 * BLOCK_HEIGHT;

    let scale = f64::min(
        max_w as f64 / source_w as f64,
        max_h as f64 / source_h as f64,
    );

    // Floor to whole pixels first, then to whole blocks. Clamp to the budget
    // in case the float product lands a hair above it.
    let scaled_w = ((source_w as f64 * scale) as u32).min(max_w);
    let scaled_h = ((source_h as f64 * scale) as u32).min(max_h);

    (
        scaled_w / BLOCK_WIDTH * BLOCK_WIDTH,
        scaled_h / BLOCK_HEIGHT * BLOCK_HEIGHT,
    )
}
