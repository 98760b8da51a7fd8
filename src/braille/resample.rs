//! Area (box filter) resampling of RGB frames.

use crate::frame::PixelFrame;

/// Source pixel span `[start, end)` covered by destination index `i`.
///
/// When upscaling a destination pixel can fall strictly inside one source
/// pixel; the span is widened to that single pixel so every destination
/// pixel has at least one sample.
#[inline]
fn span(i: u32, src: u32, dst: u32) -> (u32, u32) {
    let start = (i as u64 * src as u64 / dst as u64) as u32;
    let end = ((i as u64 + 1) * src as u64 / dst as u64) as u32;
    let start = start.min(src - 1);
    (start, end.clamp(start + 1, src))
}

/// Resample a frame to exactly `width` x `height` using a box filter.
///
/// Each destination pixel is the rounded mean of the source pixels whose
/// area it covers. Resampling to the frame's own size is the identity.
pub fn resize_area(frame: &PixelFrame, width: u32, height: u32) -> PixelFrame {
    let mut data = Vec::new();
    if resize_area_into(frame, width, height, &mut data) == 0 {
        return PixelFrame {
            data,
            width: 0,
            height: 0,
        };
    }
    PixelFrame {
        data,
        width,
        height,
    }
}

fn is_degenerate(frame: &PixelFrame, width: u32, height: u32) -> bool {
    frame.is_empty() || width == 0 || height == 0
}

/// Resample into an existing buffer to avoid per-frame allocation.
///
/// # Returns
/// The number of bytes written to `buffer` (`width * height * 3`, or 0 when
/// either the source or the target is empty).
pub fn resize_area_into(frame: &PixelFrame, width: u32, height: u32, buffer: &mut Vec<u8>) -> usize {
    buffer.clear();

    if is_degenerate(frame, width, height) {
        return 0;
    }

    let output_size = PixelFrame::byte_len(width, height);
    buffer.reserve(output_size);

    if width == frame.width && height == frame.height {
        buffer.extend_from_slice(&frame.data);
        return output_size;
    }

    let row_stride = frame.width as usize * PixelFrame::BYTES_PER_PIXEL;

    for ty in 0..height {
        let (y0, y1) = span(ty, frame.height, height);
        for tx in 0..width {
            let (x0, x1) = span(tx, frame.width, width);

            let mut sum = [0u64; 3];
            for sy in y0..y1 {
                let row = sy as usize * row_stride;
                for sx in x0..x1 {
                    let idx = row + sx as usize * PixelFrame::BYTES_PER_PIXEL;
                    sum[0] += frame.data[idx] as u64;
                    sum[1] += frame.data[idx + 1] as u64;
                    sum[2] += frame.data[idx + 2] as u64;
                }
            }

            let count = (x1 - x0) as u64 * (y1 - y0) as u64;
            for channel in sum {
                buffer.push(((channel + count / 2) / count) as u8);
            }
        }
    }

    output_size
}
