//! Contrast and brightness adjustment.

use std::ops::RangeInclusive;

use crate::frame::PixelFrame;

/// Contrast/brightness applied to every channel before encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneParams {
    /// Channel gain
    pub contrast: f32,
    /// Offset as a fraction of full scale (1.0 adds 255)
    pub brightness: f32,
}

impl ToneParams {
    /// Range contrast is held to by interactive adjustment.
    pub const CONTRAST_RANGE: RangeInclusive<f32> = 0.1..=3.0;

    /// Range brightness is held to by interactive adjustment.
    pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = -1.0..=1.0;

    /// Build params clamped to the practical ranges.
    pub fn new(contrast: f32, brightness: f32) -> Self {
        Self {
            contrast,
            brightness,
        }
        .clamped()
    }

    /// Copy of `self` with both fields clamped to their ranges. A non-finite
    /// field falls back to its default.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            contrast: clamp_finite(self.contrast, defaults.contrast, &Self::CONTRAST_RANGE),
            brightness: clamp_finite(
                self.brightness,
                defaults.brightness,
                &Self::BRIGHTNESS_RANGE,
            ),
        }
    }

    /// True when the params leave every channel unchanged.
    pub fn is_identity(&self) -> bool {
        self.contrast == 1.0 && self.brightness == 0.0
    }

    /// Precompute `clamp(v * contrast + brightness * 255, 0, 255)` for all
    /// 256 channel values, rounded to nearest.
    fn lookup_table(&self) -> [u8; 256] {
        let offset = self.brightness * 255.0;
        let mut lut = [0u8; 256];
        for (v, out) in lut.iter_mut().enumerate() {
            let adjusted = v as f32 * self.contrast + offset;
            *out = adjusted.round().clamp(0.0, 255.0) as u8;
        }
        lut
    }
}

impl Default for ToneParams {
    fn default() -> Self {
        Self {
            contrast: 1.0,
            brightness: 0.0,
        }
    }
}

fn clamp_finite(value: f32, fallback: f32, range: &RangeInclusive<f32>) -> f32 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

/// Apply tone params to a frame, returning a new frame.
pub fn adjust(frame: &PixelFrame, params: ToneParams) -> PixelFrame {
    let mut out = frame.clone();
    adjust_into(&mut out, params);
    out
}

/// Apply tone params to a frame in place.
pub fn adjust_into(frame: &mut PixelFrame, params: ToneParams) {
    if params.is_identity() {
        return;
    }
    let lut = params.lookup_table();
    for channel in frame.data.iter_mut() {
        *channel = lut[*channel as usize];
    }
}
