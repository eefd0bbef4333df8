//! Tone mapping and pixel packing.
//!
//! Linear radiance is clamped to `[0, 1]`, passed through a transfer
//! curve and packed as `0xAABBGGRR`, which is RGBA8 in little-endian
//! memory order.

use raycast_math::{Color, ColorExt, Interval};
use serde::{Deserialize, Serialize};

/// sRGB linear segment threshold.
const SRGB_LINEAR_CUTOFF: f32 = 0.003_130_8;

/// Transfer curve applied before quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMap {
    /// Square-root approximation of gamma 2.2.
    #[default]
    Gamma2,
    /// Exact sRGB transfer function.
    Srgb,
}

impl ToneMap {
    /// Map one linear channel value to display space.
    #[inline]
    pub fn apply(self, linear: f32) -> f32 {
        match self {
            ToneMap::Gamma2 => linear_to_gamma(linear),
            ToneMap::Srgb => linear_to_srgb(linear),
        }
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// The sRGB transfer function, pre-clamped to `[0, 1]`.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    let x = Interval::UNIT.clamp(linear);
    if x <= SRGB_LINEAR_CUTOFF {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn quantize(channel: f32) -> u32 {
    (Interval::UNIT.clamp(channel) * 255.9) as u32
}

/// Clamp, tone map and pack a linear colour into `0xAABBGGRR` with opaque alpha.
pub fn pack_pixel(color: Color, tone_map: ToneMap) -> u32 {
    let map = |c: f32| quantize(tone_map.apply(Interval::UNIT.clamp(c)));

    let r = map(color.r());
    let g = map(color.g());
    let b = map(color.b());

    0xFF << 24 | b << 16 | g << 8 | r
}

/// Split a packed pixel into `[r, g, b, a]` bytes.
#[inline]
pub fn unpack_pixel(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}
