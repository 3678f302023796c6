//! # Pixel Color
//!
//! 8-bit RGB color with the brightness math used by the compositor.
//!
//! `ColorRGB` is `Pod`, so a finalized frame buffer can be handed to a
//! driver as raw bytes with `bytemuck::cast_slice`.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel RGB color.
///
/// Serializes as a packed `0xRRGGBB` integer so configuration files can
/// write `color = 0xCC2200`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
#[repr(C)]
pub struct ColorRGB {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl ColorRGB {
    /// Black (all channels off).
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// White (all channels full).
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks a `0xRRGGBB` value. The top byte is ignored.
    #[inline]
    #[must_use]
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Packs the color as `0xRRGGBB`.
    #[inline]
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Returns true when every channel is zero.
    #[inline]
    #[must_use]
    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Scales every channel by `ratio / 256` with a `+1` bias, so a
    /// ratio of 255 is the identity and 0 is (almost) black.
    #[inline]
    #[must_use]
    pub const fn dim(self, ratio: u8) -> Self {
        let scale = ratio as u16 + 1;
        Self {
            r: ((self.r as u16 * scale) >> 8) as u8,
            g: ((self.g as u16 * scale) >> 8) as u8,
            b: ((self.b as u16 * scale) >> 8) as u8,
        }
    }

    /// Linear interpolation towards `to`. `t` is clamped to `[0, 1]`.
    #[must_use]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| -> u8 {
            let a = f32::from(a);
            (a + (f32::from(b) - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r, to.r),
            g: mix(self.g, to.g),
            b: mix(self.b, to.b),
        }
    }

    /// Converts an HSV triple (all channels `0..=255`) to RGB.
    ///
    /// The hue circle is split into six regions of 43 steps.
    #[must_use]
    pub const fn from_hsv(hue: u8, saturation: u8, value: u8) -> Self {
        if saturation == 0 {
            return Self::new(value, value, value);
        }

        let h = hue as u16;
        let s = saturation as u16;
        let v = value as u16;

        let region = h / 43;
        let remainder = (h - region * 43) * 6;

        let p = ((v * (255 - s)) >> 8) as u8;
        let q = ((v * (255 - ((s * remainder) >> 8))) >> 8) as u8;
        let t = ((v * (255 - ((s * (255 - remainder)) >> 8))) >> 8) as u8;
        let v = value;

        match region {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }

    /// Converts to an HSV triple on the same `0..=255` scale as
    /// `from_hsv`.
    #[must_use]
    pub fn to_hsv(self) -> (u8, u8, u8) {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        if max == 0 {
            return (0, 0, 0);
        }
        let delta = i32::from(max - min);
        let saturation = (255 * delta / i32::from(max)) as u8;
        if delta == 0 {
            return (0, 0, max);
        }

        let (r, g, b) = (i32::from(self.r), i32::from(self.g), i32::from(self.b));
        let hue = if max == self.r {
            43 * (g - b) / delta
        } else if max == self.g {
            85 + 43 * (b - r) / delta
        } else {
            171 + 43 * (r - g) / delta
        };
        (hue.rem_euclid(256) as u8, saturation, max)
    }
}

impl From<u32> for ColorRGB {
    fn from(packed: u32) -> Self {
        Self::from_u32(packed)
    }
}

impl From<ColorRGB> for u32 {
    fn from(color: ColorRGB) -> Self {
        color.to_u32()
    }
}
