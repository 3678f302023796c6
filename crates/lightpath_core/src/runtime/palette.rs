//! # Palettes
//!
//! A palette is a gradient: colors pinned at positions in `[0, 1]`, with
//! a wrap mode deciding what happens outside that range. Lists sample
//! their palette by light index.

use lightpath_procedural::Random;
use lightpath_shared::ColorRGB;
use serde::{Deserialize, Serialize};

/// How a palette is sampled outside `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Black outside the range.
    NoWrap,
    /// Hold the end colors.
    #[default]
    ClampToEdge,
    /// Restart from the first color.
    Repeat,
    /// Walk back and forth.
    RepeatMirror,
}

/// A color gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Gradient stops.
    pub colors: Vec<ColorRGB>,
    /// Stop positions in `[0, 1]`, ascending. Empty spreads the colors
    /// evenly.
    #[serde(default)]
    pub positions: Vec<f32>,
    /// Sampling outside `[0, 1]`.
    #[serde(default)]
    pub wrap: WrapMode,
}

impl Palette {
    /// Creates an evenly spread palette.
    #[must_use]
    pub fn new(colors: Vec<ColorRGB>) -> Self {
        Self {
            colors,
            positions: Vec::new(),
            wrap: WrapMode::ClampToEdge,
        }
    }

    /// Pins the stops at explicit positions.
    #[must_use]
    pub fn with_positions(mut self, positions: Vec<f32>) -> Self {
        self.positions = positions;
        self
    }

    /// Sets the wrap mode.
    #[must_use]
    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    fn position(&self, index: usize) -> f32 {
        match self.positions.get(index) {
            Some(position) => *position,
            None if self.colors.len() > 1 => index as f32 / (self.colors.len() - 1) as f32,
            None => 0.0,
        }
    }

    /// Color at `perc` along the gradient.
    #[must_use]
    pub fn color_at(&self, perc: f32) -> ColorRGB {
        let Some(first) = self.colors.first().copied() else {
            return ColorRGB::BLACK;
        };

        let perc = match self.wrap {
            WrapMode::NoWrap if !(0.0..=1.0).contains(&perc) => return ColorRGB::BLACK,
            WrapMode::NoWrap | WrapMode::ClampToEdge => perc.clamp(0.0, 1.0),
            WrapMode::Repeat => perc.rem_euclid(1.0),
            WrapMode::RepeatMirror => {
                let folded = perc.rem_euclid(2.0);
                if folded > 1.0 {
                    2.0 - folded
                } else {
                    folded
                }
            }
        };

        if perc <= self.position(0) {
            return first;
        }
        for index in 1..self.colors.len() {
            let (start, end) = (self.position(index - 1), self.position(index));
            if perc <= end {
                let span = end - start;
                let t = if span > f32::EPSILON {
                    (perc - start) / span
                } else {
                    1.0
                };
                return self.colors[index - 1].lerp(self.colors[index], t);
            }
        }
        self.colors[self.colors.len() - 1]
    }
}

const fn rgb(packed: u32) -> ColorRGB {
    ColorRGB::from_u32(packed)
}

/// Built-in gradients, selectable by index.
const BUILT_IN: [&[ColorRGB]; 6] = [
    &[rgb(0xFF_0000), rgb(0xFF_8800), rgb(0xFF_FF00)],
    &[rgb(0x00_22FF), rgb(0x00_CCFF), rgb(0xFF_FFFF)],
    &[rgb(0x22_FF00), rgb(0x00_FF88), rgb(0x00_88FF)],
    &[rgb(0xFF_00AA), rgb(0x88_00FF), rgb(0x22_00FF)],
    &[rgb(0xFF_FFFF), rgb(0xFF_CC88), rgb(0xFF_6600)],
    &[rgb(0xFF_0000), rgb(0x00_FF00), rgb(0x00_00FF), rgb(0xFF_0000)],
];

/// Number of built-in palettes.
#[must_use]
pub const fn palette_count() -> usize {
    BUILT_IN.len()
}

/// Built-in palette `index`, wrapping around the table.
#[must_use]
pub fn palette_at(index: usize) -> Palette {
    Palette::new(BUILT_IN[index % BUILT_IN.len()].to_vec())
}

/// A random saturated color within the configured HSV ranges.
pub fn random_color(random: &mut Random) -> ColorRGB {
    let hue = random.random_hue();
    let saturation = random.random_saturation();
    let value = random.random_value();
    ColorRGB::from_hsv(hue, saturation, value)
}
