//! # Random Source
//!
//! Seeded pseudo-random stream plus the value ranges used when the
//! engine invents an emission on its own (auto-emit, random colors).
//!
//! All draws come from one `ChaCha8Rng`, so a run is reproducible from
//! its seed. Ranges are half-open: `min + uniform(0..max-min)`, with an
//! empty range collapsing to `min`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Value ranges for randomly generated emissions.
///
/// Loaded from the `[random]` table of the engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomRanges {
    /// Slowest random speed (pixels per frame).
    pub min_speed: f32,
    /// Fastest random speed (pixels per frame).
    pub max_speed: f32,
    /// Shortest random duration in milliseconds.
    pub min_duration_ms: u32,
    /// Longest random duration in milliseconds.
    pub max_duration_ms: u32,
    /// Shortest random list length.
    pub min_length: u16,
    /// Longest random list length.
    pub max_length: u16,
    /// Lowest random saturation.
    pub min_saturation: u8,
    /// Highest random saturation.
    pub max_saturation: u8,
    /// Lowest random value (HSV brightness).
    pub min_value: u8,
    /// Highest random value (HSV brightness).
    pub max_value: u8,
    /// Shortest wait before the next auto-emission, in milliseconds.
    pub min_next_emit_ms: u32,
    /// Longest wait before the next auto-emission, in milliseconds.
    pub max_next_emit_ms: u32,
}

impl Default for RandomRanges {
    fn default() -> Self {
        Self {
            min_speed: 0.5,
            max_speed: 10.0,
            min_duration_ms: 120 * 16,
            max_duration_ms: 1440 * 16,
            min_length: 1,
            max_length: 100,
            min_saturation: 178,
            max_saturation: 255,
            min_value: 178,
            max_value: 255,
            min_next_emit_ms: 2_000,
            max_next_emit_ms: 20_000,
        }
    }
}

/// The engine's random stream.
#[derive(Clone, Debug)]
pub struct Random {
    rng: ChaCha8Rng,
    ranges: RandomRanges,
}

impl Random {
    /// Creates a stream from a seed and value ranges.
    #[must_use]
    pub fn new(seed: u64, ranges: RandomRanges) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            ranges,
        }
    }

    /// Creates a stream with the default ranges.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::new(seed, RandomRanges::default())
    }

    /// The configured ranges.
    #[inline]
    #[must_use]
    pub fn ranges(&self) -> &RandomRanges {
        &self.ranges
    }

    /// Uniform integer in `[0, bound)`; `0` when the bound is zero.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            0
        } else {
            self.rng.gen_range(0..bound)
        }
    }

    /// Uniform float in `[0, bound)`; `0.0` when the bound is not positive.
    pub fn below_f32(&mut self, bound: f32) -> f32 {
        if bound > 0.0 {
            self.rng.gen::<f32>() * bound
        } else {
            0.0
        }
    }

    /// Random speed in `[min_speed, max_speed)`.
    pub fn random_speed(&mut self) -> f32 {
        let span = (self.ranges.max_speed - self.ranges.min_speed).max(0.0);
        self.ranges.min_speed + self.below_f32(span)
    }

    /// Random duration in milliseconds.
    pub fn random_duration(&mut self) -> u32 {
        let span = self
            .ranges
            .max_duration_ms
            .saturating_sub(self.ranges.min_duration_ms);
        self.ranges.min_duration_ms + self.below(span)
    }

    /// Random list length.
    pub fn random_length(&mut self) -> u16 {
        let span = self.ranges.max_length.saturating_sub(self.ranges.min_length);
        self.ranges.min_length + self.below(u32::from(span)) as u16
    }

    /// Random hue over the full circle.
    pub fn random_hue(&mut self) -> u8 {
        self.below(256) as u8
    }

    /// Random saturation.
    pub fn random_saturation(&mut self) -> u8 {
        let span = self.ranges.max_saturation.saturating_sub(self.ranges.min_saturation);
        self.ranges.min_saturation + self.below(u32::from(span)) as u8
    }

    /// Random HSV value.
    pub fn random_value(&mut self) -> u8 {
        let span = self.ranges.max_value.saturating_sub(self.ranges.min_value);
        self.ranges.min_value + self.below(u32::from(span)) as u8
    }

    /// Random wait before the next auto-emission, in milliseconds.
    pub fn random_next_emit(&mut self) -> u32 {
        let span = self
            .ranges
            .max_next_emit_ms
            .saturating_sub(self.ranges.min_next_emit_ms);
        self.ranges.min_next_emit_ms + self.below(span)
    }
}
