//! Easing curves.
//!
//! Every curve maps `t` in `[0, 1]` onto `[0, 1]` (back and elastic
//! overshoot in between). Curves are addressable by a stable numeric id
//! so emission commands can name them compactly.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Easing curve.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Ease {
    /// No easing (identity).
    #[default]
    None = 0,
    /// Linear.
    LinearIn = 1,
    /// Linear.
    LinearOut = 2,
    /// Linear.
    LinearInOut = 3,
    /// Sine ease-in.
    SineIn = 4,
    /// Sine ease-out.
    SineOut = 5,
    /// Sine ease-in-out.
    SineInOut = 6,
    /// Circular ease-in.
    CircularIn = 7,
    /// Circular ease-out.
    CircularOut = 8,
    /// Circular ease-in-out.
    CircularInOut = 9,
    /// Quadratic ease-in.
    QuadraticIn = 10,
    /// Quadratic ease-out.
    QuadraticOut = 11,
    /// Quadratic ease-in-out.
    QuadraticInOut = 12,
    /// Cubic ease-in.
    CubicIn = 13,
    /// Cubic ease-out.
    CubicOut = 14,
    /// Cubic ease-in-out.
    CubicInOut = 15,
    /// Quartic ease-in.
    QuarticIn = 16,
    /// Quartic ease-out.
    QuarticOut = 17,
    /// Quartic ease-in-out.
    QuarticInOut = 18,
    /// Quintic ease-in.
    QuinticIn = 19,
    /// Quintic ease-out.
    QuinticOut = 20,
    /// Quintic ease-in-out.
    QuinticInOut = 21,
    /// Exponential ease-in (accelerating).
    ExponentialIn = 22,
    /// Exponential ease-out (sharp snap to target).
    ExponentialOut = 23,
    /// Exponential ease-in-out.
    ExponentialInOut = 24,
    /// Back ease-in (pulls back before leaving).
    BackIn = 25,
    /// Back ease-out (overshoots the target).
    BackOut = 26,
    /// Back ease-in-out.
    BackInOut = 27,
    /// Bounce ease-in.
    BounceIn = 28,
    /// Bounce ease-out.
    BounceOut = 29,
    /// Bounce ease-in-out.
    BounceInOut = 30,
    /// Elastic ease-in.
    ElasticIn = 31,
    /// Elastic ease-out.
    ElasticOut = 32,
    /// Elastic ease-in-out.
    ElasticInOut = 33,
}

impl Ease {
    /// Every curve, indexed by id.
    pub const ALL: [Self; 34] = [
        Self::None,
        Self::LinearIn,
        Self::LinearOut,
        Self::LinearInOut,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::CircularIn,
        Self::CircularOut,
        Self::CircularInOut,
        Self::QuadraticIn,
        Self::QuadraticOut,
        Self::QuadraticInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuarticIn,
        Self::QuarticOut,
        Self::QuarticInOut,
        Self::QuinticIn,
        Self::QuinticOut,
        Self::QuinticInOut,
        Self::ExponentialIn,
        Self::ExponentialOut,
        Self::ExponentialInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
    ];

    /// Looks a curve up by its numeric id.
    #[inline]
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.get(usize::from(id)).copied()
    }

    /// Numeric id of the curve.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Applies the curve to `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::None | Self::LinearIn | Self::LinearOut | Self::LinearInOut => t,
            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Self::CircularIn => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::CircularOut => (1.0 - (t - 1.0) * (t - 1.0)).max(0.0).sqrt(),
            Self::CircularInOut => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Self::QuadraticIn => power_in(t, 2),
            Self::QuadraticOut => power_out(t, 2),
            Self::QuadraticInOut => power_in_out(t, 2),
            Self::CubicIn => power_in(t, 3),
            Self::CubicOut => power_out(t, 3),
            Self::CubicInOut => power_in_out(t, 3),
            Self::QuarticIn => power_in(t, 4),
            Self::QuarticOut => power_out(t, 4),
            Self::QuarticInOut => power_in_out(t, 4),
            Self::QuinticIn => power_in(t, 5),
            Self::QuinticOut => power_out(t, 5),
            Self::QuinticInOut => power_in_out(t, 5),
            Self::ExponentialIn => {
                if t <= 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
            Self::ExponentialOut => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2.0_f32.powf(-10.0 * t)
                }
            }
            Self::ExponentialInOut => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            Self::BackIn => {
                const C1: f32 = 1.701_58;
                (C1 + 1.0) * t * t * t - C1 * t * t
            }
            Self::BackOut => {
                const C1: f32 = 1.701_58;
                let u = t - 1.0;
                1.0 + (C1 + 1.0) * u * u * u + C1 * u * u
            }
            Self::BackInOut => {
                const C2: f32 = 1.701_58 * 1.525;
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((C2 + 1.0) * 2.0 * t - C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((C2 + 1.0) * (2.0 * t - 2.0) + C2) + 2.0) / 2.0
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - t),
            Self::BounceOut => bounce_out(t),
            Self::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Self::ElasticIn => {
                const C4: f32 = 2.0 * PI / 3.0;
                if t <= 0.0 || t >= 1.0 {
                    t
                } else {
                    -(2.0_f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * C4).sin()
                }
            }
            Self::ElasticOut => {
                const C4: f32 = 2.0 * PI / 3.0;
                if t <= 0.0 || t >= 1.0 {
                    t
                } else {
                    2.0_f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
            Self::ElasticInOut => {
                const C5: f32 = 2.0 * PI / 4.5;
                if t <= 0.0 || t >= 1.0 {
                    t
                } else if t < 0.5 {
                    -(2.0_f32.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0
                } else {
                    (2.0_f32.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * C5).sin()) / 2.0 + 1.0
                }
            }
        }
    }

    /// Maps `value` from `[in_min, in_max]` to `[out_min, out_max]`
    /// through the curve. Inputs outside the range clamp to the ends.
    #[must_use]
    pub fn map(self, value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
        if (in_max - in_min).abs() < f32::EPSILON {
            return out_min;
        }
        if value <= in_min {
            return out_min;
        }
        if value >= in_max {
            return out_max;
        }
        let t = (value - in_min) / (in_max - in_min);
        out_min + (out_max - out_min) * self.apply(t)
    }
}

#[inline]
fn power_in(t: f32, n: i32) -> f32 {
    t.powi(n)
}

#[inline]
fn power_out(t: f32, n: i32) -> f32 {
    1.0 - (1.0 - t).powi(n)
}

#[inline]
fn power_in_out(t: f32, n: i32) -> f32 {
    if t < 0.5 {
        2.0_f32.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let u = t - 1.5 / D1;
        N1 * u * u + 0.75
    } else if t < 2.5 / D1 {
        let u = t - 2.25 / D1;
        N1 * u * u + 0.9375
    } else {
        let u = t - 2.625 / D1;
        N1 * u * u + 0.984_375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for ease in Ease::ALL {
            assert!(ease.apply(0.0).abs() < 1e-3, "{ease:?} should start at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-3, "{ease:?} should end at 1");
        }
    }

    #[test]
    fn test_ids_round_trip() {
        for (index, ease) in Ease::ALL.iter().enumerate() {
            assert_eq!(usize::from(ease.id()), index);
            assert_eq!(Ease::from_id(ease.id()), Some(*ease));
        }
        assert_eq!(Ease::from_id(34), None);
    }

    #[test]
    fn test_quadratic_shape() {
        assert!((Ease::QuadraticIn.apply(0.5) - 0.25).abs() < 1e-6);
        assert!((Ease::QuadraticOut.apply(0.5) - 0.75).abs() < 1e-6);
        assert!((Ease::QuadraticInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_map_identity_for_linear() {
        assert!((Ease::LinearIn.map(3.0, 0.0, 10.0, 0.0, 10.0) - 3.0).abs() < 1e-5);
        assert_eq!(Ease::CubicIn.map(-1.0, 0.0, 10.0, 0.0, 10.0), 0.0);
        assert_eq!(Ease::CubicIn.map(12.0, 0.0, 10.0, 0.0, 10.0), 10.0);
        assert_eq!(Ease::CubicIn.map(3.0, 5.0, 5.0, 1.0, 10.0), 1.0);
    }
}
