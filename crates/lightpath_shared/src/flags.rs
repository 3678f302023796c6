//! # Flag Vocabularies
//!
//! Group masks, behaviour flags and the enums that describe how a light
//! list is laid out.

use serde::{Deserialize, Serialize};

/// Group mask bits.
///
/// A mask of `0` selects every group in lookups.
pub mod groups {
    /// Group 1.
    pub const GROUP1: u8 = 1;
    /// Group 2.
    pub const GROUP2: u8 = 1 << 1;
    /// Group 3.
    pub const GROUP3: u8 = 1 << 2;
    /// Group 4.
    pub const GROUP4: u8 = 1 << 3;
    /// Group 5.
    pub const GROUP5: u8 = 1 << 4;
    /// Group 6.
    pub const GROUP6: u8 = 1 << 5;
    /// Group 7.
    pub const GROUP7: u8 = 1 << 6;
    /// Group 8.
    pub const GROUP8: u8 = 1 << 7;
    /// Every group.
    pub const ALL: u8 = 0;

    /// Index of the group an object with this mask is filed under: the
    /// lowest set bit, or group 0 for an empty mask.
    #[inline]
    #[must_use]
    pub const fn index_of(mask: u8) -> usize {
        if mask == 0 {
            0
        } else {
            mask.trailing_zeros() as usize
        }
    }

    /// Whether `mask` selects group `index` (an empty mask selects all).
    #[inline]
    #[must_use]
    pub const fn selects(mask: u8, index: usize) -> bool {
        mask == 0 || (index < 8 && mask & (1 << index) != 0)
    }
}

/// Bit set of per-list behaviour switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BehaviourFlags(pub u16);

impl BehaviourFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Brightness follows a slowly drifting noise field.
    pub const CONSTANT_NOISE_BRIGHTNESS: Self = Self(1 << 1);
    /// Paint the whole connection span instead of one pixel.
    pub const RENDER_SEGMENT: Self = Self(1 << 2);
    /// Random routing may send a light back where it came from.
    pub const ALLOW_BOUNCE: Self = Self(1 << 3);
    /// Random routing must send a light back where it came from.
    pub const FORCE_BOUNCE: Self = Self(1 << 4);
    /// Expiring lights vanish mid-connection.
    pub const EXPIRE_IMMEDIATE: Self = Self(1 << 5);
    /// The emitter is a connection rather than an intersection.
    pub const EMIT_FROM_CONNECTION: Self = Self(1 << 6);
    /// Paint from the connection start up to the eased position.
    pub const FILL_EASE: Self = Self(1 << 7);
    /// Every light picks its own random color.
    pub const RANDOM_COLOR: Self = Self(1 << 8);
    /// Also paint the mirror image across the object's center.
    pub const MIRROR_FLIP: Self = Self(1 << 9);
    /// Also paint the rotated image on the object's other arm.
    pub const MIRROR_ROTATE: Self = Self(1 << 10);
    /// Color changes blend over several frames.
    pub const SMOOTH_CHANGES: Self = Self(1 << 11);

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit of `other` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Removes the bits of `other`.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl std::ops::BitOr for BehaviourFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl std::ops::BitOrAssign for BehaviourFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.with(rhs);
    }
}

/// How the lights of a list are seeded relative to each other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListOrder {
    /// Lights enter one after another, one frame apart.
    #[default]
    Sequential,
    /// Lights start at random positions.
    Random,
    /// Initial brightness sampled from the noise field.
    Noise,
    /// Sequential with a random per-light lifetime offset.
    Offset,
}

/// Where the brightest part of a list sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListHead {
    /// A single lead light, the taper trails behind.
    #[default]
    Front,
    /// Taper split evenly on both sides.
    Middle,
    /// The whole taper leads.
    Back,
}
