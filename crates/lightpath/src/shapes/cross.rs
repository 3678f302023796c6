//! # Cross
//!
//! Two strips of `n/2` pixels crossing at their quarter points. The
//! center intersection owns both crossing pixels; each strip end is an
//! edge intersection.
//!
//! ```text
//!                    V0 (n/2)
//!                     │
//!   H0 (0) ───────── C (n/4 | 3n/4) ───────── H1 (n/2-1)
//!                     │
//!                    V1 (n-1)
//! ```
//!
//! ## Connections
//!
//! - 4 medium arms: center to every edge
//! - 2 long runs: H0 -> H1 and V0 -> V1 over each whole strip
//! - 2 bridges: H0 <-> V1 and H1 <-> V0 (adjacent strip ends)

use lightpath_core::{EmitParams, Model, ModelId, ObjectLayout, Topology};
use lightpath_procedural::Random;
use lightpath_shared::groups;

/// Routing models of a cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum CrossModel {
    /// Every direction equally likely.
    Default = 0,
    /// Stay on the horizontal strip.
    Horizontal = 1,
    /// Stay on the vertical strip.
    Vertical = 2,
    /// Hop between strips through the bridges.
    Diagonal = 3,
}

impl CrossModel {
    /// Number of models.
    pub const COUNT: u8 = 4;

    /// Model id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> ModelId {
        self as u8
    }
}

const CENTER: u8 = groups::GROUP1;
const EDGE: u8 = groups::GROUP2;
const HORIZONTAL: u8 = groups::GROUP3;
const VERTICAL: u8 = groups::GROUP4;
const BRIDGE: u8 = groups::GROUP5;

/// Two crossing strips of `pixel_count / 2` pixels each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cross {
    pixel_count: u16,
}

impl Cross {
    /// Pixel count of the reference object.
    pub const DEFAULT_PIXEL_COUNT: u16 = 288;

    /// Smallest cross whose arms still carry LEDs.
    pub const MIN_PIXEL_COUNT: u16 = 24;

    /// Creates a cross layout.
    #[must_use]
    pub const fn new(pixel_count: u16) -> Self {
        Self { pixel_count }
    }

    /// Pixel count.
    #[inline]
    #[must_use]
    pub const fn pixel_count(&self) -> u16 {
        self.pixel_count
    }

    const fn half(&self) -> u16 {
        self.pixel_count / 2
    }

    /// Crossing pixel on the horizontal strip.
    #[must_use]
    pub const fn horizontal_cross(&self) -> u16 {
        self.pixel_count / 4
    }

    /// Crossing pixel on the vertical strip.
    #[must_use]
    pub const fn vertical_cross(&self) -> u16 {
        self.pixel_count / 4 * 3
    }

    /// Relative position of `pixel` along its own strip, `0.0..=1.0`.
    /// Pixels past the last one clamp to the end of the vertical strip.
    #[must_use]
    pub fn progress(&self, pixel: u16) -> f32 {
        let half = self.half();
        let last = half.saturating_sub(1).max(1);
        let offset = if pixel < half {
            pixel
        } else {
            pixel - half
        };
        f32::from(offset.min(last)) / f32::from(last)
    }

    /// Pixel at relative position `perc` on the vertical or horizontal
    /// strip.
    #[must_use]
    pub fn pixel_at(&self, perc: f32, vertical: bool) -> u16 {
        let half = self.half();
        let start = if vertical { half } else { 0 };
        let last = half.saturating_sub(1);
        start + (perc.clamp(0.0, 1.0) * f32::from(last)).round() as u16
    }

    /// Builds the graph and the four models.
    #[must_use]
    pub fn build(&self) -> Topology {
        let n = self.pixel_count;
        let half = self.half();
        let arm = Some((n / 4).saturating_sub(3));
        let mut topology = Topology::new(n);

        let nodes = [
            topology.add_intersection(
                4,
                self.horizontal_cross(),
                Some(self.vertical_cross()),
                CENTER,
            ),
            topology.add_intersection(3, 0, None, EDGE),
            topology.add_intersection(3, half.saturating_sub(1), None, EDGE),
            topology.add_intersection(3, half, None, EDGE),
            topology.add_intersection(3, n.saturating_sub(1), None, EDGE),
        ];
        let [Some(center), Some(h0), Some(h1), Some(v0), Some(v1)] = nodes else {
            return topology;
        };

        let arms_h = [
            topology.add_connection(center, h0, HORIZONTAL, arm),
            topology.add_connection(center, h1, HORIZONTAL, arm),
        ];
        let arms_v = [
            topology.add_connection(center, v0, VERTICAL, arm),
            topology.add_connection(center, v1, VERTICAL, arm),
        ];
        let long_h = topology.add_connection(h0, h1, HORIZONTAL, None);
        let long_v = topology.add_connection(v0, v1, VERTICAL, None);
        let bridges = [
            topology.add_connection(h0, v1, BRIDGE, Some(0)),
            topology.add_connection(h1, v0, BRIDGE, Some(0)),
        ];

        let mut horizontal = Model::new(CrossModel::Horizontal.id(), 0, CENTER);
        let mut vertical = Model::new(CrossModel::Vertical.id(), 0, CENTER);
        let mut diagonal = Model::new(CrossModel::Diagonal.id(), 0, CENTER);

        for id in arms_h.into_iter().chain([long_h]).flatten() {
            if let Some(connection) = topology.connection(id) {
                horizontal.put_connection(connection, 10, 10);
            }
        }
        for id in arms_v.into_iter().chain([long_v]).flatten() {
            if let Some(connection) = topology.connection(id) {
                vertical.put_connection(connection, 10, 10);
            }
        }
        for id in arms_h.into_iter().chain(arms_v).chain(bridges).flatten() {
            if let Some(connection) = topology.connection(id) {
                diagonal.put_connection(connection, 10, 10);
            }
        }

        topology.add_model(Model::new(CrossModel::Default.id(), 10, CENTER));
        topology.add_model(horizontal);
        topology.add_model(vertical);
        topology.add_model(diagonal);
        topology
    }
}

impl Default for Cross {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PIXEL_COUNT)
    }
}

impl ObjectLayout for Cross {
    fn model_count(&self) -> u8 {
        CrossModel::COUNT
    }

    fn model_params(&self, model: ModelId, random: &mut Random) -> EmitParams {
        EmitParams::new(model % CrossModel::COUNT, random.random_speed())
    }

    fn mirror_supported(&self) -> bool {
        true
    }

    /// Flip reflects a pixel end to end on its own strip; rotate moves it
    /// to the same offset on the other strip.
    fn mirrored_pixels(&self, pixel: u16, flip: bool, rotate: bool) -> [Option<u16>; 2] {
        let half = self.half();
        if pixel >= half * 2 {
            return [None, None];
        }
        let (start, offset, other) = if pixel < half {
            (0, pixel, half)
        } else {
            (half, pixel - half, 0)
        };
        let flipped = start + (half - 1 - offset);
        let rotated = other + offset;
        [flip.then_some(flipped), rotate.then_some(rotated)]
    }
}
