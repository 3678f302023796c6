//! # Line
//!
//! A single strip whose two ends are joined by a zero-length bridge, so
//! lights leaving one end reappear at the other.
//!
//! ```text
//!   I0 ───────── run (n-3 LEDs) ──────────> I1
//!   px 0                                    px n-1
//!    ^                                       │
//!    └──────────── bridge (0 LEDs) ──────────┘
//! ```

use lightpath_core::{EmitParams, Model, ModelId, ObjectLayout, Topology};
use lightpath_procedural::Random;
use lightpath_shared::{groups, BehaviourFlags};

/// Routing models of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum LineModel {
    /// Run end to end, wrapping through the bridge.
    Default = 0,
    /// Bounce back and forth along the run.
    Bounce = 1,
}

impl LineModel {
    /// Number of models.
    pub const COUNT: u8 = 2;

    /// Model id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> ModelId {
        self as u8
    }
}

/// A straight strip of `pixel_count` pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Line {
    pixel_count: u16,
}

impl Line {
    /// Pixel count of the reference strip.
    pub const DEFAULT_PIXEL_COUNT: u16 = 300;

    /// Shortest line that still has a physical run.
    pub const MIN_PIXEL_COUNT: u16 = 8;

    /// Creates a line layout.
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

    /// Builds the graph: two intersections, the run, the bridge and both
    /// models.
    #[must_use]
    pub fn build(&self) -> Topology {
        let n = self.pixel_count;
        let mut topology = Topology::new(n);
        let start = topology.add_intersection(2, 0, None, groups::GROUP1);
        let end = topology.add_intersection(2, n.saturating_sub(1), None, groups::GROUP1);

        if let (Some(start), Some(end)) = (start, end) {
            topology.add_connection(start, end, groups::GROUP1, Some(n.saturating_sub(3)));
            topology.add_connection(end, start, groups::GROUP2, Some(0));
        }

        topology.add_model(Model::new(LineModel::Default.id(), 10, groups::GROUP1));
        topology.add_model(Model::new(LineModel::Bounce.id(), 0, groups::GROUP1));
        topology
    }

    /// Relative position of `pixel` along the line, `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self, pixel: u16) -> f32 {
        let last = self.pixel_count.saturating_sub(1).max(1);
        f32::from(pixel.min(last)) / f32::from(last)
    }

    /// Pixel at relative position `perc`.
    #[must_use]
    pub fn pixel_at(&self, perc: f32) -> u16 {
        let last = self.pixel_count.saturating_sub(1);
        (perc.clamp(0.0, 1.0) * f32::from(last)).round() as u16
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PIXEL_COUNT)
    }
}

impl ObjectLayout for Line {
    fn model_count(&self) -> u8 {
        LineModel::COUNT
    }

    fn model_params(&self, model: ModelId, random: &mut Random) -> EmitParams {
        let model = model % LineModel::COUNT;
        let params = EmitParams::new(model, random.random_speed());
        if model == LineModel::Bounce.id() {
            params.with_behaviour(BehaviourFlags::FORCE_BOUNCE)
        } else {
            params
        }
    }

    fn mirror_supported(&self) -> bool {
        true
    }

    fn mirrored_pixels(&self, pixel: u16, flip: bool, rotate: bool) -> [Option<u16>; 2] {
        let mirrored = self.pixel_count.saturating_sub(1).checked_sub(pixel);
        [mirrored.filter(|_| flip), mirrored.filter(|_| rotate)]
    }
}
