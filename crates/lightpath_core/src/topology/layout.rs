//! # Object Layouts
//!
//! A layout describes the physical object behind a topology: how many
//! routing models it offers to auto-emission and whether it can paint
//! mirror images of a light.

use lightpath_procedural::Random;

use crate::runtime::EmitParams;

use super::ids::ModelId;

/// Shape-specific hooks used by the runtime.
pub trait ObjectLayout: Send {
    /// Number of models auto-emission cycles through.
    fn model_count(&self) -> u8;

    /// Emission parameters auto-emission uses for `model`.
    fn model_params(&self, model: ModelId, random: &mut Random) -> EmitParams {
        let count = self.model_count().max(1);
        EmitParams::new(model % count, random.random_speed())
    }

    /// Whether `mirrored_pixels` returns anything.
    fn mirror_supported(&self) -> bool {
        false
    }

    /// Mirror images of a logical pixel: the flipped image and the
    /// rotated image, each only when requested.
    fn mirrored_pixels(&self, _pixel: u16, _flip: bool, _rotate: bool) -> [Option<u16>; 2] {
        [None, None]
    }
}

/// A layout with no mirror support, for hand-built topologies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlainLayout {
    models: u8,
}

impl PlainLayout {
    /// Creates a layout offering `models` models.
    #[must_use]
    pub const fn new(models: u8) -> Self {
        Self { models }
    }
}

impl Default for PlainLayout {
    fn default() -> Self {
        Self::new(1)
    }
}

impl ObjectLayout for PlainLayout {
    fn model_count(&self) -> u8 {
        self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_params_wrap() {
        let layout = PlainLayout::new(2);
        let mut random = Random::with_seed(1);
        let params = layout.model_params(5, &mut random);
        assert_eq!(params.model, 1);
        assert!(params.speed >= random.ranges().min_speed);
        assert_eq!(layout.mirrored_pixels(3, true, true), [None, None]);
    }
}
