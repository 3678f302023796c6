//! # Emission Parameters
//!
//! Everything a client can say about one emission. Every field has a
//! default, so a parameter set can be built in code with the `with_*`
//! helpers or deserialized from a partial TOML table.

use lightpath_procedural::Ease;
use lightpath_shared::{BehaviourFlags, ColorRGB, ListHead, ListOrder};
use serde::{Deserialize, Serialize};

use crate::topology::ModelId;

use super::palette::Palette;

/// Where an emission enters the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitSource {
    /// The first emitter in the resolved groups.
    Auto,
    /// The `n`-th emitter in the resolved groups.
    Index(u8),
    /// A uniformly chosen emitter in the resolved groups.
    #[default]
    Random,
}

/// Parameters of one emission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitParams {
    /// Routing model.
    pub model: ModelId,
    /// Pixels per frame; `0` parks the lights.
    pub speed: f32,
    /// Easing along connections.
    pub ease: Ease,
    /// Number of lights; random when absent.
    pub length: Option<u16>,
    /// Requested trail length.
    pub trail: u16,
    /// Single list color; random when absent and no palette is given.
    pub color: Option<ColorRGB>,
    /// Gradient sampled by light index.
    pub palette: Option<Palette>,
    /// Retrigger key; `0` means none.
    pub note_id: u8,
    /// Brightness floor.
    pub min_bri: u8,
    /// Brightness ceiling.
    pub max_bri: u8,
    /// Behaviour switches.
    pub behaviour: BehaviourFlags,
    /// Groups whose intersections recolor passing lights.
    pub color_change_groups: u8,
    /// Emitter groups; `0` uses the model's groups.
    pub emit_groups: u8,
    /// Head start in pixels.
    pub emit_offset: u16,
    /// Lifetime in milliseconds; unlimited when absent.
    pub duration_ms: Option<u64>,
    /// Emitter selection.
    pub from: EmitSource,
    /// Lights of the list follow each other's routes.
    pub linked: bool,
    /// Release order.
    pub order: ListOrder,
    /// Where the bright part of the list sits.
    pub head: ListHead,
    /// Brightness level lost per frame.
    pub fade_speed: u16,
    /// Brightness level where fading stops.
    pub fade_thresh: u16,
    /// Curve from brightness level to output brightness.
    pub fade_ease: Ease,
}

impl Default for EmitParams {
    fn default() -> Self {
        Self {
            model: 0,
            speed: 1.0,
            ease: Ease::None,
            length: None,
            trail: 0,
            color: None,
            palette: None,
            note_id: 0,
            min_bri: 0,
            max_bri: 255,
            behaviour: BehaviourFlags::NONE,
            color_change_groups: 0,
            emit_groups: 0,
            emit_offset: 0,
            duration_ms: None,
            from: EmitSource::Random,
            linked: true,
            order: ListOrder::Sequential,
            head: ListHead::Front,
            fade_speed: 0,
            fade_thresh: 0,
            fade_ease: Ease::None,
        }
    }
}

impl EmitParams {
    /// Default parameters for `model` at `speed`.
    #[must_use]
    pub fn new(model: ModelId, speed: f32) -> Self {
        Self {
            model,
            speed,
            ..Self::default()
        }
    }

    /// Sets an explicit length.
    #[must_use]
    pub fn with_length(mut self, length: u16) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets a single color.
    #[must_use]
    pub fn with_color(mut self, color: ColorRGB) -> Self {
        self.color = Some(color);
        self
    }

    /// Adds behaviour flags.
    #[must_use]
    pub fn with_behaviour(mut self, flags: BehaviourFlags) -> Self {
        self.behaviour |= flags;
        self
    }

    /// Sets the emitter selection.
    #[must_use]
    pub fn with_source(mut self, from: EmitSource) -> Self {
        self.from = from;
        self
    }

    /// Sets the lifetime.
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Sets whether lights follow each other.
    #[must_use]
    pub fn with_linked(mut self, linked: bool) -> Self {
        self.linked = linked;
        self
    }

    /// Emitter groups, falling back to the model's.
    #[inline]
    #[must_use]
    pub const fn resolved_emit_groups(&self, model_groups: u8) -> u8 {
        if self.emit_groups == 0 {
            model_groups
        } else {
            self.emit_groups
        }
    }

    /// Lights reserved for the trail of a list of `length` lights.
    ///
    /// Parked lists keep the requested trail; moving lists get at least
    /// one trail light per whole pixel of speed beyond the first.
    #[must_use]
    pub fn trail_count(&self, length: u16) -> u16 {
        let requested = if self.speed == 0.0 {
            self.trail
        } else {
            let by_speed = (self.speed.abs().floor() as u16).saturating_sub(1);
            self.trail.max(by_speed)
        };
        requested.min(length.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trail_count() {
        let mut params = EmitParams::new(0, 4.5);
        assert_eq!(params.trail_count(10), 3);
        params.trail = 6;
        assert_eq!(params.trail_count(10), 6);
        assert_eq!(params.trail_count(4), 3);

        let parked = EmitParams {
            trail: 2,
            ..EmitParams::new(0, 0.0)
        };
        assert_eq!(parked.trail_count(10), 2);
        assert_eq!(parked.trail_count(1), 0);
    }

    #[test]
    fn test_emit_groups_fall_back_to_model() {
        let mut params = EmitParams::default();
        assert_eq!(params.resolved_emit_groups(0b100), 0b100);
        params.emit_groups = 0b1;
        assert_eq!(params.resolved_emit_groups(0b100), 0b1);
    }

    #[test]
    fn test_partial_toml() {
        let params: EmitParams = toml::from_str(
            r#"
            model = 1
            speed = 2.0
            length = 12
            color = 0xCC2200
            from = { index = 3 }
            order = "noise"
            "#,
        )
        .unwrap();
        assert_eq!(params.model, 1);
        assert_eq!(params.length, Some(12));
        assert_eq!(params.color, Some(ColorRGB::new(0xCC, 0x22, 0x00)));
        assert_eq!(params.from, EmitSource::Index(3));
        assert_eq!(params.order, ListOrder::Noise);
        assert!(params.linked);
        assert_eq!(params.max_bri, 255);
    }
}
