//! # Engine
//!
//! One simulated object behind one lock. The host drives it with
//! timestamps (`update`) or deltas (`tick`) and reads pixels back;
//! emissions arrive as `EmitCommand`s with numeric ids for curves and
//! behaviour bits.
//!
//! ## Frame
//!
//! ```text
//! update(now)
//!   ├─ auto-emit (if enabled and due)
//!   ├─ State::update(now)
//!   └─ probe.record_frame(now)
//! ```

use lightpath_core::{
    EmitParams, EmitSource, LightpathError, LightpathResult, ObjectLayout, Palette, RuntimeLimits,
    SnapshotResult, State, Topology, TopologySnapshot, WrapMode,
};
use lightpath_procedural::{Ease, NoiseField, NoiseSeed, Random, RandomRanges};
use lightpath_shared::{BehaviourFlags, ColorRGB, ListHead, ListOrder};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigResult, EngineConfig};
use crate::probe::{FrameProbe, ProbeReport};

// =============================================================================
// EMIT COMMAND
// =============================================================================

/// An emission request in host terms: packed `0xRRGGBB` colors, easing
/// curves by id and behaviour as raw bits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitCommand {
    /// Model index.
    pub model: u8,
    /// Pixels per frame.
    pub speed: f32,
    /// Easing curve id along connections.
    pub ease: u8,
    /// Number of lights; random when absent.
    pub length: Option<u16>,
    /// Trail length.
    pub trail: u16,
    /// Packed list color; random when absent.
    pub color: Option<u32>,
    /// Packed palette colors; overrides `color` when not empty.
    pub palette: Vec<u32>,
    /// Palette stops; evenly spread when empty.
    pub palette_positions: Vec<f32>,
    /// Palette wrap mode.
    pub palette_wrap: WrapMode,
    /// Retrigger key; `0` means none.
    pub note_id: u8,
    /// Brightness floor.
    pub min_bri: u8,
    /// Brightness ceiling.
    pub max_bri: u8,
    /// Raw behaviour bits.
    pub behaviour: u16,
    /// Groups that recolor passing lights.
    pub color_change_groups: u8,
    /// Emitter groups; `0` uses the model's.
    pub emit_groups: u8,
    /// Head start in pixels.
    pub emit_offset: u16,
    /// Lifetime in milliseconds; unlimited when absent.
    pub duration_ms: Option<u64>,
    /// Emitter index; random when absent.
    pub from: Option<u8>,
    /// Lights follow each other.
    pub linked: bool,
    /// Release order.
    pub order: ListOrder,
    /// Bright end of the list.
    pub head: ListHead,
    /// Brightness level lost per frame.
    pub fade_speed: u16,
    /// Level where fading stops.
    pub fade_thresh: u16,
    /// Fade curve id.
    pub fade_ease: u8,
}

impl Default for EmitCommand {
    fn default() -> Self {
        let params = EmitParams::default();
        Self {
            model: params.model,
            speed: params.speed,
            ease: params.ease.id(),
            length: params.length,
            trail: params.trail,
            color: None,
            palette: Vec::new(),
            palette_positions: Vec::new(),
            palette_wrap: WrapMode::default(),
            note_id: params.note_id,
            min_bri: params.min_bri,
            max_bri: params.max_bri,
            behaviour: params.behaviour.bits(),
            color_change_groups: params.color_change_groups,
            emit_groups: params.emit_groups,
            emit_offset: params.emit_offset,
            duration_ms: params.duration_ms,
            from: None,
            linked: params.linked,
            order: params.order,
            head: params.head,
            fade_speed: params.fade_speed,
            fade_thresh: params.fade_thresh,
            fade_ease: params.fade_ease.id(),
        }
    }
}

impl EmitCommand {
    /// Default command for `model` at `speed`.
    #[must_use]
    pub fn new(model: u8, speed: f32) -> Self {
        Self {
            model,
            speed,
            ..Self::default()
        }
    }

    /// Resolves ids and packed colors into simulation parameters.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown easing id or mismatched palette
    /// positions.
    pub fn to_params(&self) -> LightpathResult<EmitParams> {
        let ease = ease_by_id(self.ease)?;
        let fade_ease = ease_by_id(self.fade_ease)?;

        let palette = if self.palette.is_empty() {
            None
        } else {
            if !self.palette_positions.is_empty()
                && self.palette_positions.len() != self.palette.len()
            {
                return Err(LightpathError::InvalidArgument(format!(
                    "{} palette positions for {} colors",
                    self.palette_positions.len(),
                    self.palette.len()
                )));
            }
            let colors = self.palette.iter().copied().map(ColorRGB::from_u32).collect();
            Some(
                Palette::new(colors)
                    .with_positions(self.palette_positions.clone())
                    .with_wrap(self.palette_wrap),
            )
        };

        Ok(EmitParams {
            model: self.model,
            speed: self.speed,
            ease,
            length: self.length,
            trail: self.trail,
            color: self.color.map(ColorRGB::from_u32),
            palette,
            note_id: self.note_id,
            min_bri: self.min_bri,
            max_bri: self.max_bri,
            behaviour: BehaviourFlags(self.behaviour),
            color_change_groups: self.color_change_groups,
            emit_groups: self.emit_groups,
            emit_offset: self.emit_offset,
            duration_ms: self.duration_ms,
            from: self.from.map_or(EmitSource::Random, EmitSource::Index),
            linked: self.linked,
            order: self.order,
            head: self.head,
            fade_speed: self.fade_speed,
            fade_thresh: self.fade_thresh,
            fade_ease,
        })
    }
}

fn ease_by_id(id: u8) -> LightpathResult<Ease> {
    Ease::from_id(id)
        .ok_or_else(|| LightpathError::InvalidArgument(format!("unknown easing curve {id}")))
}

// =============================================================================
// ENGINE
// =============================================================================

struct EngineInner {
    state: State,
    now: u64,
    probe: FrameProbe,
}

impl EngineInner {
    fn advance(&mut self, millis: u64) {
        self.now = millis;
        if self.state.auto_emit(millis).is_some() {
            self.probe.record_emit();
        }
        self.state.update(millis);
        self.probe.record_frame(millis);
    }
}

/// Thread-safe handle to one simulated object.
pub struct Engine {
    inner: Mutex<EngineInner>,
}

impl Engine {
    /// Builds the configured shape.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let (topology, layout) = config.object.build(config.resolved_pixel_count());
        let engine = Self::with_topology(
            topology,
            layout,
            config.limits,
            config.seed,
            config.random.clone(),
        );
        engine.set_auto_emit(config.auto_emit);
        tracing::debug!(
            "engine ready: {:?} with {} pixels, seed {}",
            config.object,
            config.resolved_pixel_count(),
            config.seed
        );
        engine
    }

    /// Parses a TOML configuration and builds its shape.
    ///
    /// # Errors
    ///
    /// See `EngineConfig::from_toml_str`.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(Self::new(&EngineConfig::from_toml_str(text)?))
    }

    /// Loads a TOML configuration file and builds its shape.
    ///
    /// # Errors
    ///
    /// See `EngineConfig::from_toml_file`.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        Ok(Self::new(&EngineConfig::from_toml_file(path)?))
    }

    /// Wraps a hand-built topology.
    #[must_use]
    pub fn with_topology(
        topology: Topology,
        layout: Box<dyn ObjectLayout>,
        limits: RuntimeLimits,
        seed: u64,
        ranges: RandomRanges,
    ) -> Self {
        let noise_seed = NoiseSeed::new(seed);
        let state = State::new(
            topology,
            layout,
            limits,
            Random::new(seed, ranges),
            NoiseField::new(noise_seed.derive(1)),
        );
        Self {
            inner: Mutex::new(EngineInner {
                state,
                now: 0,
                probe: FrameProbe::new(),
            }),
        }
    }

    // =========================================================================
    // EMISSION
    // =========================================================================

    /// Starts an emission at the current time.
    ///
    /// # Returns
    ///
    /// The slot index of the list.
    ///
    /// # Errors
    ///
    /// Any `LightpathError` from parameter resolution or `State::emit`.
    pub fn emit(&self, command: &EmitCommand) -> LightpathResult<u8> {
        let params = command.to_params()?;
        self.emit_params(&params)
    }

    /// Starts an emission from already resolved parameters.
    ///
    /// # Errors
    ///
    /// See `State::emit`.
    pub fn emit_params(&self, params: &EmitParams) -> LightpathResult<u8> {
        let mut inner = self.inner.lock();
        let now = inner.now;
        let slot = inner.state.emit(params, now)?;
        inner.probe.record_emit();
        Ok(slot)
    }

    // =========================================================================
    // TIME
    // =========================================================================

    /// Advances the simulation to the absolute time `millis`.
    pub fn update(&self, millis: u64) {
        self.inner.lock().advance(millis);
    }

    /// Advances the simulation by `delta_ms`. Reading the clock and
    /// advancing it happen under one lock, so concurrent ticks never
    /// observe the same start time.
    pub fn tick(&self, delta_ms: u64) {
        let mut inner = self.inner.lock();
        let now = inner.now.saturating_add(delta_ms);
        inner.advance(now);
    }

    /// Time of the last update.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.inner.lock().now
    }

    // =========================================================================
    // CONTROL
    // =========================================================================

    /// Stops every list.
    ///
    /// # Returns
    ///
    /// How many lists were newly stopped.
    pub fn stop_all(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = inner.now;
        inner.state.stop_all(now)
    }

    /// Stops the list in `slot`.
    pub fn stop_note(&self, slot: u8) -> bool {
        let mut inner = self.inner.lock();
        let now = inner.now;
        inner.state.stop_note(slot, now)
    }

    /// Slot of the list holding `note_id`.
    #[must_use]
    pub fn find_note(&self, note_id: u8) -> Option<u8> {
        self.inner.lock().state.find_list(note_id)
    }

    /// Enables or blanks the output.
    pub fn set_on(&self, on: bool) {
        self.inner.lock().state.set_on(on);
    }

    /// Whether the output is enabled.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.inner.lock().state.is_on()
    }

    /// Enables or disables auto-emission.
    pub fn set_auto_emit(&self, enabled: bool) {
        self.inner.lock().state.set_auto_emit(enabled);
    }

    /// Whether auto-emission is enabled.
    #[must_use]
    pub fn auto_emit_enabled(&self) -> bool {
        self.inner.lock().state.auto_emit_enabled()
    }

    // =========================================================================
    // OUTPUT
    // =========================================================================

    /// Logical pixel count.
    #[must_use]
    pub fn pixel_count(&self) -> u16 {
        self.inner.lock().state.topology().pixel_count()
    }

    /// Color of logical pixel `index`, dimmed by `max_brightness`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` past the last pixel.
    pub fn pixel(&self, index: u16, max_brightness: u8) -> LightpathResult<ColorRGB> {
        self.inner.lock().state.get_pixel(index, max_brightness)
    }

    /// The last frame as packed RGB bytes in physical order; all black
    /// while the output is off.
    #[must_use]
    pub fn frame_bytes(&self) -> Vec<u8> {
        let inner = self.inner.lock();
        if inner.state.is_on() {
            inner.state.frame_bytes().to_vec()
        } else {
            vec![0; inner.state.frame_bytes().len()]
        }
    }

    /// The last completed probe window.
    #[must_use]
    pub fn probe(&self) -> Option<ProbeReport> {
        self.inner.lock().probe.last_report()
    }

    // =========================================================================
    // TOPOLOGY
    // =========================================================================

    /// Captures the topology structure.
    #[must_use]
    pub fn export_snapshot(&self) -> TopologySnapshot {
        self.inner.lock().state.topology().export_snapshot()
    }

    /// Replaces the topology structure. Every running emission is dropped
    /// along with the old graph.
    ///
    /// # Errors
    ///
    /// The snapshot's first inconsistency; nothing changes on error.
    pub fn import_snapshot(
        &self,
        snapshot: &TopologySnapshot,
        replace_models: bool,
    ) -> SnapshotResult<()> {
        self.inner
            .lock()
            .state
            .import_snapshot(snapshot, replace_models)
    }

    /// Runs `f` with exclusive access to the state, for graph edits and
    /// queries the facade does not wrap.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.inner.lock().state)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Engine")
            .field("now", &inner.now)
            .field("state", &inner.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_defaults_match_params() {
        let params = EmitCommand::new(1, 2.0).to_params().unwrap();
        let expected = EmitParams::new(1, 2.0);
        assert_eq!(params, expected);
    }

    #[test]
    fn test_command_resolves_ids() {
        let command = EmitCommand {
            ease: Ease::QuadraticIn.id(),
            color: Some(0x102030),
            behaviour: BehaviourFlags::RENDER_SEGMENT.bits(),
            from: Some(1),
            ..EmitCommand::default()
        };
        let params = command.to_params().unwrap();
        assert_eq!(params.ease, Ease::QuadraticIn);
        assert_eq!(params.color, Some(ColorRGB::new(0x10, 0x20, 0x30)));
        assert!(params.behaviour.contains(BehaviourFlags::RENDER_SEGMENT));
        assert_eq!(params.from, EmitSource::Index(1));
    }

    #[test]
    fn test_command_rejects_unknown_ease() {
        let command = EmitCommand {
            fade_ease: 200,
            ..EmitCommand::default()
        };
        assert!(matches!(
            command.to_params(),
            Err(LightpathError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_command_palette() {
        let command = EmitCommand {
            palette: vec![0xFF0000, 0x0000FF],
            palette_positions: vec![0.0],
            ..EmitCommand::default()
        };
        assert!(command.to_params().is_err());

        let command = EmitCommand {
            palette: vec![0xFF0000, 0x0000FF],
            ..EmitCommand::default()
        };
        let palette = command.to_params().unwrap().palette.unwrap();
        assert_eq!(palette.color_at(0.0), ColorRGB::new(0xFF, 0, 0));
    }
}
