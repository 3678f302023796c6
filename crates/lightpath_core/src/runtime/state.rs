//! # Object State
//!
//! The per-object orchestrator. Owns the topology, a fixed number of
//! light-list slots, the light budget, the pixel buffers and the random
//! and noise sources.
//!
//! ## Tick
//!
//! ```text
//! update(now)
//!   ├─ every list: release queued lights, sweep, route, advance
//!   ├─ composite visible lights (plus mirror images) into the sums
//!   ├─ reclaim lists whose lights all expired
//!   └─ finalize the frame
//! ```
//!
//! ## Emission Checks
//!
//! Checked in order, and nothing is allocated until every check passed:
//! brightness bounds, model, slot, budget, emitter.

use lightpath_procedural::{NoiseField, Random};
use lightpath_shared::{BehaviourFlags, ColorRGB, MAX_LIGHT_LISTS, MAX_TOTAL_LIGHTS};
use serde::{Deserialize, Serialize};

use crate::error::{LightpathError, LightpathResult, SnapshotResult};
use crate::memory::{SlotHandle, SlotPool};
use crate::topology::{Model, ObjectLayout, Owner, Topology, TopologySnapshot};

use super::emit_params::{EmitParams, EmitSource};
use super::light_list::{LightList, TickContext};
use super::palette::{palette_at, palette_count, random_color};
use super::pixels::PixelBuffer;

/// Capacity limits of one object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeLimits {
    /// Concurrent light lists.
    pub max_light_lists: usize,
    /// Lights alive across all lists.
    pub max_total_lights: usize,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_light_lists: MAX_LIGHT_LISTS,
            max_total_lights: MAX_TOTAL_LIGHTS,
        }
    }
}

/// Simulation state of one physical object.
pub struct State {
    topology: Topology,
    layout: Box<dyn ObjectLayout>,
    lists: SlotPool<LightList>,
    limits: RuntimeLimits,
    total_lights: usize,
    pixels: PixelBuffer,
    current_palette: usize,
    on: bool,
    auto_enabled: bool,
    next_emit: u64,
    next_list_id: u16,
    random: Random,
    noise: NoiseField,
}

impl State {
    /// Creates the state for a built topology.
    #[must_use]
    pub fn new(
        topology: Topology,
        layout: Box<dyn ObjectLayout>,
        limits: RuntimeLimits,
        random: Random,
        noise: NoiseField,
    ) -> Self {
        let pixels = PixelBuffer::new(usize::from(topology.real_pixel_count()));
        Self {
            topology,
            layout,
            lists: SlotPool::new(limits.max_light_lists),
            limits,
            total_lights: 0,
            pixels,
            current_palette: 0,
            on: true,
            auto_enabled: false,
            next_emit: 0,
            next_list_id: 0,
            random,
            noise,
        }
    }

    // =========================================================================
    // EMISSION
    // =========================================================================

    /// Starts an emission.
    ///
    /// # Returns
    ///
    /// The slot index of the list now holding the emission.
    ///
    /// # Errors
    ///
    /// See the module docs for the order of checks; a failed check leaves
    /// the state untouched.
    pub fn emit(&mut self, params: &EmitParams, now: u64) -> LightpathResult<u8> {
        if params.min_bri > params.max_bri {
            return Err(LightpathError::InvalidArgument(format!(
                "min brightness {} above max brightness {}",
                params.min_bri, params.max_bri
            )));
        }
        if params.length == Some(0) {
            return Err(LightpathError::InvalidArgument(
                "length must be at least 1".to_string(),
            ));
        }

        let Some(model) = self.topology.model(params.model) else {
            return Err(LightpathError::InvalidModel {
                model: params.model,
                available: self.topology.model_count(),
            });
        };
        let model_groups = model.emit_groups;
        let max_position = model.max_length_or(self.topology.pixel_count());

        let retrigger = self.find_list(params.note_id);
        let (slot, reused) = match retrigger {
            Some(slot) => {
                let handle = SlotHandle::new(usize::from(slot));
                let held = self
                    .lists
                    .get(handle)
                    .map_or(0, |list| usize::from(list.num_lights()));
                (handle, held)
            }
            None => match self.lists.first_free() {
                Some(handle) => (handle, 0),
                None => {
                    return Err(LightpathError::NoFreeSlot {
                        capacity: self.lists.capacity(),
                    })
                }
            },
        };

        let available = self
            .limits
            .max_total_lights
            .saturating_sub(self.total_lights - reused);
        let length = match params.length {
            Some(length) if usize::from(length) > available => {
                return Err(LightpathError::CapacityExceeded {
                    requested: usize::from(length),
                    available,
                });
            }
            Some(length) => length,
            None if available == 0 => {
                return Err(LightpathError::CapacityExceeded {
                    requested: 1,
                    available: 0,
                });
            }
            None => {
                let cap = u16::try_from(available).unwrap_or(u16::MAX);
                self.random.random_length().clamp(1, cap)
            }
        };

        let emitter = self.resolve_emitter(model_groups, params)?;

        if retrigger.is_none() {
            let id = self.next_list_id;
            self.next_list_id = self.next_list_id.wrapping_add(1);
            let list = LightList::configure(id, params, length, max_position, &mut self.random);
            self.lists.replace(slot, list);
        }
        let Some(list) = self.lists.get_mut(slot) else {
            return Err(LightpathError::InternalError(format!(
                "slot {} lost its list",
                slot.index()
            )));
        };
        if retrigger.is_some() {
            list.reset(params, length, max_position, &mut self.random);
        }
        list.set_emitter(emitter);
        list.seed(now, &mut self.random, &self.noise);

        let id = list.id;
        let lights = usize::from(list.num_lights());
        if list.lights().count() == 0 {
            self.lists.remove(slot);
            self.total_lights -= reused;
            return Err(LightpathError::InternalError(format!(
                "list {id} seeded no lights"
            )));
        }
        self.total_lights = self.total_lights - reused + lights;

        tracing::debug!(
            "emitted list {} into slot {} ({} lights, model {}, from {:?})",
            id,
            slot.index(),
            lights,
            params.model,
            emitter
        );
        Ok(slot.index() as u8)
    }

    fn resolve_emitter(&mut self, model_groups: u8, params: &EmitParams) -> LightpathResult<Owner> {
        let groups = params.resolved_emit_groups(model_groups);
        let from_connection = params
            .behaviour
            .contains(BehaviourFlags::EMIT_FROM_CONNECTION);
        let count = if from_connection {
            self.topology.count_connections(groups)
        } else {
            self.topology.count_intersections(groups)
        };
        if count == 0 {
            return Err(LightpathError::NoEmitterAvailable { groups });
        }

        let index = match params.from {
            EmitSource::Auto => 0,
            EmitSource::Index(index) => usize::from(index),
            EmitSource::Random => self.random.below(count as u32) as usize,
        };

        let emitter = if from_connection {
            self.topology
                .get_connection(index, groups)
                .map(|connection| Owner::Connection(connection.id))
        } else {
            self.topology
                .get_intersection(index, groups)
                .map(|intersection| Owner::Intersection(intersection.id))
        };
        emitter.ok_or(LightpathError::NoEmitterAvailable { groups })
    }

    /// Emits a random model with random length, duration and color when
    /// auto-emission is enabled and due.
    ///
    /// # Returns
    ///
    /// The slot of the new list, if one was emitted.
    pub fn auto_emit(&mut self, now: u64) -> Option<u8> {
        if !self.auto_enabled || now < self.next_emit {
            return None;
        }
        self.next_emit = now + u64::from(self.random.random_next_emit());

        let model = self.random.below(u32::from(self.layout.model_count())) as u8;
        let mut params = self.layout.model_params(model, &mut self.random);
        params.duration_ms = Some(u64::from(self.random.random_duration()));
        params.color = Some(random_color(&mut self.random));

        match self.emit(&params, now) {
            Ok(slot) => {
                tracing::debug!("auto-emitted model {} into slot {}", params.model, slot);
                Some(slot)
            }
            Err(error) => {
                tracing::debug!("auto-emit skipped: {}", error);
                None
            }
        }
    }

    // =========================================================================
    // TICK
    // =========================================================================

    /// Advances every list by one frame and composites the result.
    pub fn update(&mut self, now: u64) {
        let real_pixels = usize::from(self.topology.real_pixel_count());
        if self.pixels.len() != real_pixels {
            self.pixels = PixelBuffer::new(real_pixels);
        }

        let topology = &self.topology;
        let layout = &*self.layout;
        let mut finished = Vec::new();
        let mut scratch: Vec<u16> = Vec::new();

        for (handle, list) in self.lists.iter_mut() {
            let fallback;
            let model = match topology.model(list.model()) {
                Some(model) => model,
                None => {
                    if list.stop(now) {
                        tracing::warn!("model {} vanished, stopping list {}", list.model(), list.id);
                    }
                    fallback = Model::new(list.model(), 0, 0);
                    &fallback
                }
            };

            let mut tick = TickContext {
                topology,
                model,
                random: &mut self.random,
                noise: &self.noise,
                now,
            };
            if list.update(&mut tick) {
                finished.push(handle);
                continue;
            }
            if !list.visible {
                continue;
            }

            let behaviour = *list.behaviour();
            let mirror = layout.mirror_supported()
                && (behaviour.mirror_flip() || behaviour.mirror_rotate());
            for light in list.lights() {
                if light.is_expired || !light.render.is_visible() {
                    continue;
                }
                scratch.clear();
                light.render.for_each_pixel(|pixel| {
                    scratch.push(pixel);
                    if mirror {
                        let images = layout.mirrored_pixels(
                            pixel,
                            behaviour.mirror_flip(),
                            behaviour.mirror_rotate(),
                        );
                        scratch.extend(images.into_iter().flatten());
                    }
                });
                scratch.sort_unstable();
                scratch.dedup();

                let color = light.pixel_color();
                for pixel in &scratch {
                    if let Some(real) = topology.translate_to_real_pixel(*pixel) {
                        self.pixels.add(usize::from(real), color);
                    }
                }
            }
        }

        for handle in finished {
            if let Some(list) = self.lists.remove(handle) {
                self.total_lights = self
                    .total_lights
                    .saturating_sub(usize::from(list.num_lights()));
                tracing::debug!("reclaimed list {} from slot {}", list.id, handle.index());
            }
        }

        self.pixels.finalize();
        tracing::trace!(
            "tick {}: {} lists, {} lights",
            now,
            self.lists.len(),
            self.total_lights
        );
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Color of logical pixel `index`, dimmed by `max_brightness`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` past the last logical pixel.
    pub fn get_pixel(&self, index: u16, max_brightness: u8) -> LightpathResult<ColorRGB> {
        let pixel_count = self.topology.pixel_count();
        if index >= pixel_count {
            return Err(LightpathError::OutOfRange { index, pixel_count });
        }
        if !self.on {
            return Ok(ColorRGB::BLACK);
        }
        Ok(self
            .topology
            .translate_to_real_pixel(index)
            .and_then(|real| self.pixels.get(usize::from(real)))
            .map_or(ColorRGB::BLACK, |color| color.dim(max_brightness)))
    }

    /// The finalized frame in physical pixel order.
    #[must_use]
    pub fn frame(&self) -> &[ColorRGB] {
        self.pixels.frame()
    }

    /// The finalized frame as packed RGB bytes.
    #[must_use]
    pub fn frame_bytes(&self) -> &[u8] {
        self.pixels.frame_bytes()
    }

    /// Slot of the list holding `note_id`; `0` never matches.
    #[must_use]
    pub fn find_list(&self, note_id: u8) -> Option<u8> {
        if note_id == 0 {
            return None;
        }
        self.lists
            .iter()
            .find(|(_, list)| list.note_id() == note_id)
            .map(|(handle, _)| handle.index() as u8)
    }

    /// The list in `slot`.
    #[must_use]
    pub fn list(&self, slot: u8) -> Option<&LightList> {
        self.lists.get(SlotHandle::new(usize::from(slot)))
    }

    /// Mutable access to the list in `slot`.
    pub fn list_mut(&mut self, slot: u8) -> Option<&mut LightList> {
        self.lists.get_mut(SlotHandle::new(usize::from(slot)))
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn active_lists(&self) -> usize {
        self.lists.len()
    }

    /// Lights currently charged against the budget.
    #[inline]
    #[must_use]
    pub const fn total_lights(&self) -> usize {
        self.total_lights
    }

    /// Capacity limits.
    #[inline]
    #[must_use]
    pub const fn limits(&self) -> RuntimeLimits {
        self.limits
    }

    /// The graph.
    #[inline]
    #[must_use]
    pub const fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Mutable graph access, for edits between ticks.
    pub fn topology_mut(&mut self) -> &mut Topology {
        &mut self.topology
    }

    /// Replaces the graph with `snapshot`.
    ///
    /// Live lights reference owners of the old graph, so a successful import
    /// drops every list, releases the whole light budget and blanks the
    /// frame. A failed import changes nothing.
    ///
    /// # Errors
    ///
    /// The first inconsistency found in the snapshot.
    pub fn import_snapshot(
        &mut self,
        snapshot: &TopologySnapshot,
        replace_models: bool,
    ) -> SnapshotResult<()> {
        self.topology.import_snapshot(snapshot, replace_models)?;
        let dropped = self.lists.len();
        self.lists.clear();
        self.total_lights = 0;
        self.pixels = PixelBuffer::new(usize::from(self.topology.real_pixel_count()));
        tracing::debug!("imported snapshot, dropped {} lists", dropped);
        Ok(())
    }

    /// The object layout.
    #[must_use]
    pub fn layout(&self) -> &dyn ObjectLayout {
        &*self.layout
    }

    // =========================================================================
    // CONTROL
    // =========================================================================

    /// Stops every list.
    ///
    /// # Returns
    ///
    /// How many lists were newly stopped.
    pub fn stop_all(&mut self, now: u64) -> usize {
        let mut stopped = 0;
        for (_, list) in self.lists.iter_mut() {
            if list.stop(now) {
                stopped += 1;
            }
        }
        stopped
    }

    /// Stops the list in `slot`.
    pub fn stop_note(&mut self, slot: u8, now: u64) -> bool {
        self.list_mut(slot).is_some_and(|list| list.stop(now))
    }

    /// Adds one split to every list.
    pub fn split_all(&mut self) {
        for (_, list) in self.lists.iter_mut() {
            list.split();
        }
    }

    /// Gives every list a new random color.
    pub fn color_all(&mut self) {
        for (_, list) in self.lists.iter_mut() {
            list.recolor(random_color(&mut self.random));
        }
    }

    /// Whether output is enabled.
    #[inline]
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.on
    }

    /// Enables or blanks output. The simulation keeps running.
    pub fn set_on(&mut self, on: bool) {
        self.on = on;
    }

    /// Whether auto-emission is enabled.
    #[inline]
    #[must_use]
    pub const fn auto_emit_enabled(&self) -> bool {
        self.auto_enabled
    }

    /// Enables or disables auto-emission.
    pub fn set_auto_emit(&mut self, enabled: bool) {
        self.auto_enabled = enabled;
    }

    /// Selects the built-in palette used by `palette_color`.
    pub fn set_palette(&mut self, index: usize) {
        self.current_palette = index % palette_count();
    }

    /// Color `index / 255` along the current palette, dimmed.
    #[must_use]
    pub fn palette_color(&self, index: u8, max_brightness: u8) -> ColorRGB {
        palette_at(self.current_palette)
            .color_at(f32::from(index) / 255.0)
            .dim(max_brightness)
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("pixel_count", &self.topology.pixel_count())
            .field("lists", &self.lists.len())
            .field("total_lights", &self.total_lights)
            .field("on", &self.on)
            .field("auto_enabled", &self.auto_enabled)
            .finish_non_exhaustive()
    }
}
