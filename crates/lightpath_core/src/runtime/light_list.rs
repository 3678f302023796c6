//! # Light Lists
//!
//! One emission: a batch of lights released from a common emitter and
//! advanced together.
//!
//! ## Layout
//!
//! ```text
//! [ lead ... | body ... | trail ... ]
//!   fade in    full       fade out
//! ```
//!
//! Lead and trail lights are tapered so a moving list looks like a comet.
//! Which end gets the taper depends on the list's head alignment.
//!
//! ## Lifecycle
//!
//! `Configuring` → `Seeded` → `Emitting` → `Active` → `Draining` → `Empty`.
//! A retriggered note goes back to `Configuring` in place.

use lightpath_procedural::{Ease, NoiseField, Random};
use lightpath_shared::{
    ColorRGB, ListHead, ListOrder, FRAME_MS, FULL_BRIGHTNESS, INFINITE_DURATION,
};

use crate::topology::{Model, ModelId, Owner, Topology};

use super::behaviour::Behaviour;
use super::context::LightContext;
use super::emit_params::EmitParams;
use super::light::{OutPortMemory, RuntimeLight};
use super::palette::{random_color, Palette};

/// Where a list is in its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ListPhase {
    /// Parameters applied, no lights yet.
    #[default]
    Configuring,
    /// Lights created and positioned, none released.
    Seeded,
    /// Some lights released.
    Emitting,
    /// Every light released.
    Active,
    /// Stopped; lights are expiring.
    Draining,
    /// Every light expired; the slot can be reclaimed.
    Empty,
}

/// Shared borrows for one list update.
pub struct TickContext<'a> {
    /// The graph.
    pub topology: &'a Topology,
    /// The list's model.
    pub model: &'a Model,
    /// Random stream.
    pub random: &'a mut Random,
    /// Noise field for brightness modulation.
    pub noise: &'a NoiseField,
    /// Current timestamp in milliseconds.
    pub now: u64,
}

/// A managed batch of lights.
#[derive(Clone, Debug)]
pub struct LightList {
    /// Process-unique list id, used as a noise coordinate.
    pub id: u16,
    /// Whether the compositor paints this list.
    pub visible: bool,
    lights: Vec<Option<RuntimeLight>>,
    lead: u16,
    body: u16,
    trail: u16,
    behaviour: Behaviour,
    model: ModelId,
    emitter: Option<Owner>,
    order: ListOrder,
    head: ListHead,
    linked: bool,
    min_bri: u8,
    max_bri: u8,
    speed: f32,
    ease: Ease,
    fade_speed: u16,
    fade_thresh: u16,
    fade_ease: Ease,
    note_id: u8,
    duration_ms: Option<u64>,
    life_millis: u64,
    color: ColorRGB,
    palette: Option<Palette>,
    emit_offset: u16,
    max_position: u16,
    num_emitted: u16,
    num_splits: u16,
    stopped: bool,
    phase: ListPhase,
}

impl LightList {
    /// Applies emission parameters for a list of `length` lights.
    ///
    /// `max_position` bounds random initial positions (the model's
    /// maximum length). The list stays in `Configuring` until seeded.
    #[must_use]
    pub fn configure(
        id: u16,
        params: &EmitParams,
        length: u16,
        max_position: u16,
        random: &mut Random,
    ) -> Self {
        let trail_count = params.trail_count(length);
        let body = length.saturating_sub(trail_count).max(1);
        let (lead, trail) = split_head(params.head, trail_count);
        let color = match params.color {
            Some(color) => color,
            None => random_color(random),
        };

        Self {
            id,
            visible: true,
            lights: Vec::new(),
            lead,
            body,
            trail,
            behaviour: Behaviour::new(params.behaviour, params.color_change_groups),
            model: params.model,
            emitter: None,
            order: params.order,
            head: params.head,
            linked: params.linked,
            min_bri: params.min_bri,
            max_bri: params.max_bri,
            speed: params.speed,
            ease: params.ease,
            fade_speed: params.fade_speed,
            fade_thresh: params.fade_thresh,
            fade_ease: params.fade_ease,
            note_id: params.note_id,
            duration_ms: params.duration_ms,
            life_millis: INFINITE_DURATION,
            color,
            palette: params.palette.clone(),
            emit_offset: params.emit_offset,
            max_position,
            num_emitted: 0,
            num_splits: 0,
            stopped: false,
            phase: ListPhase::Configuring,
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Lifecycle phase.
    #[inline]
    #[must_use]
    pub const fn phase(&self) -> ListPhase {
        self.phase
    }

    /// Model the list routes with.
    #[inline]
    #[must_use]
    pub const fn model(&self) -> ModelId {
        self.model
    }

    /// Retrigger key; `0` means none.
    #[inline]
    #[must_use]
    pub const fn note_id(&self) -> u8 {
        self.note_id
    }

    /// Release order.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> ListOrder {
        self.order
    }

    /// Head alignment.
    #[inline]
    #[must_use]
    pub const fn head(&self) -> ListHead {
        self.head
    }

    /// Shared behaviour.
    #[inline]
    #[must_use]
    pub const fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    /// Release point.
    #[inline]
    #[must_use]
    pub const fn emitter(&self) -> Option<Owner> {
        self.emitter
    }

    /// Assigns the release point.
    pub fn set_emitter(&mut self, emitter: Owner) {
        self.emitter = Some(emitter);
    }

    /// Lead, body and trail counts.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (u16, u16, u16) {
        (self.lead, self.body, self.trail)
    }

    /// Lights the list holds budget for.
    #[inline]
    #[must_use]
    pub const fn num_lights(&self) -> u16 {
        self.lead + self.body + self.trail
    }

    /// Whether the list was stopped.
    #[inline]
    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Live lights in slot order.
    pub fn lights(&self) -> impl Iterator<Item = &RuntimeLight> {
        self.lights.iter().flatten()
    }

    /// Brightness multiplier of light `i` from the lead/trail taper.
    #[must_use]
    pub fn taper(&self, i: u16) -> f32 {
        if i < self.lead {
            f32::from(i + 1) / f32::from(self.lead + 1)
        } else if i >= self.lead + self.body {
            let j = i - (self.lead + self.body);
            1.0 - f32::from(j + 1) / f32::from(self.trail + 1)
        } else {
            1.0
        }
    }

    // =========================================================================
    // SEEDING
    // =========================================================================

    /// Creates and positions every light. Called on first emission and
    /// again on a note retrigger.
    pub fn seed(&mut self, now: u64, random: &mut Random, noise: &NoiseField) {
        self.num_emitted = 0;
        self.num_splits = 0;
        self.stopped = false;
        self.life_millis = self
            .duration_ms
            .map_or(INFINITE_DURATION, |duration| now.saturating_add(duration));

        let total = self.num_lights();
        let mut lights = std::mem::take(&mut self.lights);
        lights.clear();
        lights.reserve(usize::from(total));
        for i in 0..total {
            let max_bri = (f32::from(self.max_bri) * self.taper(i)) as u8;
            let color = self.light_color(i, random);
            let mut light = RuntimeLight::new(
                if self.linked { i } else { 0 },
                max_bri,
                self.speed,
                color,
            );
            light.life_millis = self.life_millis;
            self.init_position(i, &mut light, random);
            self.init_bri(i, &mut light, random, noise);
            self.init_life(i, &mut light, random);
            light.brightness = self.dynamics().brightness(i, &light, now, noise);
            lights.push(Some(light));
        }

        self.lights = lights;
        self.phase = ListPhase::Seeded;
    }

    /// Restarts the list in place for a retriggered note.
    ///
    /// The new parameters replace the old ones while the id, visibility and
    /// light buffer are kept. Every light is dropped and the list goes back
    /// to `Configuring` until seeded again.
    pub fn reset(
        &mut self,
        params: &EmitParams,
        length: u16,
        max_position: u16,
        random: &mut Random,
    ) {
        let mut lights = std::mem::take(&mut self.lights);
        lights.clear();
        let visible = self.visible;
        *self = Self::configure(self.id, params, length, max_position, random);
        self.visible = visible;
        self.lights = lights;
    }

    fn light_color(&self, i: u16, random: &mut Random) -> ColorRGB {
        if self.behaviour.random_color() {
            return random_color(random);
        }
        match &self.palette {
            Some(palette) => {
                let total = self.num_lights();
                let perc = if total > 1 {
                    f32::from(i) / f32::from(total - 1)
                } else {
                    0.0
                };
                palette.color_at(perc)
            }
            None => self.color,
        }
    }

    fn init_position(&self, i: u16, light: &mut RuntimeLight, random: &mut Random) {
        let mut position = if self.speed == 0.0 {
            f32::from(self.num_lights() - 1 - i)
        } else {
            -f32::from(i)
        };
        if self.order == ListOrder::Random {
            position = random.below(u32::from(self.max_position)) as f32;
        }
        light.position = position + f32::from(self.emit_offset);
    }

    fn init_bri(&self, i: u16, light: &mut RuntimeLight, random: &mut Random, noise: &NoiseField) {
        match self.order {
            ListOrder::Random if self.fade_thresh > 0 => {
                light.bri = random.below(u32::from(self.fade_thresh) * 3) as u16;
            }
            ListOrder::Noise => {
                let sample = noise.value(f64::from(self.id) * 10.0, f64::from(i) * 100.0);
                light.bri = (sample * f64::from(FULL_BRIGHTNESS)) as u16;
            }
            _ => {}
        }
    }

    fn init_life(&self, i: u16, light: &mut RuntimeLight, random: &mut Random) {
        let mut life = light.life_millis;
        if self.order == ListOrder::Sequential && self.speed > 0.0 {
            let frames = (f32::from(i) / self.speed).ceil() as u64;
            life = life.saturating_add(frames * FRAME_MS);
        }
        if self.order == ListOrder::Offset {
            let span = u32::from(self.num_lights()).saturating_mul(FRAME_MS as u32);
            life = life.saturating_add(u64::from(random.below(span)));
        }
        light.life_millis = life;
    }

    fn dynamics(&self) -> Dynamics {
        Dynamics {
            id: self.id,
            min_bri: self.min_bri,
            fade_speed: self.fade_speed,
            fade_thresh: self.fade_thresh,
            fade_ease: self.fade_ease,
            noise_brightness: self.behaviour.constant_noise_brightness(),
        }
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    fn prev_out_ports(&self, index: usize) -> Option<OutPortMemory> {
        if !self.linked || index == 0 {
            return None;
        }
        let light = self.lights.get(index)?.as_ref()?;
        if light.idx == 0 {
            return None;
        }
        self.lights
            .get(index - 1)?
            .as_ref()
            .map(RuntimeLight::out_ports)
    }

    /// Releases queued lights whose position reached the emitter.
    pub fn do_emit(&mut self, tick: &mut TickContext<'_>) {
        let Some(emitter) = self.emitter else {
            tracing::warn!("list {} has no emitter", self.id);
            return;
        };

        while usize::from(self.num_emitted) < self.lights.len() {
            let index = usize::from(self.num_emitted);
            let prev = self.prev_out_ports(index);
            let Some(light) = self.lights[index].as_mut() else {
                self.num_emitted += 1;
                continue;
            };
            if light.position < 0.0 || light.is_expired {
                break;
            }
            self.num_emitted += 1;

            let mut ctx = LightContext {
                topology: tick.topology,
                model: tick.model,
                behaviour: &self.behaviour,
                ease: self.ease,
                stopped: self.stopped,
                now: tick.now,
                random: &mut *tick.random,
                prev_out_ports: prev,
            };
            emitter.emit(light, &mut ctx);
        }

        if self.phase != ListPhase::Draining && self.num_emitted > 0 {
            self.phase = if usize::from(self.num_emitted) >= self.lights.len() {
                ListPhase::Active
            } else {
                ListPhase::Emitting
            };
        }
    }

    /// Advances every light by one frame.
    ///
    /// # Returns
    ///
    /// `true` once every light has expired.
    pub fn update(&mut self, tick: &mut TickContext<'_>) -> bool {
        self.do_emit(tick);

        let mut all_expired = true;
        for index in 0..self.lights.len() {
            let expired = match &self.lights[index] {
                Some(light) => light.is_expired,
                None => continue,
            };
            if expired {
                if let Some(Some(next)) = self.lights.get_mut(index + 1) {
                    next.idx = 0;
                }
                self.lights[index] = None;
                continue;
            }
            all_expired = false;

            let prev = self.prev_out_ports(index);
            let Some(light) = self.lights[index].as_mut() else {
                continue;
            };
            let mut ctx = LightContext {
                topology: tick.topology,
                model: tick.model,
                behaviour: &self.behaviour,
                ease: self.ease,
                stopped: self.stopped,
                now: tick.now,
                random: &mut *tick.random,
                prev_out_ports: prev,
            };
            match light.owner {
                Some(owner) => owner.update(light, &mut ctx),
                None => {
                    if !light.emitted && light.should_expire(tick.now) {
                        light.expire();
                    }
                }
            }
        }

        let dynamics = self.dynamics();
        for (index, light) in self.lights.iter_mut().enumerate() {
            let Some(light) = light.as_mut().filter(|light| !light.is_expired) else {
                continue;
            };
            dynamics.advance(light);
            light.brightness = dynamics.brightness(index as u16, light, tick.now, tick.noise);
        }

        if all_expired {
            self.phase = ListPhase::Empty;
        }
        all_expired
    }

    // =========================================================================
    // CONTROL
    // =========================================================================

    /// Makes every light expire at `now`.
    ///
    /// # Returns
    ///
    /// `false` when the list was already stopped.
    pub fn stop(&mut self, now: u64) -> bool {
        if self.stopped {
            return false;
        }
        self.stopped = true;
        self.life_millis = self.life_millis.min(now);
        for light in self.lights.iter_mut().flatten() {
            light.life_millis = light.life_millis.min(now);
        }
        self.phase = ListPhase::Draining;
        true
    }

    /// Breaks the chain into one more independent segment.
    pub fn split(&mut self) {
        self.num_splits = self.num_splits.saturating_add(1);
        let total = self.lights.len();
        let splits = usize::from(self.num_splits);
        if splits >= total {
            return;
        }
        let spacing = total / (splits + 1);
        for i in 0..splits {
            if let Some(Some(light)) = self.lights.get_mut((i + 1) * spacing) {
                light.idx = 0;
            }
        }
    }

    /// Recolors every light.
    pub fn recolor(&mut self, color: ColorRGB) {
        self.color = color;
        let smooth = self.behaviour.smooth_changes();
        for light in self.lights.iter_mut().flatten() {
            light.change_color(color, smooth);
        }
    }
}

/// Per-frame brightness and motion settings, copied out of the list so
/// lights can be advanced while the list is mutably borrowed.
#[derive(Clone, Copy, Debug)]
struct Dynamics {
    id: u16,
    min_bri: u8,
    fade_speed: u16,
    fade_thresh: u16,
    fade_ease: Ease,
    noise_brightness: bool,
}

impl Dynamics {
    /// Moves the light and fades its brightness level.
    fn advance(self, light: &mut RuntimeLight) {
        light.position += light.speed;
        if self.fade_speed > 0 && light.bri > self.fade_thresh {
            light.bri = light
                .bri
                .saturating_sub(self.fade_speed)
                .max(self.fade_thresh);
        }
        light.blend_color();
    }

    /// Output brightness of light `index`.
    fn brightness(self, index: u16, light: &RuntimeLight, now: u64, noise: &NoiseField) -> u8 {
        let level = f32::from(light.bri.min(u16::from(FULL_BRIGHTNESS))) / 255.0;
        let mut factor = self.fade_ease.apply(level);
        if self.noise_brightness {
            let x = f64::from(self.id) * 10.0 + f64::from(index) * 100.0;
            factor *= noise.value(x, now as f64 / 1000.0) as f32;
        }
        let min = f32::from(self.min_bri);
        let max = f32::from(light.max_bri);
        (min + (max - min) * factor).round().clamp(0.0, 255.0) as u8
    }
}

/// Lead and trail counts for a trail of `trail` lights.
fn split_head(head: ListHead, trail: u16) -> (u16, u16) {
    match head {
        ListHead::Front if trail > 0 => (1, trail - 1),
        ListHead::Front => (0, 0),
        ListHead::Back => (trail, 0),
        ListHead::Middle => (trail / 2, trail.div_ceil(2)),
    }
}
