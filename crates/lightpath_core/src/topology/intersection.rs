//! # Intersections
//!
//! Graph nodes. An intersection owns a fixed number of port slots and
//! a primary pixel (plus an optional secondary pixel where two physical
//! strips cross). Lights dwell on the primary pixel for one position
//! unit, then leave through a port picked by the list's model.
//!
//! ## Port Choice
//!
//! 1. Follow the preceding light of the chain if it already chose a
//!    port here.
//! 2. Otherwise draw proportionally to the model's weights for the
//!    arrival port.
//! 3. With all weights zero, pick uniformly under the bounce policy.
//! 4. A 2-port intersection falls back to its other port.

use crate::runtime::{LightContext, LightRender, RuntimeLight};

use super::ids::{IntersectionId, PortId};
use super::owner::Owner;

/// A graph node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intersection {
    /// Stable id.
    pub id: IntersectionId,
    /// Pixel the intersection renders on.
    pub top_pixel: u16,
    /// Second pixel of the same physical point, if any.
    pub bottom_pixel: Option<u16>,
    /// Group mask.
    pub group: u8,
    ports: Box<[Option<PortId>]>,
}

impl Intersection {
    /// Creates an intersection with `num_ports` empty slots.
    #[must_use]
    pub fn new(
        id: IntersectionId,
        num_ports: u8,
        top_pixel: u16,
        bottom_pixel: Option<u16>,
        group: u8,
    ) -> Self {
        Self {
            id,
            top_pixel,
            bottom_pixel,
            group,
            ports: vec![None; usize::from(num_ports)].into_boxed_slice(),
        }
    }

    /// Port capacity.
    #[inline]
    #[must_use]
    pub fn num_ports(&self) -> u8 {
        self.ports.len() as u8
    }

    /// The slot array.
    #[inline]
    #[must_use]
    pub fn ports(&self) -> &[Option<PortId>] {
        &self.ports
    }

    /// Attached ports in slot order.
    pub fn connected_ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.ports.iter().flatten().copied()
    }

    /// Number of attached ports.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.ports.iter().flatten().count()
    }

    /// Whether `port` is attached here.
    #[must_use]
    pub fn has_port(&self, port: PortId) -> bool {
        self.ports.contains(&Some(port))
    }

    /// Whether a slot is free.
    #[must_use]
    pub fn has_free_slot(&self) -> bool {
        self.ports.contains(&None)
    }

    /// Slot index holding `port`.
    #[must_use]
    pub fn slot_of(&self, port: PortId) -> Option<u8> {
        self.ports
            .iter()
            .position(|slot| *slot == Some(port))
            .map(|slot| slot as u8)
    }

    /// Attaches a port to the first free slot.
    pub(crate) fn add_port(&mut self, port: PortId) -> Option<u8> {
        let slot = self.ports.iter().position(Option::is_none)?;
        self.ports[slot] = Some(port);
        Some(slot as u8)
    }

    /// Attaches a port to a specific slot (snapshot import).
    pub(crate) fn set_port(&mut self, slot: u8, port: PortId) -> bool {
        match self.ports.get_mut(usize::from(slot)) {
            Some(entry @ None) => {
                *entry = Some(port);
                true
            }
            _ => false,
        }
    }

    /// Detaches a port.
    pub(crate) fn remove_port(&mut self, port: PortId) -> bool {
        match self.ports.iter_mut().find(|slot| **slot == Some(port)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// Receives a freshly released light.
    ///
    /// On a 2-port intersection the light is pointed at the physical run:
    /// its arrival port is set to the zero-length bridge (or, when it
    /// must bounce, to the physical run itself).
    pub(crate) fn emit(&self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
        if self.ports.len() == 2 {
            let force_bounce = ctx.behaviour.force_bounce();
            let entry = self.connected_ports().find(|port| {
                let physical = ctx
                    .topology
                    .port_connection(*port)
                    .is_some_and(|connection| connection.num_leds > 0);
                physical == force_bounce
            });
            if entry.is_some() {
                light.in_port = entry;
            }
        }
        light.owner = Some(Owner::Intersection(self.id));
        self.arrive(light, ctx);
    }

    /// Applies color-change groups to an arriving light.
    pub(crate) fn arrive(&self, light: &mut RuntimeLight, ctx: &mut LightContext<'_>) {
        if ctx.behaviour.changes_color_at(self.group) {
            let color = crate::runtime::random_color(ctx.random);
            light.change_color(color, ctx.behaviour.smooth_changes());
        }
    }

    /// Renders, expires or routes a resident light.
    ///
    /// # Returns
    ///
    /// The owner the light was routed to.
    pub(crate) fn update(
        &self,
        light: &mut RuntimeLight,
        ctx: &mut LightContext<'_>,
    ) -> Option<Owner> {
        light.reset_pixels();

        if light.should_expire(ctx.now) {
            if light.speed == 0.0 || ctx.forces_expiry() || light.position >= 1.0 {
                light.expire();
            }
            return None;
        }

        if light.position < 0.0 {
            return None;
        }
        if light.position < 1.0 {
            light.render = LightRender::Pixel(self.top_pixel);
            return None;
        }

        let port = self
            .chained_port(ctx)
            .or_else(|| self.choose_port(light, ctx));
        let Some(port) = port else {
            tracing::debug!("no outgoing port at {}, expiring light", self.id);
            light.expire();
            return None;
        };

        light.set_out_port(Some(port), Some(self.id));
        light.in_port = None;
        light.position -= 1.0;
        light.owner = None;

        match ctx.topology.port_connection(port) {
            Some(connection) => Some(connection.enter(light)),
            None => {
                light.expire();
                None
            }
        }
    }

    /// The port the preceding light of the chain left through, if it is
    /// still attached here.
    fn chained_port(&self, ctx: &LightContext<'_>) -> Option<PortId> {
        ctx.prev_out_ports
            .and_then(|memory| memory.get(self.id))
            .filter(|port| self.has_port(*port))
    }

    /// Weighted draw over the model's weights for the arrival port.
    fn choose_port(&self, light: &RuntimeLight, ctx: &mut LightContext<'_>) -> Option<PortId> {
        let incoming = light.in_port;
        let sum: u32 = self
            .connected_ports()
            .map(|port| u32::from(ctx.model.get(port, incoming)))
            .sum();

        if sum == 0 {
            return self
                .random_port(incoming, ctx)
                .or_else(|| self.pass_through(incoming));
        }

        let mut roll = ctx.random.below(sum);
        for port in self.connected_ports() {
            let weight = u32::from(ctx.model.get(port, incoming));
            if Some(port) == incoming || weight == 0 {
                continue;
            }
            if roll < weight {
                return Some(port);
            }
            roll -= weight;
        }

        self.pass_through(incoming)
    }

    /// Uniform pick under the bounce policy: force-bounce alone keeps only
    /// the arrival port, allow-bounce keeps every port, otherwise the
    /// arrival port is excluded.
    fn random_port(&self, incoming: Option<PortId>, ctx: &mut LightContext<'_>) -> Option<PortId> {
        let behaviour = ctx.behaviour;
        let keep = |port: &PortId| {
            if behaviour.allow_bounce() {
                true
            } else if behaviour.force_bounce() {
                Some(*port) == incoming
            } else {
                Some(*port) != incoming
            }
        };

        let count = self.connected_ports().filter(keep).count() as u32;
        if count == 0 {
            return None;
        }
        let pick = ctx.random.below(count) as usize;
        self.connected_ports().filter(keep).nth(pick)
    }

    /// Straight-through fallback of a 2-port intersection.
    fn pass_through(&self, incoming: Option<PortId>) -> Option<PortId> {
        if self.ports.len() != 2 {
            return None;
        }
        self.connected_ports().find(|port| Some(*port) != incoming)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Behaviour;
    use crate::topology::{Model, Topology};
    use lightpath_procedural::{Ease, Random};
    use lightpath_shared::{BehaviourFlags, ColorRGB};

    fn context<'a>(
        topology: &'a Topology,
        model: &'a Model,
        behaviour: &'a Behaviour,
        random: &'a mut Random,
    ) -> LightContext<'a> {
        LightContext {
            topology,
            model,
            behaviour,
            ease: Ease::default(),
            stopped: false,
            now: 0,
            random,
            prev_out_ports: None,
        }
    }

    /// A 4-port hub at pixel 50 with spokes at pixels 0, 20, 80 and 99.
    fn hub() -> (Topology, IntersectionId, Vec<PortId>) {
        let mut topology = Topology::new(100);
        let hub = topology.add_intersection(4, 50, None, 1).unwrap();
        let mut ports = Vec::new();
        for pixel in [0, 20, 80, 99] {
            let spoke = topology.add_intersection(2, pixel, None, 1).unwrap();
            let connection = topology.add_connection(hub, spoke, 1, Some(10)).unwrap();
            ports.push(topology.connection(connection).unwrap().from_port);
        }
        (topology, hub, ports)
    }

    #[test]
    fn test_weighted_draw_follows_weights() {
        let (topology, hub, ports) = hub();
        let mut model = Model::new(0, 0, 1);
        model.put(ports[1], 3);
        model.put(ports[2], 1);
        model.put(ports[3], 0);
        let behaviour = Behaviour::default();
        let mut random = Random::with_seed(21);
        let mut ctx = context(&topology, &model, &behaviour, &mut random);
        let node = topology.intersection(hub).unwrap();

        let mut light = RuntimeLight::new(0, 255, 1.0, ColorRGB::WHITE);
        light.in_port = Some(ports[0]);
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            let port = node.choose_port(&light, &mut ctx).unwrap();
            let index = ports.iter().position(|p| *p == port).unwrap();
            counts[index] += 1;
        }

        assert_eq!(counts[0], 0, "{counts:?}");
        assert_eq!(counts[3], 0, "{counts:?}");
        assert!(counts[1].abs_diff(3000) <= 300, "{counts:?}");
        assert!(counts[2].abs_diff(1000) <= 300, "{counts:?}");
    }

    #[test]
    fn test_emit_enters_through_first_matching_port() {
        let mut topology = Topology::new(100);
        let a = topology.add_intersection(2, 50, None, 1).unwrap();
        let left = topology.add_intersection(2, 10, None, 1).unwrap();
        let right = topology.add_intersection(2, 90, None, 1).unwrap();
        let first = topology.add_connection(a, left, 1, Some(30)).unwrap();
        topology.add_connection(a, right, 1, Some(30)).unwrap();
        let first_port = topology.connection(first).unwrap().from_port;

        let model = Model::new(0, 10, 1);
        let behaviour = Behaviour::new(BehaviourFlags::FORCE_BOUNCE, 0);
        let mut random = Random::with_seed(1);
        let mut ctx = context(&topology, &model, &behaviour, &mut random);
        let mut light = RuntimeLight::new(0, 255, 1.0, ColorRGB::WHITE);
        topology.intersection(a).unwrap().emit(&mut light, &mut ctx);

        assert_eq!(light.in_port, Some(first_port));
        assert_eq!(light.owner, Some(Owner::Intersection(a)));
    }

    #[test]
    fn test_slots() {
        let mut intersection = Intersection::new(IntersectionId(0), 2, 0, None, 1);
        assert_eq!(intersection.add_port(PortId(1)), Some(0));
        assert_eq!(intersection.add_port(PortId(2)), Some(1));
        assert_eq!(intersection.add_port(PortId(3)), None);
        assert_eq!(intersection.connected_count(), 2);

        assert!(intersection.remove_port(PortId(1)));
        assert!(!intersection.remove_port(PortId(1)));
        assert_eq!(intersection.slot_of(PortId(2)), Some(1));
        assert!(intersection.has_free_slot());
        assert_eq!(intersection.add_port(PortId(4)), Some(0));
    }

    #[test]
    fn test_set_port_rejects_taken_or_missing_slot() {
        let mut intersection = Intersection::new(IntersectionId(0), 2, 0, None, 1);
        assert!(intersection.set_port(1, PortId(7)));
        assert!(!intersection.set_port(1, PortId(8)));
        assert!(!intersection.set_port(2, PortId(9)));
        assert_eq!(intersection.ports(), &[None, Some(PortId(7))]);
    }
}
