//! # Topology Arena
//!
//! Owns every intersection, connection, port and model of one physical
//! object. Objects live in id-keyed maps; each intersection and
//! connection is also filed under one of eight groups so emitters can be
//! looked up by group mask.
//!
//! ## Group Order
//!
//! Indexed lookups walk group 0 to group 7 and, inside a group, follow
//! insertion order. A mask of `0` selects every group.
//!
//! ## Gaps
//!
//! A gap is a closed range of logical pixels with no physical LED behind
//! it. Routing works in logical pixels; only the compositor translates to
//! physical ones.

use std::collections::BTreeMap;

use lightpath_shared::{groups, MAX_GROUPS};
use serde::{Deserialize, Serialize};

use super::connection::{Connection, PixelSpan};
use super::ids::{ConnectionId, IntersectionId, ModelId, PortId};
use super::intersection::Intersection;
use super::model::Model;
use super::port::Port;

/// A closed range of logical pixels without physical LEDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelGap {
    /// First logical pixel of the gap.
    pub from: u16,
    /// Last logical pixel of the gap.
    pub to: u16,
}

impl PixelGap {
    /// Number of pixels covered.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> u16 {
        self.to - self.from + 1
    }

    /// Always false: a gap covers at least one pixel.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Whether the gap covers `pixel`.
    #[inline]
    #[must_use]
    pub const fn contains(&self, pixel: u16) -> bool {
        pixel >= self.from && pixel <= self.to
    }
}

/// The graph of one physical object.
#[derive(Clone, Debug)]
pub struct Topology {
    pixel_count: u16,
    gaps: Vec<PixelGap>,
    intersections: BTreeMap<IntersectionId, Intersection>,
    connections: BTreeMap<ConnectionId, Connection>,
    ports: BTreeMap<PortId, Port>,
    models: BTreeMap<ModelId, Model>,
    intersection_groups: [Vec<IntersectionId>; MAX_GROUPS],
    connection_groups: [Vec<ConnectionId>; MAX_GROUPS],
    next_intersection: u32,
    next_port: u32,
    next_connection: u32,
}

impl Topology {
    /// Creates an empty topology over `pixel_count` logical pixels.
    #[must_use]
    pub fn new(pixel_count: u16) -> Self {
        Self {
            pixel_count,
            gaps: Vec::new(),
            intersections: BTreeMap::new(),
            connections: BTreeMap::new(),
            ports: BTreeMap::new(),
            models: BTreeMap::new(),
            intersection_groups: Default::default(),
            connection_groups: Default::default(),
            next_intersection: 0,
            next_port: 0,
            next_connection: 0,
        }
    }

    /// Logical pixel count.
    #[inline]
    #[must_use]
    pub const fn pixel_count(&self) -> u16 {
        self.pixel_count
    }

    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Adds an intersection with `num_ports` empty slots.
    ///
    /// # Returns
    ///
    /// `None` (with a warning) once every intersection id was handed out.
    /// Ids of removed intersections are not reused.
    pub fn add_intersection(
        &mut self,
        num_ports: u8,
        top_pixel: u16,
        bottom_pixel: Option<u16>,
        group: u8,
    ) -> Option<IntersectionId> {
        let Ok(raw) = u16::try_from(self.next_intersection) else {
            tracing::warn!("intersection ids exhausted");
            return None;
        };
        let id = IntersectionId(raw);
        self.next_intersection += 1;
        self.insert_intersection(Intersection::new(id, num_ports, top_pixel, bottom_pixel, group));
        Some(id)
    }

    pub(crate) fn insert_intersection(&mut self, intersection: Intersection) {
        self.intersection_groups[groups::index_of(intersection.group)].push(intersection.id);
        self.intersections.insert(intersection.id, intersection);
    }

    /// Connects two intersections.
    ///
    /// The LED count is `force_num_leds` when given, otherwise computed
    /// from the endpoint pixels (0 yields a logical bridge).
    ///
    /// # Returns
    ///
    /// `None` (with a warning) when an endpoint is unknown, both ends are
    /// the same intersection, an endpoint has no free port slot or the
    /// port ids ran out.
    pub fn add_connection(
        &mut self,
        from: IntersectionId,
        to: IntersectionId,
        group: u8,
        force_num_leds: Option<u16>,
    ) -> Option<ConnectionId> {
        if from == to {
            tracing::warn!("refusing to connect {} to itself", from);
            return None;
        }
        let (Some(from_node), Some(to_node)) =
            (self.intersections.get(&from), self.intersections.get(&to))
        else {
            tracing::warn!("cannot connect {} -> {}: unknown intersection", from, to);
            return None;
        };
        if !from_node.has_free_slot() || !to_node.has_free_slot() {
            tracing::warn!("cannot connect {} -> {}: no free port", from, to);
            return None;
        }

        let (Ok(from_raw), Ok(to_raw)) = (
            u16::try_from(self.next_port),
            u16::try_from(self.next_port + 1),
        ) else {
            tracing::warn!("cannot connect {} -> {}: port ids exhausted", from, to);
            return None;
        };
        let from_port = PortId(from_raw);
        let to_port = PortId(to_raw);
        self.next_port += 2;

        if let Some(node) = self.intersections.get_mut(&from) {
            node.add_port(from_port);
        }
        if let Some(node) = self.intersections.get_mut(&to) {
            node.add_port(to_port);
        }

        self.attach_connection((from, to), (from_port, to_port), group, force_num_leds)
    }

    /// Creates the connection record for two ports already sitting in
    /// their intersections' slots.
    pub(crate) fn attach_connection(
        &mut self,
        ends: (IntersectionId, IntersectionId),
        ports: (PortId, PortId),
        group: u8,
        force_num_leds: Option<u16>,
    ) -> Option<ConnectionId> {
        let from_node = self.intersections.get(&ends.0)?;
        let to_node = self.intersections.get(&ends.1)?;
        let (span, computed) = PixelSpan::resolve(from_node, to_node, self.pixel_count);
        let num_leds = force_num_leds.unwrap_or(computed);

        let id = ConnectionId(self.next_connection);
        self.next_connection = self.next_connection.checked_add(1)?;

        for (port, intersection, direction) in [(ports.0, ends.0, false), (ports.1, ends.1, true)] {
            self.ports.insert(
                port,
                Port {
                    id: port,
                    intersection,
                    connection: id,
                    direction,
                    group,
                },
            );
        }

        let connection = Connection::new(id, ends, ports, group, span, num_leds);
        tracing::trace!(
            "connection {} {} -> {} with {} leds",
            id,
            ends.0,
            ends.1,
            num_leds
        );
        self.connection_groups[groups::index_of(group)].push(id);
        self.connections.insert(id, connection);
        Some(id)
    }

    /// Adds two intersections and the connection between them.
    ///
    /// # Returns
    ///
    /// `None` when any of the three additions fails; both intersections
    /// are removed again in that case.
    pub fn add_bridge(
        &mut self,
        from_pixel: u16,
        to_pixel: u16,
        group: u8,
        num_ports: u8,
    ) -> Option<ConnectionId> {
        let from = self.add_intersection(num_ports, from_pixel, None, group)?;
        let connection = self
            .add_intersection(num_ports, to_pixel, None, group)
            .and_then(|to| {
                let connection = self.add_connection(from, to, group, None);
                if connection.is_none() {
                    self.remove_intersection(to);
                }
                connection
            });
        if connection.is_none() {
            self.remove_intersection(from);
        }
        connection
    }

    /// Registers a model under its own id, replacing any model with the
    /// same id.
    pub fn add_model(&mut self, model: Model) -> ModelId {
        let id = model.id;
        if self.models.insert(id, model).is_some() {
            tracing::debug!("model {} replaced", id);
        }
        id
    }

    /// Removes a model.
    pub fn remove_model(&mut self, id: ModelId) -> bool {
        self.models.remove(&id).is_some()
    }

    /// Registers a closed gap of logical pixels.
    ///
    /// # Returns
    ///
    /// `false` (with a warning) for an inverted, out-of-range or
    /// overlapping gap.
    pub fn add_gap(&mut self, from: u16, to: u16) -> bool {
        let gap = PixelGap { from, to };
        if from > to || to >= self.pixel_count {
            tracing::warn!("gap {}..={} outside 0..{}", from, to, self.pixel_count);
            return false;
        }
        if self
            .gaps
            .iter()
            .any(|other| other.contains(from) || other.contains(to) || gap.contains(other.from))
        {
            tracing::warn!("gap {}..={} overlaps an existing gap", from, to);
            return false;
        }
        let at = self.gaps.partition_point(|other| other.from < from);
        self.gaps.insert(at, gap);
        true
    }

    // =========================================================================
    // REMOVAL
    // =========================================================================

    /// Removes a connection, detaching its ports and scrubbing them from
    /// every model.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let Some(connection) = self.connections.remove(&id) else {
            return false;
        };

        for (port, intersection) in [
            (connection.from_port, connection.from),
            (connection.to_port, connection.to),
        ] {
            if let Some(node) = self.intersections.get_mut(&intersection) {
                node.remove_port(port);
            }
            self.ports.remove(&port);
            for model in self.models.values_mut() {
                model.remove_port(port);
            }
        }

        self.connection_groups[groups::index_of(connection.group)].retain(|c| *c != id);
        true
    }

    /// Removes the `index`-th connection of group `group_index`.
    pub fn remove_connection_at(&mut self, group_index: usize, index: usize) -> bool {
        let id = self
            .connection_groups
            .get(group_index)
            .and_then(|ids| ids.get(index))
            .copied();
        id.is_some_and(|id| self.remove_connection(id))
    }

    /// Removes an intersection and every connection touching it.
    pub fn remove_intersection(&mut self, id: IntersectionId) -> bool {
        let Some(group) = self.intersections.get(&id).map(|node| node.group) else {
            return false;
        };
        let touching: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.from == id || c.to == id)
            .map(|c| c.id)
            .collect();
        for connection in touching {
            self.remove_connection(connection);
        }
        self.intersections.remove(&id);
        self.intersection_groups[groups::index_of(group)].retain(|i| *i != id);
        true
    }

    /// Drops every graph object and gap, keeping models and id counters.
    pub(crate) fn clear_graph(&mut self) {
        self.intersections.clear();
        self.connections.clear();
        self.ports.clear();
        self.gaps.clear();
        for group in &mut self.intersection_groups {
            group.clear();
        }
        for group in &mut self.connection_groups {
            group.clear();
        }
    }

    pub(crate) fn set_pixel_count(&mut self, pixel_count: u16) {
        self.pixel_count = pixel_count;
    }

    pub(crate) fn replace_models(&mut self, models: BTreeMap<ModelId, Model>) {
        self.models = models;
    }

    pub(crate) fn models_mut(&mut self) -> impl Iterator<Item = &mut Model> {
        self.models.values_mut()
    }

    pub(crate) fn intersection_mut(&mut self, id: IntersectionId) -> Option<&mut Intersection> {
        self.intersections.get_mut(&id)
    }

    pub(crate) fn push_gap(&mut self, gap: PixelGap) {
        let at = self.gaps.partition_point(|other| other.from < gap.from);
        self.gaps.insert(at, gap);
    }

    pub(crate) fn advance_counters(&mut self, intersection: u32, port: u32) {
        self.next_intersection = self.next_intersection.max(intersection);
        self.next_port = self.next_port.max(port);
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Intersection by id.
    #[must_use]
    pub fn intersection(&self, id: IntersectionId) -> Option<&Intersection> {
        self.intersections.get(&id)
    }

    /// Connection by id.
    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    /// Port by id.
    #[must_use]
    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    /// The connection a port terminates.
    #[must_use]
    pub fn port_connection(&self, id: PortId) -> Option<&Connection> {
        self.ports
            .get(&id)
            .and_then(|port| self.connections.get(&port.connection))
    }

    /// Model by id.
    #[must_use]
    pub fn model(&self, id: ModelId) -> Option<&Model> {
        self.models.get(&id)
    }

    /// Mutable model by id.
    pub fn model_mut(&mut self, id: ModelId) -> Option<&mut Model> {
        self.models.get_mut(&id)
    }

    /// Models ordered by id.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Number of registered models.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Intersections ordered by id.
    pub fn intersections(&self) -> impl Iterator<Item = &Intersection> {
        self.intersections.values()
    }

    /// Connections ordered by id.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Ports ordered by id.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.values()
    }

    /// Total number of intersections.
    #[must_use]
    pub fn intersection_total(&self) -> usize {
        self.intersections.len()
    }

    /// Total number of connections.
    #[must_use]
    pub fn connection_total(&self) -> usize {
        self.connections.len()
    }

    // =========================================================================
    // GROUP QUERIES
    // =========================================================================

    fn selected<T>(lists: &[Vec<T>; MAX_GROUPS], mask: u8) -> impl Iterator<Item = &T> {
        lists
            .iter()
            .enumerate()
            .filter(move |(index, _)| groups::selects(mask, *index))
            .flat_map(|(_, ids)| ids.iter())
    }

    /// Number of intersections in the groups of `mask`.
    #[must_use]
    pub fn count_intersections(&self, mask: u8) -> usize {
        Self::selected(&self.intersection_groups, mask).count()
    }

    /// Number of connections in the groups of `mask`.
    #[must_use]
    pub fn count_connections(&self, mask: u8) -> usize {
        Self::selected(&self.connection_groups, mask).count()
    }

    /// The `index`-th intersection in the groups of `mask`.
    #[must_use]
    pub fn get_intersection(&self, index: usize, mask: u8) -> Option<&Intersection> {
        Self::selected(&self.intersection_groups, mask)
            .nth(index)
            .and_then(|id| self.intersections.get(id))
    }

    /// The `index`-th connection in the groups of `mask`.
    #[must_use]
    pub fn get_connection(&self, index: usize, mask: u8) -> Option<&Connection> {
        Self::selected(&self.connection_groups, mask)
            .nth(index)
            .and_then(|id| self.connections.get(id))
    }

    // =========================================================================
    // PIXELS
    // =========================================================================

    /// Registered gaps, ordered by first pixel.
    #[must_use]
    pub fn gaps(&self) -> &[PixelGap] {
        &self.gaps
    }

    /// Whether a logical pixel has no physical LED.
    #[must_use]
    pub fn is_pixel_in_gap(&self, logical: u16) -> bool {
        self.gaps.iter().any(|gap| gap.contains(logical))
    }

    /// Physical index of a logical pixel, `None` inside a gap.
    #[must_use]
    pub fn translate_to_real_pixel(&self, logical: u16) -> Option<u16> {
        let mut real = logical;
        for gap in &self.gaps {
            if gap.contains(logical) {
                return None;
            }
            if logical > gap.to {
                real -= gap.len();
            }
        }
        Some(real)
    }

    /// Logical index of a physical pixel.
    #[must_use]
    pub fn translate_to_logical_pixel(&self, real: u16) -> u16 {
        let mut logical = real;
        for gap in &self.gaps {
            if logical >= gap.from {
                logical = logical.saturating_add(gap.len());
            }
        }
        logical
    }

    /// Number of physical pixels.
    #[must_use]
    pub fn real_pixel_count(&self) -> u16 {
        let hidden: u16 = self.gaps.iter().map(PixelGap::len).sum();
        self.pixel_count.saturating_sub(hidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightpath_shared::groups::{GROUP1, GROUP2};

    fn line(pixel_count: u16) -> (Topology, IntersectionId, IntersectionId, ConnectionId) {
        let mut topology = Topology::new(pixel_count);
        let a = topology.add_intersection(2, 0, None, GROUP1).unwrap();
        let b = topology
            .add_intersection(2, pixel_count - 1, None, GROUP1)
            .unwrap();
        let c = topology
            .add_connection(a, b, GROUP1, Some(pixel_count - 3))
            .unwrap();
        (topology, a, b, c)
    }

    #[test]
    fn test_add_connection_creates_ports() {
        let (topology, a, b, c) = line(30);
        let connection = topology.connection(c).unwrap();
        assert_eq!(connection.num_leds, 27);
        assert_eq!(topology.port(connection.from_port).unwrap().intersection, a);
        assert!(topology.port(connection.to_port).unwrap().direction);
        assert!(topology.intersection(b).unwrap().has_port(connection.to_port));
    }

    #[test]
    fn test_add_connection_rejects_unknown_and_full() {
        let (mut topology, a, b, _) = line(30);
        assert!(topology.add_connection(a, IntersectionId(99), GROUP1, None).is_none());
        assert!(topology.add_connection(a, b, GROUP1, None).is_some());
        assert!(topology.add_connection(a, b, GROUP1, None).is_none());
        assert!(topology.add_connection(a, a, GROUP1, None).is_none());
    }

    #[test]
    fn test_remove_connection_scrubs_models() {
        let (mut topology, a, _, c) = line(30);
        let connection = topology.connection(c).unwrap().clone();
        let mut model = Model::new(0, 1, GROUP1);
        model.put_connection(&connection, 5, 6);
        topology.add_model(model);

        assert!(topology.remove_connection(c));
        assert!(!topology.remove_connection(c));
        assert!(topology.port(connection.from_port).is_none());
        assert!(!topology.intersection(a).unwrap().has_port(connection.from_port));
        assert_eq!(topology.model(0).unwrap().weight_count(), 0);
        assert_eq!(topology.count_connections(0), 0);
    }

    #[test]
    fn test_remove_intersection_removes_touching_connections() {
        let (mut topology, a, b, _) = line(30);
        assert!(topology.remove_intersection(a));
        assert!(!topology.remove_intersection(a));
        assert_eq!(topology.connection_total(), 0);
        assert_eq!(topology.intersection(b).unwrap().connected_count(), 0);
    }

    #[test]
    fn test_group_order() {
        let mut topology = Topology::new(100);
        let g2 = topology.add_intersection(2, 10, None, GROUP2).unwrap();
        let g1 = topology.add_intersection(2, 20, None, GROUP1).unwrap();
        let untagged = topology.add_intersection(2, 30, None, 0).unwrap();

        assert_eq!(topology.count_intersections(0), 3);
        assert_eq!(topology.count_intersections(GROUP2), 1);
        assert_eq!(topology.get_intersection(0, 0).unwrap().id, g1);
        assert_eq!(topology.get_intersection(1, 0).unwrap().id, untagged);
        assert_eq!(topology.get_intersection(2, 0).unwrap().id, g2);
        assert_eq!(topology.get_intersection(0, GROUP2).unwrap().id, g2);
        assert!(topology.get_intersection(1, GROUP2).is_none());
    }

    #[test]
    fn test_failed_bridge_leaves_no_intersections() {
        let mut topology = Topology::new(100);
        assert!(topology.add_bridge(10, 20, GROUP1, 0).is_none());
        assert_eq!(topology.intersection_total(), 0);
        assert_eq!(topology.count_intersections(GROUP1), 0);

        let bridge = topology.add_bridge(10, 20, GROUP1, 2).unwrap();
        assert_eq!(topology.intersection_total(), 2);
        assert_eq!(topology.connection(bridge).unwrap().num_leds, 9);
    }

    #[test]
    fn test_ids_never_wrap() {
        let mut topology = Topology::new(100);
        topology.advance_counters(u32::from(u16::MAX), u32::from(u16::MAX));
        let last = topology.add_intersection(2, 0, None, GROUP1).unwrap();
        assert_eq!(last, IntersectionId(u16::MAX));
        assert!(topology.add_intersection(2, 50, None, GROUP1).is_none());
        assert_eq!(topology.intersection_total(), 1);

        let mut topology = Topology::new(100);
        let a = topology.add_intersection(2, 0, None, GROUP1).unwrap();
        let b = topology.add_intersection(2, 50, None, GROUP1).unwrap();
        topology.advance_counters(0, u32::from(u16::MAX));
        assert!(topology.add_connection(a, b, GROUP1, None).is_none());
        assert_eq!(topology.intersection(a).unwrap().connected_count(), 0);
        assert_eq!(topology.connection_total(), 0);
    }

    #[test]
    fn test_remove_connection_at() {
        let (mut topology, _, _, _) = line(30);
        assert!(!topology.remove_connection_at(0, 1));
        assert!(!topology.remove_connection_at(9, 0));
        assert!(topology.remove_connection_at(0, 0));
    }

    #[test]
    fn test_gap_translation() {
        let mut topology = Topology::new(100);
        assert!(topology.add_gap(10, 19));
        assert!(topology.add_gap(50, 54));
        assert!(!topology.add_gap(15, 30));
        assert!(!topology.add_gap(99, 100));
        assert!(!topology.add_gap(5, 4));

        assert_eq!(topology.real_pixel_count(), 85);
        assert!(topology.is_pixel_in_gap(12));
        assert_eq!(topology.translate_to_real_pixel(12), None);
        assert_eq!(topology.translate_to_real_pixel(9), Some(9));
        assert_eq!(topology.translate_to_real_pixel(20), Some(10));
        assert_eq!(topology.translate_to_real_pixel(60), Some(45));
        assert_eq!(topology.translate_to_logical_pixel(10), 20);
        assert_eq!(topology.translate_to_logical_pixel(45), 60);
    }
}
