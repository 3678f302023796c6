//! # Routing Models
//!
//! A model is a routing program: for every outgoing port it stores a
//! `Weight`, and an intersection asks it how likely a light arriving
//! through one port is to leave through another.
//!
//! Ports without an entry fall back to the model's default weight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::connection::Connection;
use super::ids::{ModelId, PortId};
use super::weight::Weight;

/// How a model's weights are turned into a port choice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Draw proportionally to weight.
    #[default]
    WeightedRandom,
    /// Recorded and preserved; routing currently treats it like
    /// `WeightedRandom`.
    Deterministic,
}

/// A routing model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    /// Model index.
    pub id: ModelId,
    /// Weight for ports without an entry.
    pub default_weight: u8,
    /// Groups lights of this model are emitted from.
    pub emit_groups: u8,
    /// Longest list this model emits; 0 means the object's pixel count.
    pub max_length: u16,
    /// How weights become a port choice.
    pub routing_strategy: RoutingStrategy,
    weights: BTreeMap<PortId, Weight>,
}

impl Model {
    /// Creates a model with an empty weight table.
    #[must_use]
    pub fn new(id: ModelId, default_weight: u8, emit_groups: u8) -> Self {
        Self {
            id,
            default_weight,
            emit_groups,
            max_length: 0,
            routing_strategy: RoutingStrategy::WeightedRandom,
            weights: BTreeMap::new(),
        }
    }

    /// Sets the maximum list length.
    #[must_use]
    pub fn with_max_length(mut self, max_length: u16) -> Self {
        self.max_length = max_length;
        self
    }

    /// Sets the routing strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.routing_strategy = strategy;
        self
    }

    /// Maximum list length, falling back to `pixel_count`.
    #[inline]
    #[must_use]
    pub fn max_length_or(&self, pixel_count: u16) -> u16 {
        if self.max_length > 0 {
            self.max_length
        } else {
            pixel_count
        }
    }

    fn entry(&mut self, port: PortId) -> &mut Weight {
        let default = self.default_weight;
        self.weights
            .entry(port)
            .or_insert_with(|| Weight::new(default))
    }

    /// Sets the weight of leaving through `outgoing` when arriving through
    /// `incoming`, and symmetrically the reverse turn.
    pub fn put_turn(&mut self, outgoing: PortId, incoming: PortId, weight: u8) {
        self.entry(outgoing).add(incoming, weight);
        self.entry(incoming).add(outgoing, weight);
    }

    /// Sets the default weight of leaving through `outgoing`.
    pub fn put(&mut self, outgoing: PortId, weight: u8) {
        self.entry(outgoing).set_default_weight(weight);
    }

    /// Sets the weights of a connection's two ports: `from_weight` for
    /// leaving the `from` intersection, `to_weight` for leaving `to`.
    pub fn put_connection(&mut self, connection: &Connection, from_weight: u8, to_weight: u8) {
        self.put(connection.from_port, from_weight);
        self.put(connection.to_port, to_weight);
    }

    /// Replaces a port's weight entry wholesale (snapshot import).
    pub fn set_weight(&mut self, outgoing: PortId, weight: Weight) {
        self.weights.insert(outgoing, weight);
    }

    /// Weight of leaving through `outgoing` for a light that arrived
    /// through `incoming`. Turning back through the arrival port weighs 0.
    #[must_use]
    pub fn get(&self, outgoing: PortId, incoming: Option<PortId>) -> u8 {
        if incoming == Some(outgoing) {
            return 0;
        }
        self.weights
            .get(&outgoing)
            .map_or(self.default_weight, |weight| weight.get(incoming))
    }

    /// Forgets a port both as a key and as an override.
    pub fn remove_port(&mut self, port: PortId) {
        self.weights.remove(&port);
        for weight in self.weights.values_mut() {
            weight.remove(port);
        }
    }

    /// Number of ports with an explicit entry.
    #[must_use]
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    /// The weight table, ordered by port id.
    #[must_use]
    pub fn weights(&self) -> &BTreeMap<PortId, Weight> {
        &self.weights
    }

    /// Drops every entry or override naming a port `keep` rejects.
    pub fn retain_ports(&mut self, keep: impl Fn(PortId) -> bool) {
        self.weights.retain(|port, _| keep(*port));
        for weight in self.weights.values_mut() {
            let stale: Vec<PortId> = weight
                .conditional_weights()
                .keys()
                .copied()
                .filter(|port| !keep(*port))
                .collect();
            for port in stale {
                weight.remove(port);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weight_fallback() {
        let model = Model::new(0, 7, 0);
        assert_eq!(model.get(PortId(1), None), 7);
        assert_eq!(model.get(PortId(1), Some(PortId(2))), 7);
    }

    #[test]
    fn test_turning_back_weighs_zero() {
        let mut model = Model::new(0, 7, 0);
        model.put(PortId(1), 50);
        assert_eq!(model.get(PortId(1), Some(PortId(1))), 0);
        assert_eq!(model.get(PortId(1), None), 50);
    }

    #[test]
    fn test_turn_is_symmetric() {
        let mut model = Model::new(0, 1, 0);
        model.put_turn(PortId(1), PortId(2), 99);

        assert_eq!(model.get(PortId(1), Some(PortId(2))), 99);
        assert_eq!(model.get(PortId(2), Some(PortId(1))), 99);
        assert_eq!(model.get(PortId(1), Some(PortId(3))), 1);
        assert_eq!(model.weight_count(), 2);
    }

    #[test]
    fn test_remove_port_scrubs_overrides() {
        let mut model = Model::new(0, 1, 0);
        model.put_turn(PortId(1), PortId(2), 99);
        model.put_turn(PortId(3), PortId(2), 42);

        model.remove_port(PortId(2));

        assert_eq!(model.weight_count(), 2);
        assert_eq!(model.get(PortId(1), Some(PortId(2))), 1);
        assert!(model
            .weights()
            .values()
            .all(|w| w.conditional_weights().is_empty()));
    }

    #[test]
    fn test_max_length_fallback() {
        assert_eq!(Model::new(0, 1, 0).max_length_or(300), 300);
        assert_eq!(Model::new(0, 1, 0).with_max_length(32).max_length_or(300), 32);
    }
}
