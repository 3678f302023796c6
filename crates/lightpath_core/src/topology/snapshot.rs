//! # Topology Snapshots
//!
//! A flat, self-contained record of a topology's structure: intersections
//! with their ids, ports keyed by (intersection, slot), connections by
//! endpoint and port ids, gaps and every model's weight table.
//!
//! ## Import Rules
//!
//! 1. The whole snapshot is validated before anything is touched; a
//!    rejected snapshot leaves the topology exactly as it was
//! 2. Port ids are preserved, so imported weight tables stay valid
//! 3. Existing models are either replaced wholesale or kept, scrubbed of
//!    ports that no longer exist, and overwritten by imported ids
//! 4. The id generators move past the imported maxima
//!
//! Lights are not part of a snapshot.

use std::collections::{BTreeMap, BTreeSet};

use lightpath_shared::MAX_CONDITIONAL_WEIGHTS;
use serde::{Deserialize, Serialize};

use crate::error::{SnapshotError, SnapshotResult};

use super::graph::{PixelGap, Topology};
use super::ids::{IntersectionId, ModelId, PortId};
use super::intersection::Intersection;
use super::model::{Model, RoutingStrategy};
use super::weight::Weight;

// =============================================================================
// RECORDS
// =============================================================================

/// Structural record of a whole topology.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySnapshot {
    /// Logical pixel count.
    pub pixel_count: u16,
    /// Intersections in id order.
    pub intersections: Vec<IntersectionRecord>,
    /// Every occupied port slot.
    pub ports: Vec<PortRecord>,
    /// Connections in creation order.
    pub connections: Vec<ConnectionRecord>,
    /// Gaps in pixel order.
    pub gaps: Vec<PixelGap>,
    /// Models in id order.
    pub models: Vec<ModelRecord>,
}

/// An intersection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionRecord {
    /// Stable id.
    pub id: IntersectionId,
    /// Slot capacity.
    pub num_ports: u8,
    /// Primary pixel.
    pub top_pixel: u16,
    /// Secondary pixel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_pixel: Option<u16>,
    /// Group mask.
    pub group: u8,
}

/// A port sitting in an intersection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// Stable id.
    pub id: PortId,
    /// Owning intersection.
    pub intersection: IntersectionId,
    /// Slot index within the intersection.
    pub slot: u8,
}

/// A connection between two ports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Start intersection.
    pub from: IntersectionId,
    /// End intersection.
    pub to: IntersectionId,
    /// Port at `from`.
    pub from_port: PortId,
    /// Port at `to`.
    pub to_port: PortId,
    /// Group mask.
    pub group: u8,
    /// LED count, restored as-is.
    pub num_leds: u16,
}

/// A routing model and its weight table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    /// Model index.
    pub id: ModelId,
    /// Weight for ports without an entry.
    pub default_weight: u8,
    /// Emitter groups.
    pub emit_groups: u8,
    /// Longest list; 0 means the pixel count.
    #[serde(default)]
    pub max_length: u16,
    /// Port choice strategy.
    #[serde(default)]
    pub routing_strategy: RoutingStrategy,
    /// Per-port weights.
    #[serde(default)]
    pub weights: Vec<WeightRecord>,
}

/// Weight of one outgoing port.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightRecord {
    /// Outgoing port.
    pub port: PortId,
    /// Weight when no override matches.
    pub default: u8,
    /// Per-incoming-port overrides.
    #[serde(default)]
    pub overrides: Vec<OverrideRecord>,
}

/// One per-incoming-port override.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRecord {
    /// Incoming port.
    pub incoming: PortId,
    /// Weight.
    pub weight: u8,
}

impl ModelRecord {
    fn from_model(model: &Model) -> Self {
        Self {
            id: model.id,
            default_weight: model.default_weight,
            emit_groups: model.emit_groups,
            max_length: model.max_length,
            routing_strategy: model.routing_strategy,
            weights: model
                .weights()
                .iter()
                .map(|(port, weight)| WeightRecord {
                    port: *port,
                    default: weight.default_weight(),
                    overrides: weight
                        .conditional_weights()
                        .iter()
                        .map(|(incoming, weight)| OverrideRecord {
                            incoming: *incoming,
                            weight: *weight,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn to_model(&self) -> Model {
        let mut model = Model::new(self.id, self.default_weight, self.emit_groups)
            .with_max_length(self.max_length)
            .with_strategy(self.routing_strategy);
        for record in &self.weights {
            let mut weight = Weight::new(record.default);
            for entry in &record.overrides {
                weight.add(entry.incoming, entry.weight);
            }
            model.set_weight(record.port, weight);
        }
        model
    }
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

impl Topology {
    /// Captures the structure of this topology.
    #[must_use]
    pub fn export_snapshot(&self) -> TopologySnapshot {
        let mut ports = Vec::new();
        for intersection in self.intersections() {
            for (slot, port) in intersection.ports().iter().enumerate() {
                if let Some(port) = port {
                    ports.push(PortRecord {
                        id: *port,
                        intersection: intersection.id,
                        slot: slot as u8,
                    });
                }
            }
        }

        TopologySnapshot {
            pixel_count: self.pixel_count(),
            intersections: self
                .intersections()
                .map(|intersection| IntersectionRecord {
                    id: intersection.id,
                    num_ports: intersection.num_ports(),
                    top_pixel: intersection.top_pixel,
                    bottom_pixel: intersection.bottom_pixel,
                    group: intersection.group,
                })
                .collect(),
            ports,
            connections: self
                .connections()
                .map(|connection| ConnectionRecord {
                    from: connection.from,
                    to: connection.to,
                    from_port: connection.from_port,
                    to_port: connection.to_port,
                    group: connection.group,
                    num_leds: connection.num_leds,
                })
                .collect(),
            gaps: self.gaps().to_vec(),
            models: self.models().map(ModelRecord::from_model).collect(),
        }
    }

    /// Replaces the graph with a snapshot.
    ///
    /// With `replace_models` the imported models become the only models;
    /// otherwise existing models are kept and imported ones overwrite
    /// them by id.
    ///
    /// # Errors
    ///
    /// The first inconsistency found; the topology is left untouched.
    pub fn import_snapshot(
        &mut self,
        snapshot: &TopologySnapshot,
        replace_models: bool,
    ) -> SnapshotResult<()> {
        validate(snapshot)?;

        self.clear_graph();
        self.set_pixel_count(snapshot.pixel_count);

        for record in &snapshot.intersections {
            self.insert_intersection(Intersection::new(
                record.id,
                record.num_ports,
                record.top_pixel,
                record.bottom_pixel,
                record.group,
            ));
        }

        let connected: BTreeSet<PortId> = snapshot
            .connections
            .iter()
            .flat_map(|c| [c.from_port, c.to_port])
            .collect();
        for record in &snapshot.ports {
            if !connected.contains(&record.id) {
                tracing::debug!("snapshot port {} has no connection, skipped", record.id);
                continue;
            }
            if let Some(intersection) = self.intersection_mut(record.intersection) {
                intersection.set_port(record.slot, record.id);
            }
        }

        for record in &snapshot.connections {
            self.attach_connection(
                (record.from, record.to),
                (record.from_port, record.to_port),
                record.group,
                Some(record.num_leds),
            );
        }

        for gap in &snapshot.gaps {
            self.push_gap(*gap);
        }

        let imported: BTreeMap<ModelId, Model> = snapshot
            .models
            .iter()
            .map(|record| (record.id, record.to_model()))
            .collect();
        if replace_models {
            self.replace_models(imported);
        } else {
            for model in self.models_mut() {
                model.retain_ports(|port| connected.contains(&port));
            }
            for (_, model) in imported {
                self.add_model(model);
            }
        }

        let next_intersection = snapshot
            .intersections
            .iter()
            .map(|record| u32::from(record.id.value()) + 1)
            .max()
            .unwrap_or(0);
        let next_port = snapshot
            .ports
            .iter()
            .map(|record| u32::from(record.id.value()) + 1)
            .max()
            .unwrap_or(0);
        self.advance_counters(next_intersection, next_port);

        tracing::debug!(
            "imported snapshot: {} intersections, {} connections, {} gaps, {} models",
            snapshot.intersections.len(),
            snapshot.connections.len(),
            snapshot.gaps.len(),
            snapshot.models.len()
        );
        Ok(())
    }
}

fn validate(snapshot: &TopologySnapshot) -> SnapshotResult<()> {
    let mut capacity: BTreeMap<IntersectionId, u8> = BTreeMap::new();
    for record in &snapshot.intersections {
        if capacity.insert(record.id, record.num_ports).is_some() {
            return Err(SnapshotError::DuplicateIntersection(record.id.value()));
        }
    }

    let mut ports: BTreeMap<PortId, IntersectionId> = BTreeMap::new();
    let mut slots: BTreeSet<(IntersectionId, u8)> = BTreeSet::new();
    for record in &snapshot.ports {
        let Some(num_ports) = capacity.get(&record.intersection) else {
            return Err(SnapshotError::UnknownIntersection(record.intersection.value()));
        };
        if ports.insert(record.id, record.intersection).is_some() {
            return Err(SnapshotError::DuplicatePort(record.id.value()));
        }
        if record.slot >= *num_ports || !slots.insert((record.intersection, record.slot)) {
            return Err(SnapshotError::InvalidSlot {
                intersection: record.intersection.value(),
                slot: record.slot,
            });
        }
    }

    let mut used: BTreeSet<PortId> = BTreeSet::new();
    for record in &snapshot.connections {
        for end in [record.from, record.to] {
            if !capacity.contains_key(&end) {
                return Err(SnapshotError::UnknownIntersection(end.value()));
            }
        }
        let invalid = |port: PortId| SnapshotError::InvalidConnectionPort {
            from: record.from.value(),
            to: record.to.value(),
            port: port.value(),
        };
        if record.from == record.to {
            return Err(invalid(record.from_port));
        }
        for (port, owner) in [(record.from_port, record.from), (record.to_port, record.to)] {
            if ports.get(&port) != Some(&owner) || !used.insert(port) {
                return Err(invalid(port));
            }
        }
    }

    let mut sorted: Vec<PixelGap> = snapshot.gaps.clone();
    sorted.sort_by_key(|gap| gap.from);
    let mut previous: Option<PixelGap> = None;
    for gap in sorted {
        let overlaps = previous.is_some_and(|prev| gap.from <= prev.to);
        if gap.from > gap.to || gap.to >= snapshot.pixel_count || overlaps {
            return Err(SnapshotError::InvalidGap {
                from: gap.from,
                to: gap.to,
                pixel_count: snapshot.pixel_count,
            });
        }
        previous = Some(gap);
    }

    let mut models: BTreeSet<ModelId> = BTreeSet::new();
    for record in &snapshot.models {
        if !models.insert(record.id) {
            return Err(SnapshotError::DuplicateModel(record.id));
        }
        for weight in &record.weights {
            let unknown = std::iter::once(weight.port)
                .chain(weight.overrides.iter().map(|entry| entry.incoming))
                .find(|port| !used.contains(port));
            if let Some(port) = unknown {
                return Err(SnapshotError::UnknownWeightPort {
                    model: record.id,
                    port: port.value(),
                });
            }
            if weight.overrides.len() > MAX_CONDITIONAL_WEIGHTS {
                return Err(SnapshotError::TooManyOverrides {
                    model: record.id,
                    port: weight.port.value(),
                    count: weight.overrides.len(),
                    max: MAX_CONDITIONAL_WEIGHTS,
                });
            }
        }
    }

    Ok(())
}
