//! # Topology
//!
//! The graph of one physical object, held in an arena keyed by stable ids.
//!
//! ## Objects
//!
//! - `Intersection`: a node with a fixed number of port slots and one or
//!   two pixels
//! - `Port`: one end of a connection, sitting in an intersection slot
//! - `Connection`: a run of LEDs between two ports (0 LEDs is a logical
//!   bridge)
//! - `Model`: per-port routing weights
//! - `PixelGap`: logical pixels without physical LEDs
//!
//! Lights refer to graph objects through `Owner` ids only, so editing the
//! graph between ticks never leaves a light pointing at freed memory.

mod connection;
mod graph;
mod ids;
mod intersection;
mod layout;
mod model;
mod owner;
mod port;
mod snapshot;
mod weight;

pub use connection::Connection;
pub use graph::{PixelGap, Topology};
pub use ids::{ConnectionId, IntersectionId, ModelId, PortId};
pub use intersection::Intersection;
pub use layout::{ObjectLayout, PlainLayout};
pub use model::{Model, RoutingStrategy};
pub use owner::Owner;
pub use port::Port;
pub use snapshot::{
    ConnectionRecord, IntersectionRecord, ModelRecord, OverrideRecord, PortRecord,
    TopologySnapshot, WeightRecord,
};
pub use weight::Weight;
