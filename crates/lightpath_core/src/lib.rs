//! # LIGHTPATH Core
//!
//! Light simulation over a graph of LED strips.
//!
//! Lights are emitted in lists at an intersection (or a connection),
//! travel along connections with eased motion, and are routed at every
//! intersection by a weighted model. Each frame, every visible light adds
//! its color to the pixels it covers and the result is averaged.
//!
//! ## Architecture Rules
//!
//! 1. **Tick-driven** - time is an explicit millisecond timestamp
//! 2. **Arena ids** - lights never hold references into the graph
//! 3. **Bounded** - list slots and the light budget are fixed up front
//! 4. **Typed failures** - emission errors are values, never panics
//!
//! ## Example
//!
//! ```rust,ignore
//! use lightpath_core::{EmitParams, Model, PlainLayout, RuntimeLimits, State, Topology};
//! use lightpath_procedural::{NoiseField, NoiseSeed, Random};
//!
//! let mut topology = Topology::new(60);
//! let a = topology.add_intersection(2, 0, None, 1).unwrap();
//! let b = topology.add_intersection(2, 59, None, 1).unwrap();
//! topology.add_connection(a, b, 1, None);
//! topology.add_model(Model::new(0, 10, 1));
//!
//! let mut state = State::new(
//!     topology,
//!     Box::new(PlainLayout::default()),
//!     RuntimeLimits::default(),
//!     Random::with_seed(7),
//!     NoiseField::new(NoiseSeed::new(7)),
//! );
//! state.emit(&EmitParams::new(0, 1.0).with_length(5), 0)?;
//! state.update(16);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod memory;
pub mod runtime;
pub mod topology;

pub use error::{LightpathError, LightpathResult, SnapshotError, SnapshotResult};
pub use memory::{SlotHandle, SlotPool};
pub use runtime::{
    palette_at, palette_count, random_color, Behaviour, EmitParams, EmitSource, LightContext,
    LightList, LightRender, ListPhase, OutPortMemory, Palette, PixelBuffer, RuntimeLight,
    RuntimeLimits, State, TickContext, WrapMode,
};
pub use topology::{
    Connection, ConnectionId, Intersection, IntersectionId, Model, ModelId, ObjectLayout, Owner,
    PixelGap, PlainLayout, Port, PortId, RoutingStrategy, Topology, TopologySnapshot, Weight,
};
