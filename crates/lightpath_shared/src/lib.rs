//! # LIGHTPATH Shared
//!
//! Common types used by the topology, the runtime and the facade.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER contain simulation state. Anything that owns
//! lights or graph objects belongs in `lightpath_core`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod color;
pub mod constants;
pub mod flags;

pub use color::ColorRGB;
pub use constants::{
    FRAME_MS, FULL_BRIGHTNESS, INFINITE_DURATION, MAX_CONDITIONAL_WEIGHTS, MAX_GROUPS,
    MAX_HOPS_PER_UPDATE, MAX_LIGHT_LISTS, MAX_TOTAL_LIGHTS, OUT_PORTS_MEMORY,
};
pub use flags::{groups, BehaviourFlags, ListHead, ListOrder};
