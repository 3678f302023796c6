//! # Memory Management
//!
//! Pre-allocated storage for objects with bounded counts.

mod pool;

pub use pool::{SlotHandle, SlotPool};
