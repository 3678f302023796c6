//! # Built-in Shapes
//!
//! Ready-made objects. Each shape builds its topology (intersections,
//! connections and models) and doubles as the object's `ObjectLayout`,
//! supplying auto-emit parameters and mirror images.

mod cross;
mod line;

pub use cross::{Cross, CrossModel};
pub use line::{Line, LineModel};
