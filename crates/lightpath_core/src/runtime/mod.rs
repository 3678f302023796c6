//! # Runtime
//!
//! Lights, the lists that own them and the per-object `State`.
//!
//! ## Ownership
//!
//! ```text
//! State
//!   ├─ Topology           (graph, models, gaps)
//!   ├─ SlotPool<LightList>
//!   │    └─ RuntimeLight  (owner = Intersection(id) | Connection(id))
//!   └─ PixelBuffer        (sums + finalized frame)
//! ```

mod behaviour;
mod context;
mod emit_params;
mod light;
mod light_list;
mod palette;
mod pixels;
mod state;

pub use behaviour::Behaviour;
pub use context::LightContext;
pub use emit_params::{EmitParams, EmitSource};
pub use light::{LightRender, OutPortMemory, RuntimeLight};
pub use light_list::{LightList, ListPhase, TickContext};
pub use palette::{palette_at, palette_count, random_color, Palette, WrapMode};
pub use pixels::PixelBuffer;
pub use state::{RuntimeLimits, State};
