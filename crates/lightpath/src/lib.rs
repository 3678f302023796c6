//! # LIGHTPATH
//!
//! The host-facing crate: built-in shapes, configuration and a
//! thread-safe engine around one simulated object.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        LIGHTPATH                         │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌──────────────┐     ┌──────────────┐                   │
//! │  │ EngineConfig │────>│    Engine    │<──── EmitCommand  │
//! │  │   (TOML)     │     │  (Mutex)     │────> frame bytes  │
//! │  └──────┬───────┘     └──────┬───────┘                   │
//! │         │                    │                           │
//! │  ┌──────▼───────┐     ┌──────▼───────┐     ┌──────────┐  │
//! │  │    Shapes    │────>│ lightpath_   │────>│  Probe   │  │
//! │  │ Line / Cross │     │ core::State  │     │ (fps)    │  │
//! │  └──────────────┘     └──────────────┘     └──────────┘  │
//! │                                                          │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: TOML configuration and shape selection
//! - `engine`: the locked facade and the wire form of emissions
//! - `probe`: frame rate and emission rate windows
//! - `shapes`: the built-in line and cross objects

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod engine;
pub mod probe;
pub mod shapes;

// Re-export the layers
pub use lightpath_core as core;
pub use lightpath_procedural as procedural;
pub use lightpath_shared as shared;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, EngineConfig, ObjectType};
pub use engine::{EmitCommand, Engine};
pub use probe::{FrameProbe, ProbeReport, PROBE_WINDOW};
pub use shapes::{Cross, CrossModel, Line, LineModel};
