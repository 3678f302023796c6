//! # Engine Limits
//!
//! Compile-time defaults for every fixed capacity in the engine.
//!
//! **NOTE:** The runtime copies these into `RuntimeLimits`, which the
//! facade can override from configuration. The values here are the
//! defaults and the hard upper bounds for fixed-size arrays.

// =============================================================================
// TOPOLOGY
// =============================================================================

/// Number of selectable groups (one bit each in a group mask).
pub const MAX_GROUPS: usize = 8;

/// Maximum number of per-incoming-port overrides held by one weight.
pub const MAX_CONDITIONAL_WEIGHTS: usize = 8;

/// How many previous (intersection, out-port) choices a light remembers.
pub const OUT_PORTS_MEMORY: usize = 3;

/// Owner hand-offs one light may take in a single update. Position left
/// over at the cap is carried into the next frame.
pub const MAX_HOPS_PER_UPDATE: u32 = 1024;

// =============================================================================
// RUNTIME
// =============================================================================

/// Default number of concurrent light lists per object.
pub const MAX_LIGHT_LISTS: usize = 16;

/// Default budget of lights alive across all lists.
pub const MAX_TOTAL_LIGHTS: usize = 2000;

/// Nominal frame duration in milliseconds (60 FPS).
pub const FRAME_MS: u64 = 16;

/// Brightness ceiling.
pub const FULL_BRIGHTNESS: u8 = 255;

/// Expiry timestamp meaning "never expires".
pub const INFINITE_DURATION: u64 = u64::MAX;
