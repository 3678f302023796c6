//! # LIGHTPATH Procedural Services
//!
//! The stateless-looking services the simulation consumes every tick.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: a seed fully determines every draw and sample
//! 2. **Owned, not global**: the runtime owns one `Random` and one
//!    `NoiseField` per object and passes them down explicitly
//! 3. **Cheap**: no allocation per sample
//!
//! ## Core Components
//!
//! - `NoiseField`: 2D simplex noise, used for brightness modulation
//! - `Random`: ChaCha8 stream plus the configurable emission ranges
//! - `Ease`: the 34 easing curves keyed by numeric id
//!
//! ## Example
//!
//! ```rust,ignore
//! use lightpath_procedural::{Ease, NoiseField, NoiseSeed, Random, RandomRanges};
//!
//! let mut random = Random::new(42, RandomRanges::default());
//! let speed = random.random_speed();
//!
//! let noise = NoiseField::new(NoiseSeed::new(42));
//! let level = noise.value(10.0, 0.5);
//!
//! let eased = Ease::QuadraticIn.map(5.0, 0.0, 10.0, 0.0, 10.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ease;
pub mod noise;
pub mod random;

pub use ease::Ease;
pub use noise::{NoiseField, NoiseSeed};
pub use random::{Random, RandomRanges};
