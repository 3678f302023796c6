//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an
//! empty file yields a 300-pixel line.
//!
//! ```toml
//! object = "cross"
//! pixel_count = 288
//! auto_emit = true
//! seed = 7
//!
//! [limits]
//! max_light_lists = 16
//! max_total_lights = 2000
//!
//! [random]
//! min_speed = 0.5
//! max_speed = 4.0
//! ```

use std::path::Path;

use lightpath_core::{ObjectLayout, RuntimeLimits, Topology};
use lightpath_procedural::RandomRanges;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shapes::{Cross, Line};

/// Errors raised while loading a configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {path}: {message}")]
    Io {
        /// File path.
        path: String,
        /// OS error text.
        message: String,
    },

    /// The text is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Built-in object shapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A single strip with its ends bridged.
    #[default]
    Line,
    /// Two crossing strips.
    Cross,
}

impl ObjectType {
    /// Pixel count used when the configuration names none.
    #[must_use]
    pub const fn default_pixel_count(self) -> u16 {
        match self {
            Self::Line => Line::DEFAULT_PIXEL_COUNT,
            Self::Cross => Cross::DEFAULT_PIXEL_COUNT,
        }
    }

    /// Smallest supported pixel count.
    #[must_use]
    pub const fn min_pixel_count(self) -> u16 {
        match self {
            Self::Line => Line::MIN_PIXEL_COUNT,
            Self::Cross => Cross::MIN_PIXEL_COUNT,
        }
    }

    /// Builds the topology and layout of a shape with `pixel_count`
    /// pixels.
    #[must_use]
    pub fn build(self, pixel_count: u16) -> (Topology, Box<dyn ObjectLayout>) {
        match self {
            Self::Line => {
                let line = Line::new(pixel_count);
                (line.build(), Box::new(line))
            }
            Self::Cross => {
                let cross = Cross::new(pixel_count);
                (cross.build(), Box::new(cross))
            }
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Object shape.
    pub object: ObjectType,
    /// Logical pixel count; the shape's default when absent.
    pub pixel_count: Option<u16>,
    /// Start with auto-emission enabled.
    pub auto_emit: bool,
    /// Seed of the random stream and the noise field.
    pub seed: u64,
    /// Capacity limits.
    pub limits: RuntimeLimits,
    /// Ranges for random emissions.
    pub random: RandomRanges,
}

impl EngineConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed TOML, `InvalidValue` for out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// `Io` when the file cannot be read, otherwise as `from_toml_str`.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.display().to_string(),
            message: error.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// The configured pixel count or the shape's default.
    #[must_use]
    pub fn resolved_pixel_count(&self) -> u16 {
        self.pixel_count
            .unwrap_or_else(|| self.object.default_pixel_count())
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// `InvalidValue` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        let pixel_count = self.resolved_pixel_count();
        let min = self.object.min_pixel_count();
        if pixel_count < min {
            return Err(ConfigError::InvalidValue {
                field: "pixel_count",
                reason: format!("{pixel_count} is below the minimum of {min} for {:?}", self.object),
            });
        }
        if self.limits.max_light_lists == 0 || self.limits.max_light_lists > usize::from(u8::MAX) {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_light_lists",
                reason: format!("{} is outside 1..=255", self.limits.max_light_lists),
            });
        }
        if self.random.min_speed > self.random.max_speed {
            return Err(ConfigError::InvalidValue {
                field: "random.min_speed",
                reason: "above random.max_speed".to_string(),
            });
        }
        Ok(())
    }
}
