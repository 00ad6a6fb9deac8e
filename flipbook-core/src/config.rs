//! Playback configuration
//!
//! Everything the original firmware hard-coded: panel size, packing
//! orientation and target frame rate. Under the `serde` feature the config
//! can be stored in flash as postcard-serialized binary data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{FrameGeometry, GeometryError};
use crate::pack::BitOrder;

/// Current config data version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum serialized config size
pub const MAX_CONFIG_SIZE: usize = 16;

/// Default target frame rate
pub const DEFAULT_FPS: u16 = 12;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Width/height unusable for decoding or packing
    InvalidGeometry(GeometryError),
    /// Frame rate of zero
    InvalidFps,
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored data has a different layout version
    VersionMismatch,
}

impl From<GeometryError> for ConfigError {
    fn from(e: GeometryError) -> Self {
        ConfigError::InvalidGeometry(e)
    }
}

/// Player configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlayerConfig {
    /// Layout version, see [`CONFIG_VERSION`]
    pub version: u8,
    /// Frame width in pixels
    pub width: u16,
    /// Frame height in pixels (multiple of 8)
    pub height: u16,
    /// Target frames per second
    pub fps: u16,
    /// Bit order inside each page byte
    pub bit_order: BitOrder,
    /// Times to play the stream; 0 repeats forever
    pub loops: u16,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new(128, 64)
    }
}

impl PlayerConfig {
    /// Config for a panel of the given size with default timing
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            version: CONFIG_VERSION,
            width,
            height,
            fps: DEFAULT_FPS,
            bit_order: BitOrder::LsbTop,
            loops: 1,
        }
    }

    /// Set the target frame rate
    pub const fn with_fps(mut self, fps: u16) -> Self {
        self.fps = fps;
        self
    }

    /// Set the loop count (0 = forever)
    pub const fn with_loops(mut self, loops: u16) -> Self {
        self.loops = loops;
        self
    }

    /// Set the page bit order
    pub const fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Check the config and return its packable geometry
    pub fn validate(&self) -> Result<FrameGeometry, ConfigError> {
        let geometry = FrameGeometry::paged(self.width, self.height)?;
        if self.fps == 0 {
            return Err(ConfigError::InvalidFps);
        }
        Ok(geometry)
    }

    /// Time budget for one frame in microseconds
    pub fn frame_period_us(&self) -> u64 {
        1_000_000 / u64::from(self.fps.max(1))
    }

    /// True when playback repeats without end
    pub fn loops_forever(&self) -> bool {
        self.loops == 0
    }

    /// Serialize into `buffer`, returning the used part
    #[cfg(feature = "serde")]
    pub fn to_bytes<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a stored config
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        if config.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        config.validate()?;
        Ok(config)
    }
}
