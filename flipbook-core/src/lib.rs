//! Board-agnostic core logic for Flipbook video playback
//!
//! This crate contains everything between the encoded video in flash and
//! the bytes handed to a display controller:
//!
//! - Frame geometry and its packing preconditions
//! - Resumable RLE stream decoder with run carry-over between frames
//! - Page packer for segmented (SH1106/SSD1306 style) controllers
//! - Stream encoder used by host tooling and tests
//! - Player loop with frame pacing, built on the sink/clock traits
//!
//! # Stream format
//!
//! ```text
//! 3:1 2:0 3:1\0
//! │ │
//! │ └─ bit value, '0' or '1'
//! └─── run length in decimal
//! ```
//!
//! Tokens may be separated by spaces, tabs or newlines. The stream ends at
//! the end of the byte slice or at the first NUL byte.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod encode;
pub mod geometry;
pub mod pack;
pub mod player;
pub mod stream;
pub mod traits;

pub use config::{ConfigError, PlayerConfig};
pub use encode::{EncodeError, RleEncoder};
pub use geometry::{FrameGeometry, GeometryError};
pub use pack::{pack_frame, BitOrder, FramePacker};
pub use player::{PlayError, PlaybackSummary, Player};
pub use stream::{DecodeError, RleDecoder, Run};
pub use traits::{Clock, FrameSink, SinkError};
