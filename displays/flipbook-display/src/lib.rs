//! Page-addressed display drivers for Flipbook
//!
//! This crate provides:
//! - `PageDisplay` trait for controllers that take one page (8 rows) per write
//! - `Sh1106` driver for 128x64 SH1106 OLEDs over async I2C
//! - `MemoryDisplay`, a RAM-backed panel for host previews and tests
//!
//! Every driver here is also a `flipbook_core::FrameSink`, so it can be
//! handed straight to the player:
//!
//! ```ignore
//! let mut oled = Sh1106::new(i2c);
//! oled.init().await?;
//! player.play(&mut frame, &mut packed, &mut oled, &clock, &mut delay).await?;
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod backend;
pub mod memory;
pub mod sh1106;

// Re-export key types
pub use backend::{write_frame, DisplayError, PageDisplay};
pub use memory::MemoryDisplay;
pub use sh1106::Sh1106;
