//! SH1106 OLED Display Driver
//!
//! Driver for 128x64 SH1106-based OLED displays via I2C. The controller has
//! 132 columns of RAM with the visible 128 starting at column 2, and takes
//! frame data one page (8 rows) at a time.

use embedded_hal_async::i2c::I2c;
use heapless::Vec;

use flipbook_core::{FrameGeometry, FrameSink, SinkError};

use crate::backend::{write_frame, DisplayError, PageDisplay};

/// SH1106 I2C address (typically 0x3C or 0x3D)
pub const SH1106_ADDR: u8 = 0x3C;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;

/// First visible RAM column
const COLUMN_OFFSET: u8 = 2;

/// Control byte for a command transfer
const CONTROL_COMMAND: u8 = 0x00;

/// Control byte for a data transfer
const CONTROL_DATA: u8 = 0x40;

/// SH1106 commands
#[allow(dead_code)]
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// Power-up sequence: 64 mux, rotated 180°, charge pump on
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_MUX_RATIO,
    0x3F,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_CHARGE_PUMP,
    0x14,
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_COM_PINS,
    0x12,
    cmd::SET_CONTRAST,
    0xCF,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// SH1106 OLED driver
///
/// Unbuffered: frames go from the caller's packed buffer straight to the
/// controller, one I2C transfer per page.
pub struct Sh1106<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> Sh1106<I2C>
where
    I2C: I2c,
{
    /// Create a new SH1106 driver at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, SH1106_ADDR)
    }

    /// Create a driver for a panel strapped to another address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Release the I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Initialize the display
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        for &c in INIT_SEQUENCE {
            self.command(c).await?;
        }
        Ok(())
    }

    /// Send a command to the display
    async fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, cmd])
            .await
            .map_err(|_| DisplayError::Communication)
    }

    /// Blank the whole panel
    pub async fn clear(&mut self) -> Result<(), DisplayError> {
        let blank = [0u8; WIDTH];
        for page in 0..PAGES {
            self.write_page(page, &blank).await?;
        }
        Ok(())
    }

    /// Set display contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.command(cmd::SET_CONTRAST).await?;
        self.command(contrast).await
    }

    /// Turn display on/off
    pub async fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError> {
        if on {
            self.command(cmd::DISPLAY_ON).await
        } else {
            self.command(cmd::DISPLAY_OFF).await
        }
    }

    /// Invert display colors
    pub async fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError> {
        if inverted {
            self.command(cmd::SET_INVERSE).await
        } else {
            self.command(cmd::SET_NORMAL).await
        }
    }
}

impl<I2C> PageDisplay for Sh1106<I2C>
where
    I2C: I2c,
{
    fn columns(&self) -> usize {
        WIDTH
    }

    fn pages(&self) -> usize {
        PAGES
    }

    async fn write_page(&mut self, page: usize, data: &[u8]) -> Result<(), DisplayError> {
        if page >= PAGES {
            return Err(DisplayError::InvalidGeometry);
        }

        self.command(cmd::SET_PAGE_ADDR | page as u8).await?;
        self.command(cmd::SET_LOW_COLUMN | (COLUMN_OFFSET & 0x0F)).await?;
        self.command(cmd::SET_HIGH_COLUMN | (COLUMN_OFFSET >> 4)).await?;

        let mut packet: Vec<u8, { WIDTH + 1 }> = Vec::new();
        packet
            .push(CONTROL_DATA)
            .map_err(|_| DisplayError::BufferOverflow)?;
        packet
            .extend_from_slice(data)
            .map_err(|_| DisplayError::BufferOverflow)?;

        self.i2c
            .write(self.address, &packet)
            .await
            .map_err(|_| DisplayError::Communication)
    }
}

impl<I2C> FrameSink for Sh1106<I2C>
where
    I2C: I2c,
{
    async fn draw_packed(
        &mut self,
        geometry: FrameGeometry,
        packed: &[u8],
    ) -> Result<(), SinkError> {
        write_frame(self, geometry, packed).await?;
        Ok(())
    }
}
