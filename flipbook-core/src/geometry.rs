//! Frame geometry
//!
//! A frame is `width * height` pixels stored row-major, one byte per pixel.
//! Any non-empty size can be decoded. Packed output groups rows into pages
//! of 8, so only page-aligned geometries (height a multiple of 8) can be
//! packed; the packer checks this when it is built.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows per display page
pub const PAGE_HEIGHT: usize = 8;

/// Geometry validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GeometryError {
    /// Width or height is zero
    Empty,
    /// Height is not a multiple of 8
    PartialPage,
}

/// Fixed frame dimensions shared by the decoder, packer and sinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrameGeometry {
    width: u16,
    height: u16,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::OLED_128X64
    }
}

impl FrameGeometry {
    /// The common 128x64 OLED panel (SH1106, SSD1306)
    pub const OLED_128X64: Self = Self {
        width: 128,
        height: 64,
    };

    /// Create a geometry; both dimensions must be nonzero
    pub const fn new(width: u16, height: u16) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::Empty);
        }
        Ok(Self { width, height })
    }

    /// Create a geometry that can also be packed into pages
    pub const fn paged(width: u16, height: u16) -> Result<Self, GeometryError> {
        match Self::new(width, height) {
            Ok(geometry) => geometry.require_paged(),
            Err(e) => Err(e),
        }
    }

    /// Check the page-packing precondition
    pub const fn require_paged(self) -> Result<Self, GeometryError> {
        if self.is_paged() {
            Ok(self)
        } else {
            Err(GeometryError::PartialPage)
        }
    }

    /// True when the height is a whole number of pages
    pub const fn is_paged(&self) -> bool {
        self.height != 0 && self.height as usize % PAGE_HEIGHT == 0
    }

    /// Frame width in pixels
    pub const fn width(&self) -> usize {
        self.width as usize
    }

    /// Frame height in pixels
    pub const fn height(&self) -> usize {
        self.height as usize
    }

    /// Number of pixels in one decoded frame
    pub const fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Number of complete 8-row pages
    pub const fn page_count(&self) -> usize {
        self.height() / PAGE_HEIGHT
    }

    /// Size of one packed frame in bytes
    pub const fn packed_len(&self) -> usize {
        self.width() * self.page_count()
    }

    /// Row-major index of the pixel at (x, y)
    pub const fn index(&self, x: usize, y: usize) -> usize {
        y * self.width() + x
    }
}
