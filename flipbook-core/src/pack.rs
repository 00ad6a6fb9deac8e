//! Page packing for segmented display controllers
//!
//! Controllers like the SH1106 and SSD1306 address memory in pages: each
//! byte covers one column and 8 vertically stacked rows. The packer turns a
//! row-major frame into that layout:
//!
//! ```text
//! packed[page * width + x]
//!   bit 0 -> row page * 8 + 0   (LsbTop)
//!   bit 7 -> row page * 8 + 7
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{FrameGeometry, GeometryError, PAGE_HEIGHT};

/// Which bit of a page byte holds the topmost row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BitOrder {
    /// Bit 0 is the top row (SH1106, SSD1306)
    #[default]
    LsbTop,
    /// Bit 7 is the top row
    MsbTop,
}

impl BitOrder {
    /// Mask for row `row` (0-7) within a page
    pub const fn mask(self, row: usize) -> u8 {
        match self {
            BitOrder::LsbTop => 1 << row,
            BitOrder::MsbTop => 0x80 >> row,
        }
    }
}

/// Stateless row-major to page-major transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FramePacker {
    geometry: FrameGeometry,
    bit_order: BitOrder,
}

impl FramePacker {
    /// Create a packer; the geometry height must be a multiple of 8
    pub const fn new(geometry: FrameGeometry, bit_order: BitOrder) -> Result<Self, GeometryError> {
        match geometry.require_paged() {
            Ok(geometry) => Ok(Self {
                geometry,
                bit_order,
            }),
            Err(e) => Err(e),
        }
    }

    /// Geometry of the frames this packer accepts
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Bit order used for each page byte
    pub fn bit_order(&self) -> BitOrder {
        self.bit_order
    }

    /// Pack `frame` into `packed`
    ///
    /// Any nonzero pixel is treated as set. Only the first
    /// `geometry.packed_len()` bytes of `packed` are written.
    ///
    /// # Panics
    ///
    /// Panics if `frame` is shorter than `geometry.pixel_count()` or `packed`
    /// is shorter than `geometry.packed_len()`.
    pub fn pack(&self, frame: &[u8], packed: &mut [u8]) {
        let width = self.geometry.width();
        let frame = &frame[..self.geometry.pixel_count()];
        let packed = &mut packed[..self.geometry.packed_len()];

        // Bits are only ever set below
        packed.fill(0);

        for x in 0..width {
            for page in 0..self.geometry.page_count() {
                let byte = &mut packed[page * width + x];
                for row in 0..PAGE_HEIGHT {
                    let y = page * PAGE_HEIGHT + row;
                    if frame[y * width + x] != 0 {
                        *byte |= self.bit_order.mask(row);
                    }
                }
            }
        }
    }

    /// The `width` bytes of one page inside a packed buffer
    ///
    /// # Panics
    ///
    /// Panics if `page` is out of range or `packed` is too short.
    pub fn page<'p>(&self, packed: &'p [u8], page: usize) -> &'p [u8] {
        let width = self.geometry.width();
        &packed[page * width..(page + 1) * width]
    }
}

/// Pack a frame with the default bit order (bit 0 = top row)
///
/// # Panics
///
/// Panics if the geometry is not page-aligned or either buffer is too short.
pub fn pack_frame(geometry: FrameGeometry, frame: &[u8], packed: &mut [u8]) {
    assert!(geometry.is_paged(), "frame height must be a multiple of 8");
    FramePacker {
        geometry,
        bit_order: BitOrder::LsbTop,
    }
    .pack(frame, packed);
}
