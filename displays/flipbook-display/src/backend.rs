//! Display backend trait
//!
//! Defines the interface for page-addressed display controllers.

use flipbook_core::{FrameGeometry, SinkError};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Frame is wider or taller than the panel
    InvalidGeometry,
    /// Page data does not fit the transfer buffer or frame size
    BufferOverflow,
}

impl From<DisplayError> for SinkError {
    fn from(e: DisplayError) -> Self {
        match e {
            DisplayError::Communication | DisplayError::BufferOverflow => {
                SinkError::Communication
            }
            DisplayError::InvalidGeometry => SinkError::Geometry,
        }
    }
}

/// Display backend trait
///
/// A page is one byte per column covering 8 rows, bit 0 on top. Pages are
/// written starting at column 0 of the visible area.
#[allow(async_fn_in_trait)]
pub trait PageDisplay {
    /// Visible columns
    fn columns(&self) -> usize;

    /// Number of 8-row pages
    fn pages(&self) -> usize;

    /// Write `data` to `page`, starting at column 0
    async fn write_page(&mut self, page: usize, data: &[u8]) -> Result<(), DisplayError>;
}

/// Write a whole packed frame at (0, 0), page by page
///
/// Shared `FrameSink` implementation for every `PageDisplay`.
pub async fn write_frame<D: PageDisplay>(
    display: &mut D,
    geometry: FrameGeometry,
    packed: &[u8],
) -> Result<(), DisplayError> {
    let width = geometry.width();
    if width > display.columns() || geometry.page_count() > display.pages() {
        return Err(DisplayError::InvalidGeometry);
    }
    if packed.len() < geometry.packed_len() {
        return Err(DisplayError::BufferOverflow);
    }

    for (page, data) in packed[..geometry.packed_len()].chunks_exact(width).enumerate() {
        display.write_page(page, data).await?;
    }
    Ok(())
}
