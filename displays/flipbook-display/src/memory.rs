//! RAM-backed page display
//!
//! Mirrors what a page-addressed controller would hold in its GDDRAM.
//! Useful for simulators and for checking the packed layout on the host.

use core::fmt::{self, Write};

use flipbook_core::{FrameGeometry, FrameSink, SinkError};

use crate::backend::{write_frame, DisplayError, PageDisplay};

/// In-memory panel of `COLUMNS` x `PAGES * 8` pixels
#[derive(Clone)]
pub struct MemoryDisplay<const COLUMNS: usize, const PAGES: usize> {
    ram: [[u8; COLUMNS]; PAGES],
    frames_drawn: u32,
}

impl<const COLUMNS: usize, const PAGES: usize> Default for MemoryDisplay<COLUMNS, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const COLUMNS: usize, const PAGES: usize> MemoryDisplay<COLUMNS, PAGES> {
    /// Create a blank panel
    pub const fn new() -> Self {
        Self {
            ram: [[0; COLUMNS]; PAGES],
            frames_drawn: 0,
        }
    }

    /// Raw bytes of one page
    pub fn page(&self, page: usize) -> Option<&[u8]> {
        self.ram.get(page).map(|p| p.as_slice())
    }

    /// Whether the pixel at (x, y) is lit; out-of-range pixels are dark
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.ram
            .get(y / 8)
            .and_then(|page| page.get(x))
            .is_some_and(|byte| byte & (1 << (y % 8)) != 0)
    }

    /// Number of complete frames drawn
    pub fn frames_drawn(&self) -> u32 {
        self.frames_drawn
    }

    /// Blank the panel
    pub fn clear(&mut self) {
        for page in &mut self.ram {
            page.fill(0);
        }
    }

    /// Render the panel as text, `#` for lit pixels and `.` for dark ones
    pub fn write_ascii<W: Write>(&self, out: &mut W) -> fmt::Result {
        for y in 0..PAGES * 8 {
            for x in 0..COLUMNS {
                out.write_char(if self.pixel(x, y) { '#' } else { '.' })?;
            }
            out.write_char('\n')?;
        }
        Ok(())
    }
}

impl<const COLUMNS: usize, const PAGES: usize> PageDisplay for MemoryDisplay<COLUMNS, PAGES> {
    fn columns(&self) -> usize {
        COLUMNS
    }

    fn pages(&self) -> usize {
        PAGES
    }

    async fn write_page(&mut self, page: usize, data: &[u8]) -> Result<(), DisplayError> {
        let ram = self.ram.get_mut(page).ok_or(DisplayError::InvalidGeometry)?;
        if data.len() > COLUMNS {
            return Err(DisplayError::BufferOverflow);
        }
        ram[..data.len()].copy_from_slice(data);
        Ok(())
    }
}

impl<const COLUMNS: usize, const PAGES: usize> FrameSink for MemoryDisplay<COLUMNS, PAGES> {
    async fn draw_packed(
        &mut self,
        geometry: FrameGeometry,
        packed: &[u8],
    ) -> Result<(), SinkError> {
        write_frame(self, geometry, packed).await?;
        self.frames_drawn = self.frames_drawn.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use embassy_futures::block_on;
    use flipbook_core::pack_frame;
    use std::string::String;

    #[test]
    fn test_packed_frame_round_trips_to_pixels() {
        let geometry = FrameGeometry::paged(8, 16).unwrap();
        let mut frame = [0u8; 128];
        // Diagonal
        for i in 0..8 {
            frame[geometry.index(i, i * 2)] = 1;
        }
        let mut packed = [0u8; 16];
        pack_frame(geometry, &frame, &mut packed);

        let mut display = MemoryDisplay::<8, 2>::new();
        block_on(display.draw_packed(geometry, &packed)).unwrap();

        for y in 0..16 {
            for x in 0..8 {
                assert_eq!(display.pixel(x, y), frame[geometry.index(x, y)] == 1);
            }
        }
        assert_eq!(display.frames_drawn(), 1);
    }

    #[test]
    fn test_smaller_frame_draws_at_origin() {
        let geometry = FrameGeometry::paged(2, 8).unwrap();
        let mut display = MemoryDisplay::<4, 2>::new();
        block_on(display.draw_packed(geometry, &[0x01, 0x80])).unwrap();

        assert_eq!(display.page(0), Some(&[0x01, 0x80, 0, 0][..]));
        assert_eq!(display.page(1), Some(&[0u8; 4][..]));
        assert!(display.pixel(0, 0));
        assert!(display.pixel(1, 7));
        assert!(!display.pixel(1, 6));
    }

    #[test]
    fn test_rejects_frame_larger_than_panel() {
        let geometry = FrameGeometry::paged(8, 8).unwrap();
        let mut display = MemoryDisplay::<4, 1>::new();
        assert_eq!(
            block_on(display.draw_packed(geometry, &[0; 8])),
            Err(SinkError::Geometry)
        );
        assert_eq!(display.frames_drawn(), 0);
    }

    #[test]
    fn test_rejects_short_packed_buffer() {
        let geometry = FrameGeometry::paged(4, 8).unwrap();
        let mut display = MemoryDisplay::<4, 1>::new();
        assert_eq!(
            block_on(display.draw_packed(geometry, &[0; 3])),
            Err(SinkError::Communication)
        );
    }

    #[test]
    fn test_ascii_preview() {
        let geometry = FrameGeometry::paged(3, 8).unwrap();
        let mut display = MemoryDisplay::<3, 1>::new();
        block_on(display.draw_packed(geometry, &[0b0000_0001, 0, 0b1000_0000])).unwrap();

        let mut text = String::new();
        display.write_ascii(&mut text).unwrap();
        let lines: std::vec::Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "#..");
        assert_eq!(lines[7], "..#");

        display.clear();
        assert!(!display.pixel(0, 0));
    }
}
