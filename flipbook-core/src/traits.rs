//! Hardware abstraction traits
//!
//! These traits define the interface between the playback logic and the
//! board: where packed frames go and where time comes from. Delays use
//! `embedded_hal_async::delay::DelayNs` directly.

use crate::geometry::FrameGeometry;

/// Errors reported by a frame sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SinkError {
    /// Bus or transfer failure
    Communication,
    /// The frame does not fit the panel
    Geometry,
}

/// Destination for packed frames
///
/// A sink receives the whole packed buffer, page-major with
/// `geometry.width()` bytes per page, and draws it at screen offset (0, 0).
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    /// Draw one packed frame
    async fn draw_packed(
        &mut self,
        geometry: FrameGeometry,
        packed: &[u8],
    ) -> Result<(), SinkError>;
}

/// Monotonic microsecond clock used for frame pacing
pub trait Clock {
    /// Microseconds since an arbitrary fixed point
    fn now_us(&self) -> u64;
}
