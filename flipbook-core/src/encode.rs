//! RLE stream encoder
//!
//! Produces the text format read by [`RleDecoder`](crate::stream::RleDecoder):
//! frames are flattened row-major and concatenated, then every maximal run
//! of equal pixels becomes one `<count>:<bit>` token. Tokens are joined by a
//! single space, and runs carry across frame boundaries.
//!
//! ```ignore
//! let mut encoder = RleEncoder::new(heapless::String::<64>::new());
//! encoder.push_frame(&[1, 1, 1, 0, 0, 1, 1, 1])?;
//! let text = encoder.finish()?; // "3:1 2:0 3:1"
//! ```

use core::fmt::Write;

use crate::stream::Run;

/// Encoder errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// The output sink refused the token (e.g. a full fixed-size string).
    /// The output may hold a partial token, so the encoder stays failed.
    Write,
}

/// Streaming run-length encoder writing into any `core::fmt::Write`
pub struct RleEncoder<W> {
    out: W,
    /// Run still being extended
    current: Option<Run>,
    tokens: usize,
    pixels: u64,
    failed: bool,
}

impl<W: Write> RleEncoder<W> {
    /// Create an encoder writing into `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            current: None,
            tokens: 0,
            pixels: 0,
            failed: false,
        }
    }

    /// Append one pixel; any nonzero value is a set pixel
    ///
    /// After a write error every further call returns the same error.
    pub fn push_pixel(&mut self, pixel: u8) -> Result<(), EncodeError> {
        if self.failed {
            return Err(EncodeError::Write);
        }
        let bit = pixel != 0;

        if let Some(run) = self.current.as_mut() {
            if (run.bit() == 1) == bit && run.extend() {
                self.pixels += 1;
                return Ok(());
            }
        }

        if let Some(run) = self.current {
            self.write_run(run)?;
        }
        self.current = Run::new(1, bit);
        self.pixels += 1;
        Ok(())
    }

    /// Append a whole row-major frame
    pub fn push_frame(&mut self, frame: &[u8]) -> Result<(), EncodeError> {
        frame.iter().try_for_each(|&pixel| self.push_pixel(pixel))
    }

    /// Number of tokens written so far (the open run is not counted)
    pub fn tokens(&self) -> usize {
        self.tokens
    }

    /// Number of pixels accepted so far
    pub fn pixels(&self) -> u64 {
        self.pixels
    }

    /// Whether a write error has poisoned the output
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Flush the open run and hand back the output
    pub fn finish(mut self) -> Result<W, EncodeError> {
        if self.failed {
            return Err(EncodeError::Write);
        }
        if let Some(run) = self.current.take() {
            self.write_run(run)?;
        }
        Ok(self.out)
    }

    fn write_run(&mut self, run: Run) -> Result<(), EncodeError> {
        let written = if self.tokens > 0 {
            write!(self.out, " {}:{}", run.count(), run.bit())
        } else {
            write!(self.out, "{}:{}", run.count(), run.bit())
        };
        if written.is_err() {
            self.failed = true;
            return Err(EncodeError::Write);
        }
        self.tokens += 1;
        Ok(())
    }
}
