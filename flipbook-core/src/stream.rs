//! Resumable RLE stream decoder
//!
//! The stream is a borrowed byte slice of `<length>:<bit>` tokens. Each call
//! to [`RleDecoder::decode_next_frame`] fills exactly one frame; a run that
//! does not fit is split at the frame boundary and its tail is carried into
//! the next call.
//!
//! Token grammar:
//! - LENGTH: decimal digits up to the `:` separator. Other bytes in front of
//!   the separator are skipped; no digits at all means a length of 0.
//! - BIT: exactly one byte, `0` or `1`, directly after the separator
//! - Separators: any number of spaces, tabs or newlines after the bit
//!
//! The stream ends at the end of the slice or at the first NUL byte.

use crate::geometry::FrameGeometry;

/// Run length separator
pub const SEPARATOR: u8 = b':';

/// End-of-data sentinel inside a stream
pub const SENTINEL: u8 = 0;

/// Errors that end a decode sequence
///
/// Both stream errors are terminal: the decoder keeps returning the same
/// error until [`RleDecoder::reset`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// A new token was needed but the stream is exhausted
    EndOfStream,
    /// Missing `:` separator, invalid bit character or oversized run length
    MalformedStream,
    /// Frame buffer is shorter than the geometry's pixel count
    BufferTooSmall,
}

/// A run of identical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Run {
    /// Number of pixels, always nonzero
    len: u32,
    /// Pixel value, 0 or 1
    bit: u8,
}

impl Run {
    /// Create a run; zero-length runs do not exist
    pub fn new(len: u32, bit: bool) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(Self {
                len,
                bit: u8::from(bit),
            })
        }
    }

    /// Number of pixels in the run
    pub fn count(&self) -> u32 {
        self.len
    }

    /// Pixel value as stored in a frame (0 or 1)
    pub fn bit(&self) -> u8 {
        self.bit
    }

    /// Take up to `max` pixels off the front of the run
    ///
    /// Returns the number taken and the remaining tail, if any.
    fn take(self, max: usize) -> (usize, Option<Self>) {
        let taken = usize::try_from(self.len).map_or(max, |len| len.min(max));
        // taken <= self.len, so the cast back cannot truncate
        let rest = self.len - taken as u32;
        (taken, Self::new(rest, self.bit == 1))
    }

    /// Extend the run by one pixel, failing if the length would overflow
    pub(crate) fn extend(&mut self) -> bool {
        match self.len.checked_add(1) {
            Some(len) => {
                self.len = len;
                true
            }
            None => false,
        }
    }
}

/// Stateful decoder over one RLE stream
///
/// Owns the read cursor and the carried-over run. There is no shared state:
/// one decoder per stream, driven from one place.
#[derive(Debug, Clone)]
pub struct RleDecoder<'a> {
    stream: &'a [u8],
    geometry: FrameGeometry,
    /// Offset of the next unread byte
    cursor: usize,
    /// Tail of a run that overflowed the previous frame
    pending: Option<Run>,
    /// Terminal error, repeated until reset
    halted: Option<DecodeError>,
    frames_decoded: u32,
}

impl<'a> RleDecoder<'a> {
    /// Create a decoder positioned at the start of `stream`
    pub fn new(stream: &'a [u8], geometry: FrameGeometry) -> Self {
        Self {
            stream,
            geometry,
            cursor: 0,
            pending: None,
            halted: None,
            frames_decoded: 0,
        }
    }

    /// Rewind to the start of the stream for replay
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.pending = None;
        self.halted = None;
        self.frames_decoded = 0;
    }

    /// Frame geometry this decoder fills
    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Byte offset of the cursor within the stream
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Run carried over from the last frame
    pub fn pending(&self) -> Option<Run> {
        self.pending
    }

    /// Frames successfully decoded since creation or the last reset
    pub fn frames_decoded(&self) -> u32 {
        self.frames_decoded
    }

    /// True when no pixels are left: no carried run and no further tokens
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_none() && self.peek().is_none()
    }

    /// Decode the next frame into `frame`
    ///
    /// Writes exactly `geometry.pixel_count()` bytes of 0/1 on success. On
    /// error the frame is partially written and must be discarded.
    pub fn decode_next_frame(&mut self, frame: &mut [u8]) -> Result<(), DecodeError> {
        let capacity = self.geometry.pixel_count();
        if frame.len() < capacity {
            return Err(DecodeError::BufferTooSmall);
        }
        if let Some(err) = self.halted {
            return Err(err);
        }

        let frame = &mut frame[..capacity];
        let mut filled = 0;

        while filled < capacity {
            let run = match self.pending.take() {
                Some(run) => run,
                None => match self.next_token() {
                    Ok(Some(run)) => run,
                    // Zero-length token, nothing to write
                    Ok(None) => continue,
                    Err(err) => {
                        self.halted = Some(err);
                        return Err(err);
                    }
                },
            };

            let (taken, rest) = run.take(capacity - filled);
            frame[filled..filled + taken].fill(run.bit);
            filled += taken;
            self.pending = rest;
        }

        self.frames_decoded = self.frames_decoded.saturating_add(1);
        Ok(())
    }

    /// Byte at the cursor, or `None` at end of data
    fn peek(&self) -> Option<u8> {
        match self.stream.get(self.cursor) {
            None | Some(&SENTINEL) => None,
            Some(&byte) => Some(byte),
        }
    }

    /// Parse one `<length>:<bit>` token and the whitespace after it
    fn next_token(&mut self) -> Result<Option<Run>, DecodeError> {
        if self.peek().is_none() {
            return Err(DecodeError::EndOfStream);
        }

        let mut len: u32 = 0;
        loop {
            let byte = self.peek().ok_or(DecodeError::MalformedStream)?;
            self.cursor += 1;
            match byte {
                SEPARATOR => break,
                b'0'..=b'9' => {
                    len = len
                        .checked_mul(10)
                        .and_then(|len| len.checked_add(u32::from(byte - b'0')))
                        .ok_or(DecodeError::MalformedStream)?;
                }
                _ => {}
            }
        }

        let bit = match self.peek() {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(DecodeError::MalformedStream),
        };
        self.cursor += 1;

        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n')) {
            self.cursor += 1;
        }

        Ok(Run::new(len, bit))
    }
}
