//! Playback loop
//!
//! Runs the decode → pack → present cycle at the configured frame rate:
//!
//! ```text
//! ┌────────┐   frame   ┌────────┐  packed  ┌──────┐
//! │ decode │ ────────► │  pack  │ ───────► │ sink │ ──► wait out the period
//! └────────┘           └────────┘          └──────┘
//! ```
//!
//! The loop ends when the stream runs out (after the configured number of
//! passes) or turns out to be malformed. Both are normal stops and are
//! reported in the [`PlaybackSummary`]; only sink failures and bad buffers
//! are errors.
//!
//! ```ignore
//! let config = PlayerConfig::default().with_loops(0);
//! let mut player = Player::new(config, VIDEO)?;
//! let summary = player.play(&mut frame, &mut packed, &mut oled, &clock, &mut delay).await?;
//! ```

use embedded_hal_async::delay::DelayNs;

use crate::config::{ConfigError, PlayerConfig};
use crate::pack::FramePacker;
use crate::stream::{DecodeError, RleDecoder};
use crate::traits::{Clock, FrameSink, SinkError};

/// Errors that abort playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayError {
    /// Frame buffer rejected by the decoder
    Decode(DecodeError),
    /// Packed buffer shorter than the geometry's packed length
    PackedBufferTooSmall,
    /// Display transfer failed
    Sink(SinkError),
}

impl From<SinkError> for PlayError {
    fn from(e: SinkError) -> Self {
        PlayError::Sink(e)
    }
}

/// Outcome of a completed playback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlaybackSummary {
    /// Frames handed to the sink
    pub frames_shown: u32,
    /// Passes that reached the end of the stream
    pub loops_completed: u32,
    /// Frames that took longer than the frame period
    pub late_frames: u32,
    /// Why playback stopped: `EndOfStream` or `MalformedStream`
    pub stop: DecodeError,
}

/// Drives one stream onto one sink
pub struct Player<'a> {
    config: PlayerConfig,
    decoder: RleDecoder<'a>,
    packer: FramePacker,
}

impl<'a> Player<'a> {
    /// Create a player for `stream` with the given config
    pub fn new(config: PlayerConfig, stream: &'a [u8]) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        let packer = FramePacker::new(geometry, config.bit_order)?;

        Ok(Self {
            config,
            decoder: RleDecoder::new(stream, geometry),
            packer,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// The underlying decoder
    pub fn decoder(&self) -> &RleDecoder<'a> {
        &self.decoder
    }

    /// Rewind the stream to the first frame
    pub fn rewind(&mut self) {
        self.decoder.reset();
    }

    /// Play until the stream ends or turns out malformed
    ///
    /// `frame` needs `pixel_count()` bytes and `packed` needs `packed_len()`
    /// bytes of the configured geometry.
    pub async fn play<S, C, D>(
        &mut self,
        frame: &mut [u8],
        packed: &mut [u8],
        sink: &mut S,
        clock: &C,
        delay: &mut D,
    ) -> Result<PlaybackSummary, PlayError>
    where
        S: FrameSink,
        C: Clock,
        D: DelayNs,
    {
        let geometry = self.decoder.geometry();
        if frame.len() < geometry.pixel_count() {
            return Err(PlayError::Decode(DecodeError::BufferTooSmall));
        }
        if packed.len() < geometry.packed_len() {
            return Err(PlayError::PackedBufferTooSmall);
        }
        let packed = &mut packed[..geometry.packed_len()];

        let period_us = self.config.frame_period_us();
        let mut frames_shown: u32 = 0;
        let mut loops_completed: u32 = 0;
        let mut late_frames: u32 = 0;
        let mut shown_this_pass: u32 = 0;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Playback started: {}x{} at {} fps",
            geometry.width(),
            geometry.height(),
            self.config.fps
        );

        let stop = loop {
            let started = clock.now_us();

            match self.decoder.decode_next_frame(frame) {
                Ok(()) => {}
                Err(DecodeError::EndOfStream) => {
                    loops_completed += 1;
                    let more_passes = self.config.loops_forever()
                        || loops_completed < u32::from(self.config.loops);
                    // A stream without a single whole frame would spin forever
                    if !more_passes || shown_this_pass == 0 {
                        break DecodeError::EndOfStream;
                    }

                    #[cfg(feature = "defmt")]
                    defmt::debug!("End of stream, replaying (pass {})", loops_completed + 1);

                    self.decoder.reset();
                    shown_this_pass = 0;
                    continue;
                }
                Err(DecodeError::MalformedStream) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!(
                        "Malformed stream at byte {}, stopping",
                        self.decoder.position()
                    );

                    break DecodeError::MalformedStream;
                }
                Err(e) => return Err(PlayError::Decode(e)),
            }

            self.packer.pack(frame, packed);
            sink.draw_packed(geometry, packed).await?;
            frames_shown = frames_shown.saturating_add(1);
            shown_this_pass += 1;

            let elapsed = clock.now_us().saturating_sub(started);
            if elapsed > period_us {
                late_frames = late_frames.saturating_add(1);

                #[cfg(feature = "defmt")]
                defmt::debug!("Frame {} late by {} us", frames_shown, elapsed - period_us);
            }

            let wait = period_us.saturating_sub(elapsed);
            if wait > 0 {
                delay.delay_us(u32::try_from(wait).unwrap_or(u32::MAX)).await;
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Playback finished: {} frames, {} late",
            frames_shown,
            late_frames
        );

        Ok(PlaybackSummary {
            frames_shown,
            loops_completed,
            late_frames,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FrameGeometry;
    use crate::pack::pack_frame;

    use core::cell::Cell;
    use embassy_futures::block_on;
    use std::vec::Vec;

    /// Records every packed frame it receives
    #[derive(Default)]
    struct MockSink {
        frames: Vec<Vec<u8>>,
        fail_after: Option<usize>,
    }

    impl FrameSink for MockSink {
        async fn draw_packed(
            &mut self,
            _geometry: FrameGeometry,
            packed: &[u8],
        ) -> Result<(), SinkError> {
            if self.fail_after == Some(self.frames.len()) {
                return Err(SinkError::Communication);
            }
            self.frames.push(packed.to_vec());
            Ok(())
        }
    }

    /// Clock that advances by a fixed step on every read
    struct MockClock {
        now: Cell<u64>,
        step: u64,
    }

    impl MockClock {
        fn new(step: u64) -> Self {
            Self {
                now: Cell::new(0),
                step,
            }
        }
    }

    impl Clock for MockClock {
        fn now_us(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }

    #[derive(Default)]
    struct MockDelay {
        waits_ns: Vec<u32>,
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.waits_ns.push(ns);
        }

        async fn delay_us(&mut self, us: u32) {
            self.waits_ns.push(us.saturating_mul(1000));
        }
    }

    /// 8x8 config: one page, one packed byte per column
    fn config() -> PlayerConfig {
        PlayerConfig::new(8, 8).with_fps(10)
    }

    #[test]
    fn test_plays_every_frame_and_stops_at_end() {
        // Frame 1 all set, frame 2 top row set
        let stream = b"64:1 8:1 56:0\0";
        let mut player = Player::new(config(), stream).unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();
        let clock = MockClock::new(1_000);
        let mut delay = MockDelay::default();

        let summary = block_on(player.play(&mut frame, &mut packed, &mut sink, &clock, &mut delay))
            .unwrap();

        assert_eq!(
            summary,
            PlaybackSummary {
                frames_shown: 2,
                loops_completed: 1,
                late_frames: 0,
                stop: DecodeError::EndOfStream,
            }
        );
        assert_eq!(sink.frames, [[0xFF; 8], [0x01; 8]]);
    }

    #[test]
    fn test_sink_receives_packed_layout() {
        let geometry = FrameGeometry::paged(8, 8).unwrap();
        let mut expected_frame = [0u8; 64];
        expected_frame[geometry.index(3, 5)] = 1;
        let mut expected = [0u8; 8];
        pack_frame(geometry, &expected_frame, &mut expected);

        let stream = b"43:0 1:1 20:0";
        let mut player = Player::new(config(), stream).unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();

        block_on(player.play(
            &mut frame,
            &mut packed,
            &mut sink,
            &MockClock::new(0),
            &mut MockDelay::default(),
        ))
        .unwrap();

        assert_eq!(sink.frames, [expected]);
        assert_eq!(sink.frames[0][3], 0b0010_0000);
    }

    #[test]
    fn test_paces_to_frame_period() {
        let mut player = Player::new(config(), b"128:0").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();
        // Two clock reads per frame, 30 ms apart
        let clock = MockClock::new(30_000);
        let mut delay = MockDelay::default();

        block_on(player.play(&mut frame, &mut packed, &mut sink, &clock, &mut delay)).unwrap();

        // 100 ms period at 10 fps
        assert_eq!(delay.waits_ns, [70_000_000, 70_000_000]);
    }

    #[test]
    fn test_slow_frames_are_counted_not_delayed() {
        let mut player = Player::new(config(), b"128:0").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();
        let clock = MockClock::new(150_000);
        let mut delay = MockDelay::default();

        let summary =
            block_on(player.play(&mut frame, &mut packed, &mut sink, &clock, &mut delay)).unwrap();

        assert_eq!(summary.late_frames, 2);
        assert!(delay.waits_ns.is_empty());
    }

    #[test]
    fn test_loops_replay_the_stream() {
        let mut player = Player::new(config().with_loops(3), b"64:1").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();

        let summary = block_on(player.play(
            &mut frame,
            &mut packed,
            &mut sink,
            &MockClock::new(0),
            &mut MockDelay::default(),
        ))
        .unwrap();

        assert_eq!(summary.frames_shown, 3);
        assert_eq!(summary.loops_completed, 3);
        assert_eq!(summary.stop, DecodeError::EndOfStream);
    }

    #[test]
    fn test_endless_loop_stops_on_frameless_stream() {
        let mut player = Player::new(config().with_loops(0), b"10:1").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();

        let summary = block_on(player.play(
            &mut frame,
            &mut packed,
            &mut sink,
            &MockClock::new(0),
            &mut MockDelay::default(),
        ))
        .unwrap();

        assert_eq!(summary.frames_shown, 0);
        assert_eq!(summary.stop, DecodeError::EndOfStream);
    }

    #[test]
    fn test_malformed_stream_stops_without_replay() {
        let mut player = Player::new(config().with_loops(0), b"64:0 3:x").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();

        let summary = block_on(player.play(
            &mut frame,
            &mut packed,
            &mut sink,
            &MockClock::new(0),
            &mut MockDelay::default(),
        ))
        .unwrap();

        assert_eq!(summary.frames_shown, 1);
        assert_eq!(summary.loops_completed, 0);
        assert_eq!(summary.stop, DecodeError::MalformedStream);
    }

    #[test]
    fn test_sink_failure_aborts() {
        let mut player = Player::new(config(), b"192:1").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink {
            fail_after: Some(1),
            ..Default::default()
        };

        let result = block_on(player.play(
            &mut frame,
            &mut packed,
            &mut sink,
            &MockClock::new(0),
            &mut MockDelay::default(),
        ));

        assert_eq!(result, Err(PlayError::Sink(SinkError::Communication)));
        assert_eq!(sink.frames.len(), 1);
    }

    #[test]
    fn test_short_buffers_are_rejected_up_front() {
        let mut player = Player::new(config(), b"64:1").unwrap();
        let mut sink = MockSink::default();
        let clock = MockClock::new(0);
        let mut delay = MockDelay::default();

        let mut small_frame = [0u8; 63];
        let mut packed = [0u8; 8];
        assert_eq!(
            block_on(player.play(&mut small_frame, &mut packed, &mut sink, &clock, &mut delay)),
            Err(PlayError::Decode(DecodeError::BufferTooSmall))
        );

        let mut frame = [0u8; 64];
        let mut small_packed = [0u8; 7];
        assert_eq!(
            block_on(player.play(&mut frame, &mut small_packed, &mut sink, &clock, &mut delay)),
            Err(PlayError::PackedBufferTooSmall)
        );
        assert!(sink.frames.is_empty());
        assert_eq!(player.decoder().position(), 0);
    }

    #[test]
    fn test_rejects_unpackable_config() {
        assert!(matches!(
            Player::new(PlayerConfig::new(8, 4), b"32:1"),
            Err(ConfigError::InvalidGeometry(_))
        ));
        assert!(matches!(
            Player::new(config().with_fps(0), b"64:1"),
            Err(ConfigError::InvalidFps)
        ));
    }

    #[test]
    fn test_rewind_restarts_stream() {
        let mut player = Player::new(config(), b"64:1 64:0").unwrap();
        let mut frame = [0u8; 64];
        let mut packed = [0u8; 8];
        let mut sink = MockSink::default();
        let clock = MockClock::new(0);
        let mut delay = MockDelay::default();

        block_on(player.play(&mut frame, &mut packed, &mut sink, &clock, &mut delay)).unwrap();
        assert_eq!(player.decoder().frames_decoded(), 2);

        player.rewind();
        block_on(player.play(&mut frame, &mut packed, &mut sink, &clock, &mut delay)).unwrap();
        assert_eq!(sink.frames.len(), 4);
        assert_eq!(sink.frames[2], [0xFF; 8]);
    }
}
