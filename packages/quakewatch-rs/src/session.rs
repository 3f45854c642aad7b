// Session: one decoder, one aggregator and one tracker driven together
//
// The driving loop calls `step` (or `poll`) repeatedly. Each decoded frame is
// stamped with the wall-clock seconds since the session started and routed to
// both consumers before being handed back for presentation.

use crate::aggregator::{AggregatorConfig, StreamAggregator, WindowSnapshot};
use crate::decoder::FrameDecoder;
use crate::error::{QuakeError, Result};
use crate::report::{FailureReporter, RateLimitedLogger, DEFAULT_REPORT_EVERY};
use crate::stats::{StatisticsTracker, StatsSnapshot};
use crate::types::{DecodeError, Frame};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Instant;

/// Decode attempts per presentation refresh in the reference cadence.
pub const DEFAULT_FRAMES_PER_POLL: usize = 10;

/// Consecutive I/O failures after which the link is treated as lost.
pub const DEFAULT_IO_FAILURE_LIMIT: u64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub windows: AggregatorConfig,
    pub frames_per_poll: usize,
    pub io_failure_limit: u64,
    pub report_every: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            windows: AggregatorConfig::default(),
            frames_per_poll: DEFAULT_FRAMES_PER_POLL,
            io_failure_limit: DEFAULT_IO_FAILURE_LIMIT,
            report_every: DEFAULT_REPORT_EVERY,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        self.windows.validate()?;
        if self.frames_per_poll == 0 {
            return Err(QuakeError::InvalidParameter(
                "frames per poll must be at least 1".to_string(),
            ));
        }
        if self.report_every == 0 {
            return Err(QuakeError::InvalidParameter(
                "report interval must be at least 1".to_string(),
            ));
        }
        if self.io_failure_limit == 0 {
            return Err(QuakeError::InvalidParameter(
                "I/O failure limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct Session<P = RateLimitedLogger> {
    decoder: FrameDecoder<P>,
    aggregator: StreamAggregator,
    tracker: StatisticsTracker,
    started: Instant,
    frames_per_poll: usize,
    io_failure_limit: u64,
    consecutive_io_failures: u64,
    link_lost: bool,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self> {
        let reporter = RateLimitedLogger::new(config.report_every);
        Self::with_decoder(config, FrameDecoder::with_reporter(reporter))
    }
}

impl<P: FailureReporter> Session<P> {
    pub fn with_decoder(config: SessionConfig, decoder: FrameDecoder<P>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            decoder,
            aggregator: StreamAggregator::new(&config.windows),
            tracker: StatisticsTracker::new(),
            started: Instant::now(),
            frames_per_poll: config.frames_per_poll,
            io_failure_limit: config.io_failure_limit,
            consecutive_io_failures: 0,
            link_lost: false,
        })
    }

    /// One decode call. Returns the routed frame, or `None` if nothing was available.
    pub fn step<S: Read + ?Sized>(&mut self, source: &mut S) -> Option<Frame> {
        let frame = self.decoder.decode_next(source)?;
        let elapsed = self.elapsed_secs();

        self.aggregator.push(&frame, elapsed);
        self.tracker.record(&frame);
        self.track_link(&frame);

        Some(frame)
    }

    /// Up to `frames_per_poll` decode calls, stopping early if the link is lost.
    pub fn poll<S: Read + ?Sized>(&mut self, source: &mut S) -> Vec<Frame> {
        self.poll_until(source, || false)
    }

    /// Like [`Session::poll`], but checks `stop` before every decode call.
    ///
    /// Each call may block for a full read timeout, so this bounds how long a
    /// cancellation waits.
    pub fn poll_until<S, F>(&mut self, source: &mut S, mut stop: F) -> Vec<Frame>
    where
        S: Read + ?Sized,
        F: FnMut() -> bool,
    {
        let mut frames = Vec::new();
        for _ in 0..self.frames_per_poll {
            if self.link_lost || stop() {
                break;
            }
            if let Some(frame) = self.step(source) {
                frames.push(frame);
            }
        }
        frames
    }

    fn track_link(&mut self, frame: &Frame) {
        match frame {
            Frame::Error(DecodeError::IoFailure { permanent, message, .. }) => {
                self.consecutive_io_failures += 1;
                if !self.link_lost
                    && (*permanent || self.consecutive_io_failures >= self.io_failure_limit)
                {
                    log::error!(
                        "Serial link lost after {} consecutive I/O failures: {}",
                        self.consecutive_io_failures,
                        message
                    );
                    self.link_lost = true;
                }
            }
            Frame::Sensor(_) | Frame::Intensity(_) => self.consecutive_io_failures = 0,
            Frame::Error(DecodeError::UnknownTag { .. }) => {}
        }
    }

    /// True once the byte source has failed permanently.
    pub fn link_lost(&self) -> bool {
        self.link_lost
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    pub fn aggregator(&self) -> &StreamAggregator {
        &self.aggregator
    }

    pub fn tracker(&self) -> &StatisticsTracker {
        &self.tracker
    }

    pub fn window(&self) -> WindowSnapshot {
        self.aggregator.snapshot()
    }

    pub fn statistics(&self) -> StatsSnapshot {
        self.tracker.snapshot(self.elapsed_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorSample;
    use std::io::{self, Cursor, ErrorKind};

    /// Fails every read with the given kind.
    struct FailingReader(ErrorKind);

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }
    }

    fn wire(ts: u64) -> Vec<u8> {
        SensorSample {
            device_timestamp_ms: ts,
            x: 0.1,
            y: 0.2,
            z: 0.3,
        }
        .to_wire()
    }

    #[test]
    fn test_step_routes_to_both_consumers() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        let mut source = Cursor::new(wire(123));

        assert!(matches!(session.step(&mut source), Some(Frame::Sensor(_))));
        assert_eq!(session.tracker().sensor_count(), 1);
        assert_eq!(session.window().sensor.x, vec![0.1]);
        assert_eq!(session.aggregator().first_device_timestamp_ms(), Some(123));
        assert!(session.step(&mut source).is_none());
    }

    #[test]
    fn test_poll_is_bounded() {
        let config = SessionConfig {
            frames_per_poll: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        let bytes: Vec<u8> = (1..=5).flat_map(wire).collect();
        let mut source = Cursor::new(bytes);

        assert_eq!(session.poll(&mut source).len(), 3);
        assert_eq!(session.poll(&mut source).len(), 2);
        assert!(session.poll(&mut source).is_empty());
        assert_eq!(session.statistics().sensor_count, 5);
    }

    #[test]
    fn test_poll_until_stops_on_request() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        let bytes: Vec<u8> = (1..=5).flat_map(wire).collect();
        let mut source = Cursor::new(bytes);

        let mut calls = 0;
        let frames = session.poll_until(&mut source, || {
            calls += 1;
            calls > 2
        });
        assert_eq!(frames.len(), 2);
        assert_eq!(session.tracker().sensor_count(), 2);
    }

    #[test]
    fn test_permanent_failure_loses_link() {
        let mut session = Session::new(SessionConfig::default()).unwrap();
        let mut source = FailingReader(ErrorKind::NotConnected);

        let frames = session.poll(&mut source);
        assert_eq!(frames.len(), 1);
        assert!(session.link_lost());
        assert_eq!(session.statistics().io_failure_count, 1);
    }

    #[test]
    fn test_transient_failures_hit_limit() {
        let config = SessionConfig {
            frames_per_poll: 10,
            io_failure_limit: 4,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        let mut source = FailingReader(ErrorKind::Other);

        let frames = session.poll(&mut source);
        assert_eq!(frames.len(), 4);
        assert!(session.link_lost());
        assert_eq!(session.statistics().error_count, 4);
    }

    #[test]
    fn test_good_frame_resets_failure_streak() {
        let config = SessionConfig {
            io_failure_limit: 2,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();

        session.step(&mut FailingReader(ErrorKind::Other));
        session.step(&mut Cursor::new(wire(1)));
        session.step(&mut FailingReader(ErrorKind::Other));
        assert!(!session.link_lost());

        session.step(&mut FailingReader(ErrorKind::Other));
        assert!(session.link_lost());
    }

    #[test]
    fn test_noise_does_not_reset_failure_streak() {
        let config = SessionConfig {
            io_failure_limit: 2,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();

        session.step(&mut FailingReader(ErrorKind::Other));
        assert!(matches!(
            session.step(&mut Cursor::new(vec![0x58])),
            Some(Frame::Error(DecodeError::UnknownTag { tag: 0x58 }))
        ));
        session.step(&mut FailingReader(ErrorKind::Other));
        assert!(session.link_lost());
        assert_eq!(session.statistics().error_count, 3);
    }

    #[test]
    fn test_zero_report_interval_rejected() {
        let config = SessionConfig {
            report_every: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(QuakeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            frames_per_poll: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(
            Session::new(config),
            Err(QuakeError::InvalidParameter(_))
        ));
    }
}
