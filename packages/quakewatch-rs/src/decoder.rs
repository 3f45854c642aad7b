use crate::report::{FailureReporter, RateLimitedLogger};
use crate::types::{
    DecodeError, Frame, IntensityRecord, SensorSample, INTENSITY_BODY_LEN, INTENSITY_TAG,
    SENSOR_BODY_LEN, SENSOR_TAG,
};
use std::io::{self, ErrorKind, Read};

/// Tag-based frame decoder for the ES-Net serial protocol.
///
/// The wire format has no length prefix and no checksum. Each call reads one
/// tag byte and, for a known tag, a fixed-size body. Unknown bytes are consumed
/// one at a time, so the decoder drifts back into alignment on its own. A
/// corrupted run that happens to start with a valid tag is decoded as a normal
/// frame; nothing in the format allows detecting it.
///
/// The decoder keeps no state between calls besides the injected reporter.
pub struct FrameDecoder<P = RateLimitedLogger> {
    reporter: P,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::with_reporter(RateLimitedLogger::default())
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FailureReporter> FrameDecoder<P> {
    pub fn with_reporter(reporter: P) -> Self {
        Self { reporter }
    }

    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    /// Decode the next frame from `source`.
    ///
    /// Returns `None` when no complete frame is available right now: either no
    /// tag byte arrived within the source's timeout, or a frame body was cut
    /// short. Truncated bodies are dropped without any error signal.
    pub fn decode_next<S: Read + ?Sized>(&mut self, source: &mut S) -> Option<Frame> {
        let mut tag = [0u8; 1];
        match read_available(source, &mut tag) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(e) => return Some(self.io_failure(e)),
        }

        match tag[0] {
            SENSOR_TAG => {
                let mut body = [0u8; SENSOR_BODY_LEN];
                match read_available(source, &mut body) {
                    Ok(n) if n == SENSOR_BODY_LEN => {
                        let sample = SensorSample::from_body(&body);
                        log::trace!("Sensor frame: {:?}", sample);
                        Some(Frame::Sensor(sample))
                    }
                    Ok(n) => {
                        log::trace!("Short sensor frame ({} of {} bytes) dropped", n, SENSOR_BODY_LEN);
                        None
                    }
                    Err(e) => Some(self.io_failure(e)),
                }
            }
            INTENSITY_TAG => {
                let mut body = [0u8; INTENSITY_BODY_LEN];
                match read_available(source, &mut body) {
                    Ok(n) if n == INTENSITY_BODY_LEN => {
                        let record = IntensityRecord::from_body(&body);
                        log::trace!("Intensity frame: {:?}", record);
                        Some(Frame::Intensity(record))
                    }
                    Ok(n) => {
                        log::trace!(
                            "Short intensity frame ({} of {} bytes) dropped",
                            n,
                            INTENSITY_BODY_LEN
                        );
                        None
                    }
                    Err(e) => Some(self.io_failure(e)),
                }
            }
            other => {
                log::debug!("Skipping unknown tag byte 0x{:02X}", other);
                Some(Frame::Error(DecodeError::UnknownTag { tag: other }))
            }
        }
    }

    fn io_failure(&mut self, error: io::Error) -> Frame {
        self.reporter.io_failure(&error);
        let kind = error.kind();
        Frame::Error(DecodeError::IoFailure {
            kind,
            message: error.to_string(),
            permanent: is_permanent(kind),
        })
    }
}

/// Read into `buf` until it is full or the source runs dry.
///
/// `Ok(0)`, `TimedOut` and `WouldBlock` all end the read early and report the
/// bytes gathered so far. Serial ports signal their read timeout as `TimedOut`.
fn read_available<S: Read + ?Sized>(source: &mut S, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Error kinds meaning the device or port is gone for good.
pub fn is_permanent(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::NotFound
            | ErrorKind::NotConnected
            | ErrorKind::BrokenPipe
            | ErrorKind::PermissionDenied
            | ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
    )
}
