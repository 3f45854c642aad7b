use crate::types::{DecodeError, Frame};
use serde::{Deserialize, Serialize};

/// Running packet counters for one session.
///
/// All counters are monotonic. Short reads never reach the tracker, so they are
/// not counted anywhere.
#[derive(Debug, Clone, Default)]
pub struct StatisticsTracker {
    sensor_count: u64,
    intensity_count: u64,
    unknown_tag_count: u64,
    io_failure_count: u64,
    first_timestamp_ms: Option<u64>,
    last_timestamp_ms: Option<u64>,
}

/// Derived statistics at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub elapsed_secs: f64,
    pub sensor_count: u64,
    pub intensity_count: u64,
    pub error_count: u64,
    pub unknown_tag_count: u64,
    pub io_failure_count: u64,
    pub sensor_rate_hz: f64,
    pub intensity_rate_hz: f64,
    pub first_timestamp_ms: Option<u64>,
    pub last_timestamp_ms: Option<u64>,
    /// `last - first`, saturating at 0 if the device clock went backwards.
    pub span_ms: Option<u64>,
}

impl StatisticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, frame: &Frame) {
        match frame {
            Frame::Sensor(_) => self.sensor_count += 1,
            Frame::Intensity(_) => self.intensity_count += 1,
            Frame::Error(DecodeError::UnknownTag { .. }) => self.unknown_tag_count += 1,
            Frame::Error(DecodeError::IoFailure { .. }) => self.io_failure_count += 1,
        }

        if let Some(ts) = frame.synced_timestamp_ms() {
            self.first_timestamp_ms.get_or_insert(ts);
            self.last_timestamp_ms = Some(ts);
        }
    }

    pub fn sensor_count(&self) -> u64 {
        self.sensor_count
    }

    pub fn intensity_count(&self) -> u64 {
        self.intensity_count
    }

    pub fn error_count(&self) -> u64 {
        self.unknown_tag_count + self.io_failure_count
    }

    pub fn snapshot(&self, elapsed_secs: f64) -> StatsSnapshot {
        let rate = |count: u64| {
            if elapsed_secs > 0.0 {
                count as f64 / elapsed_secs
            } else {
                0.0
            }
        };

        let span_ms = match (self.first_timestamp_ms, self.last_timestamp_ms) {
            (Some(first), Some(last)) => Some(last.saturating_sub(first)),
            _ => None,
        };

        StatsSnapshot {
            elapsed_secs,
            sensor_count: self.sensor_count,
            intensity_count: self.intensity_count,
            error_count: self.error_count(),
            unknown_tag_count: self.unknown_tag_count,
            io_failure_count: self.io_failure_count,
            sensor_rate_hz: rate(self.sensor_count),
            intensity_rate_hz: rate(self.intensity_count),
            first_timestamp_ms: self.first_timestamp_ms,
            last_timestamp_ms: self.last_timestamp_ms,
            span_ms,
        }
    }
}
