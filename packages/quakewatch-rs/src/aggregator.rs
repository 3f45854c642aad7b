// Rolling display windows fed by decoded frames
//
// Sensor samples and intensity records each land in their own bounded series.
// Every stored point carries the wall-clock seconds since session start at
// which it was dispatched, plus the raw device timestamp.

use crate::buffer::{BoundedSeries, SeriesMetrics};
use crate::error::{QuakeError, Result};
use crate::types::Frame;
use serde::{Deserialize, Serialize};

/// Sensor samples kept for display.
pub const SENSOR_WINDOW_CAPACITY: usize = 500;

/// Intensity records kept for display.
pub const INTENSITY_WINDOW_CAPACITY: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub sensor_capacity: usize,
    pub intensity_capacity: usize,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sensor_capacity: SENSOR_WINDOW_CAPACITY,
            intensity_capacity: INTENSITY_WINDOW_CAPACITY,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sensor_capacity == 0 || self.intensity_capacity == 0 {
            return Err(QuakeError::InvalidParameter(format!(
                "window capacities must be positive (sensor={}, intensity={})",
                self.sensor_capacity, self.intensity_capacity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorPoint {
    pub elapsed_secs: f64,
    pub device_timestamp_ms: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityPoint {
    pub elapsed_secs: f64,
    pub device_timestamp_ms: u64,
    pub intensity: f32,
    pub pga: f32,
}

/// Column view of the sensor window, index-aligned, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorWindow {
    pub elapsed: Vec<f64>,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub device_timestamp_ms: Vec<u64>,
}

/// Column view of the intensity window, index-aligned, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntensityWindow {
    pub elapsed: Vec<f64>,
    pub intensity: Vec<f32>,
    pub pga: Vec<f32>,
    pub device_timestamp_ms: Vec<u64>,
}

/// Immutable copy of everything the presentation layer may draw.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowSnapshot {
    pub sensor: SensorWindow,
    pub intensity: IntensityWindow,
    pub first_device_timestamp_ms: Option<u64>,
    pub sensor_metrics: SeriesMetrics,
    pub intensity_metrics: SeriesMetrics,
}

pub struct StreamAggregator {
    sensor: BoundedSeries<SensorPoint>,
    intensity: BoundedSeries<IntensityPoint>,
    first_device_timestamp_ms: Option<u64>,
}

impl StreamAggregator {
    pub fn new(config: &AggregatorConfig) -> Self {
        Self {
            sensor: BoundedSeries::new(config.sensor_capacity),
            intensity: BoundedSeries::new(config.intensity_capacity),
            first_device_timestamp_ms: None,
        }
    }

    /// Route a frame into its window. Error frames are ignored.
    ///
    /// `elapsed_secs` is measured by the caller at dispatch time.
    pub fn push(&mut self, frame: &Frame, elapsed_secs: f64) {
        if self.first_device_timestamp_ms.is_none() {
            if let Some(ts) = frame.synced_timestamp_ms() {
                log::info!("Device time reference acquired: {} ms", ts);
                self.first_device_timestamp_ms = Some(ts);
            }
        }

        match frame {
            Frame::Sensor(s) => {
                self.sensor.push(SensorPoint {
                    elapsed_secs,
                    device_timestamp_ms: s.device_timestamp_ms,
                    x: s.x,
                    y: s.y,
                    z: s.z,
                });
            }
            Frame::Intensity(r) => {
                self.intensity.push(IntensityPoint {
                    elapsed_secs,
                    device_timestamp_ms: r.device_timestamp_ms,
                    intensity: r.intensity,
                    pga: r.pga,
                });
            }
            Frame::Error(_) => {}
        }
    }

    /// First non-zero device timestamp seen on either channel. Never changes once set.
    pub fn first_device_timestamp_ms(&self) -> Option<u64> {
        self.first_device_timestamp_ms
    }

    /// The `n` most recent intensity points, oldest first.
    pub fn recent_intensity(&self, n: usize) -> impl Iterator<Item = &IntensityPoint> + '_ {
        let skip = self.intensity.len().saturating_sub(n);
        self.intensity.iter().skip(skip)
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        let mut sensor = SensorWindow::default();
        for p in self.sensor.iter() {
            sensor.elapsed.push(p.elapsed_secs);
            sensor.x.push(p.x);
            sensor.y.push(p.y);
            sensor.z.push(p.z);
            sensor.device_timestamp_ms.push(p.device_timestamp_ms);
        }

        let mut intensity = IntensityWindow::default();
        for p in self.intensity.iter() {
            intensity.elapsed.push(p.elapsed_secs);
            intensity.intensity.push(p.intensity);
            intensity.pga.push(p.pga);
            intensity.device_timestamp_ms.push(p.device_timestamp_ms);
        }

        WindowSnapshot {
            sensor,
            intensity,
            first_device_timestamp_ms: self.first_device_timestamp_ms,
            sensor_metrics: self.sensor.metrics(),
            intensity_metrics: self.intensity.metrics(),
        }
    }
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new(&AggregatorConfig::default())
    }
}
