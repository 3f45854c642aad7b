use serde::{Deserialize, Serialize};
use std::io;

/// Tag byte introducing a tri-axial acceleration sample ('S').
pub const SENSOR_TAG: u8 = 0x53;

/// Tag byte introducing a seismic intensity record ('I').
pub const INTENSITY_TAG: u8 = 0x49;

/// Body length of a sensor frame: `u64` timestamp + three `f32` axes.
pub const SENSOR_BODY_LEN: usize = 20;

/// Body length of an intensity frame: `u64` timestamp + two `f32` values.
pub const INTENSITY_BODY_LEN: usize = 16;

/// Raw acceleration sample reported by the device, in Gal.
///
/// A `device_timestamp_ms` of 0 means the device has no time reference yet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSample {
    pub device_timestamp_ms: u64,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl SensorSample {
    /// Decode a sensor body (the 20 bytes following the tag).
    pub fn from_body(body: &[u8; SENSOR_BODY_LEN]) -> Self {
        Self {
            device_timestamp_ms: le_u64(&body[0..8]),
            x: le_f32(&body[8..12]),
            y: le_f32(&body[12..16]),
            z: le_f32(&body[16..20]),
        }
    }

    /// Encode as a complete 21-byte wire frame, tag included.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + SENSOR_BODY_LEN);
        out.push(SENSOR_TAG);
        out.extend_from_slice(&self.device_timestamp_ms.to_le_bytes());
        out.extend_from_slice(&self.x.to_le_bytes());
        out.extend_from_slice(&self.y.to_le_bytes());
        out.extend_from_slice(&self.z.to_le_bytes());
        out
    }
}

/// Computed seismic summary: JMA intensity and peak ground acceleration (Gal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntensityRecord {
    pub device_timestamp_ms: u64,
    pub intensity: f32,
    pub pga: f32,
}

impl IntensityRecord {
    /// Decode an intensity body (the 16 bytes following the tag).
    pub fn from_body(body: &[u8; INTENSITY_BODY_LEN]) -> Self {
        Self {
            device_timestamp_ms: le_u64(&body[0..8]),
            intensity: le_f32(&body[8..12]),
            pga: le_f32(&body[12..16]),
        }
    }

    /// Encode as a complete 17-byte wire frame, tag included.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + INTENSITY_BODY_LEN);
        out.push(INTENSITY_TAG);
        out.extend_from_slice(&self.device_timestamp_ms.to_le_bytes());
        out.extend_from_slice(&self.intensity.to_le_bytes());
        out.extend_from_slice(&self.pga.to_le_bytes());
        out
    }
}

/// Decode-level failure. Never fatal to the driving loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum DecodeError {
    /// A tag byte matching neither known header. The byte has been consumed.
    UnknownTag { tag: u8 },

    /// The underlying byte source failed.
    IoFailure {
        #[serde(skip)]
        kind: io::ErrorKind,
        message: String,
        /// The device is gone; further reads will not recover.
        permanent: bool,
    },
}

/// One classified result of a decode call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Sensor(SensorSample),
    Intensity(IntensityRecord),
    Error(DecodeError),
}

impl Frame {
    /// Device timestamp carried by a data frame, if it is time-synchronized.
    pub fn synced_timestamp_ms(&self) -> Option<u64> {
        let ts = match self {
            Frame::Sensor(s) => s.device_timestamp_ms,
            Frame::Intensity(r) => r.device_timestamp_ms,
            Frame::Error(_) => return None,
        };
        (ts != 0).then_some(ts)
    }
}

fn le_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    u64::from_le_bytes(raw)
}

fn le_f32(bytes: &[u8]) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    f32::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_wire_layout() {
        let sample = SensorSample {
            device_timestamp_ms: 1000,
            x: 1.0,
            y: 2.0,
            z: 3.0,
        };
        let wire = sample.to_wire();
        assert_eq!(wire.len(), 21);
        assert_eq!(wire[0], SENSOR_TAG);
        assert_eq!(&wire[1..9], &1000u64.to_le_bytes());
        assert_eq!(&wire[9..13], &1.0f32.to_le_bytes());
        assert_eq!(&wire[17..21], &3.0f32.to_le_bytes());
    }

    #[test]
    fn test_intensity_from_body() {
        let mut body = [0u8; INTENSITY_BODY_LEN];
        body[0..8].copy_from_slice(&1050u64.to_le_bytes());
        body[8..12].copy_from_slice(&2.5f32.to_le_bytes());
        body[12..16].copy_from_slice(&10.0f32.to_le_bytes());

        let record = IntensityRecord::from_body(&body);
        assert_eq!(record.device_timestamp_ms, 1050);
        assert_eq!(record.intensity, 2.5);
        assert_eq!(record.pga, 10.0);
    }

    #[test]
    fn test_synced_timestamp_ignores_zero() {
        let unsynced = Frame::Sensor(SensorSample {
            device_timestamp_ms: 0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
        });
        assert_eq!(unsynced.synced_timestamp_ms(), None);

        let synced = Frame::Intensity(IntensityRecord {
            device_timestamp_ms: 42,
            intensity: 0.1,
            pga: 0.2,
        });
        assert_eq!(synced.synced_timestamp_ms(), Some(42));
        assert!(Frame::Error(DecodeError::UnknownTag { tag: 0x58 })
            .synced_timestamp_ms()
            .is_none());
    }

    #[test]
    fn test_frame_json_shape() {
        let frame = Frame::Error(DecodeError::UnknownTag { tag: 0x58 });
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["error"], "unknown_tag");
        assert_eq!(json["tag"], 0x58);

        let frame = Frame::Sensor(SensorSample {
            device_timestamp_ms: 7,
            x: 0.5,
            y: 0.0,
            z: -0.5,
        });
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "sensor");
        assert_eq!(json["device_timestamp_ms"], 7);
    }
}
