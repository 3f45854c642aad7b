// Serial port byte source
//
// Opens the sensor's serial port in blocking mode with a read timeout so the
// decoder can pull bytes on demand. A read that sees no data within the
// timeout fails with `TimedOut`, which the decoder treats as "nothing yet".

use crate::error::{QuakeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_serial::SerialPortType;

pub use tokio_serial::SerialPort;

/// Baud rate the ES-Net firmware transmits at.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Per-read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl SerialConfig {
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Open the configured port for blocking reads.
pub fn open_serial(config: &SerialConfig) -> Result<Box<dyn SerialPort>> {
    log::info!(
        "Opening serial port: {} at {} baud (timeout {:?})",
        config.port,
        config.baud_rate,
        config.timeout
    );

    let port = tokio_serial::new(&config.port, config.baud_rate)
        .timeout(config.timeout)
        .open()
        .map_err(|e| QuakeError::PortOpen {
            port: config.port.clone(),
            reason: e.to_string(),
        })?;

    log::info!("Serial port opened successfully");
    Ok(port)
}

/// A serial port visible on this machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSummary {
    pub name: String,
    pub description: String,
    pub manufacturer: Option<String>,
}

pub fn list_ports() -> Result<Vec<PortSummary>> {
    let ports =
        tokio_serial::available_ports().map_err(|e| QuakeError::PortEnumeration(e.to_string()))?;

    Ok(ports
        .into_iter()
        .map(|info| {
            let (description, manufacturer) = match info.port_type {
                SerialPortType::UsbPort(usb) => (
                    usb.product
                        .unwrap_or_else(|| format!("USB {:04x}:{:04x}", usb.vid, usb.pid)),
                    usb.manufacturer,
                ),
                SerialPortType::PciPort => ("PCI serial port".to_string(), None),
                SerialPortType::BluetoothPort => ("Bluetooth serial port".to_string(), None),
                SerialPortType::Unknown => ("Serial port".to_string(), None),
            };
            PortSummary {
                name: info.port_name,
                description,
                manufacturer,
            }
        })
        .collect())
}
