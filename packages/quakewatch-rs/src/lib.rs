//! Decoder and rolling statistics for the ES-Net seismic sensor serial stream.
//!
//! The device emits two tagged, fixed-size little-endian frames: `'S'`
//! acceleration samples and `'I'` intensity summaries. [`FrameDecoder`] turns a
//! byte stream into [`Frame`]s; [`Session`] routes them into a
//! [`StreamAggregator`] (bounded display windows) and a [`StatisticsTracker`]
//! (packet counters, rates and device-clock span).

pub mod aggregator;
pub mod buffer;
pub mod decoder;
pub mod error;
pub mod report;
pub mod session;
pub mod source;
pub mod stats;
pub mod types;

pub use aggregator::{AggregatorConfig, StreamAggregator, WindowSnapshot};
pub use buffer::BoundedSeries;
pub use decoder::FrameDecoder;
pub use error::{QuakeError, Result};
pub use report::{FailureReporter, RateLimitedLogger};
pub use session::{Session, SessionConfig};
pub use source::{list_ports, open_serial, PortSummary, SerialConfig};
pub use stats::{StatisticsTracker, StatsSnapshot};
pub use types::*;
