use clap::{Args, Parser, Subcommand};
use quakewatch_rs::report::DEFAULT_REPORT_EVERY;
use quakewatch_rs::session::{DEFAULT_FRAMES_PER_POLL, DEFAULT_IO_FAILURE_LIMIT};
use quakewatch_rs::source::DEFAULT_BAUD_RATE;
use quakewatch_rs::{AggregatorConfig, SessionConfig};

#[derive(Parser)]
#[command(
    name = "quakewatch",
    version,
    about = "ES-Net seismic sensor serial monitor",
    long_about = "Decode the ES-Net seismic sensor serial stream (acceleration samples and\n\
                  JMA intensity records) and report packet statistics.\n\
                  Set $QUAKEWATCH_PORT or use --port to pick the serial port."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Monitor a live sensor on a serial port
    Monitor(MonitorArgs),
    /// Decode a captured byte stream from a file
    Replay(ReplayArgs),
    /// List available serial ports
    Ports(PortsArgs),
}

#[derive(Args)]
pub struct MonitorArgs {
    /// Serial port path (auto-selected when exactly one port exists)
    #[arg(long, env = "QUAKEWATCH_PORT")]
    pub port: Option<String>,

    /// Baud rate
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,

    /// Per-read timeout in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Refresh interval in milliseconds
    #[arg(long, default_value_t = 50)]
    pub refresh_ms: u64,

    /// Maximum decode calls per refresh
    #[arg(long, default_value_t = DEFAULT_FRAMES_PER_POLL)]
    pub frames_per_refresh: usize,

    /// Consecutive I/O failures before the link is considered lost
    #[arg(long, default_value_t = DEFAULT_IO_FAILURE_LIMIT)]
    pub io_failure_limit: u64,

    /// Log one I/O failure diagnostic per this many failures
    #[arg(long, default_value_t = DEFAULT_REPORT_EVERY)]
    pub report_every: u64,

    /// Print final statistics as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Write the final display window as JSON to this file
    #[arg(long)]
    pub window_out: Option<String>,

    /// Suppress intensity lines and status messages
    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl MonitorArgs {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            windows: AggregatorConfig::default(),
            frames_per_poll: self.frames_per_refresh,
            io_failure_limit: self.io_failure_limit,
            report_every: self.report_every,
        }
    }
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Captured byte stream
    #[arg(long)]
    pub file: String,

    /// Print every decoded frame as a JSON line
    #[arg(long, default_value_t = false)]
    pub frames: bool,

    /// Print final statistics as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Statistics output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Write the final display window as JSON to this file
    #[arg(long)]
    pub window_out: Option<String>,
}

#[derive(Args)]
pub struct PortsArgs {
    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
