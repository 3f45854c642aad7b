// Diagnostic reporting for byte-source failures
//
// A flaky link can fail thousands of reads per second, so the decoder never
// logs failures itself. It hands each one to a `FailureReporter`, and the
// default reporter only speaks up on every Nth occurrence.

use std::io;

/// Number of I/O failures between two emitted diagnostics.
pub const DEFAULT_REPORT_EVERY: u64 = 100;

/// Receives every I/O failure observed by the decoder.
pub trait FailureReporter {
    fn io_failure(&mut self, error: &io::Error);
}

/// Logs one warning per `every` failures.
#[derive(Debug, Clone)]
pub struct RateLimitedLogger {
    every: u64,
    seen: u64,
}

impl RateLimitedLogger {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
        }
    }

    /// Total failures seen, emitted or not.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Count one failure; true when this one should be surfaced.
    fn should_emit(&mut self) -> bool {
        self.seen += 1;
        self.seen.is_multiple_of(self.every)
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_EVERY)
    }
}

impl FailureReporter for RateLimitedLogger {
    fn io_failure(&mut self, error: &io::Error) {
        if self.should_emit() {
            log::warn!("Serial read error: {} ({} I/O failures so far)", error, self.seen);
        }
    }
}
