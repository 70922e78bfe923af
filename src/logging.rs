//! Logging setup and helpers.
//!
//! Diagnostics go through the `log` facade with `env_logger` as the
//! backend. Initialization is idempotent so library tests and demos can
//! each call it without coordinating. [`LogThrottle`] rate-limits the
//! high-frequency recoverable outcomes of a radio link: an idle channel
//! raises RX timeouts continuously, and one line per window is plenty.

use log::{debug, error, info, log_enabled, warn, Level};
use std::sync::Once;
use std::time::Instant;

static INIT: Once = Once::new();

/// Initializes the logger with the `env_logger` crate.
///
/// Later calls are no-ops rather than panics, so any entry point can
/// call this unconditionally.
pub fn init_logger() {
    INIT.call_once(env_logger::init);
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}

/// Throttling structure for rate-limiting repetitive messages.
///
/// Allows `cap` messages per `window_ms` window; the count resets when
/// the window rolls over.
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window in milliseconds.
    window_ms: u64,
    /// Maximum messages allowed per window.
    cap: u32,
    /// Messages seen in the current window.
    count: u32,
    /// Start of the current window.
    t0: Instant,
}

impl LogThrottle {
    /// Creates a throttle allowing `cap` messages per `window_ms`.
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            t0: Instant::now(),
        }
    }

    /// Returns `true` if the message should be emitted, `false` if it
    /// should be dropped.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
        }

        self.count += 1;
        self.count <= self.cap
    }

    /// Starts a fresh window immediately.
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_caps_within_window() {
        let mut throttle = LogThrottle::new(1000, 3);

        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(throttle.allow());

        // 4th message in the same window is dropped
        assert!(!throttle.allow());
        assert!(!throttle.allow());
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = LogThrottle::new(1000, 2);

        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());

        throttle.reset();
        assert!(throttle.allow());
        assert!(throttle.allow());
        assert!(!throttle.allow());
    }

    #[test]
    fn test_throttle_window_rollover() {
        let mut throttle = LogThrottle::new(10, 1);

        assert!(throttle.allow());
        assert!(!throttle.allow());

        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!(throttle.allow());
    }
}
