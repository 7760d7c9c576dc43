//! Timing utilities

use std::time::{Duration, Instant};

/// A simple timer for measuring elapsed time.
pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    /// Creates and starts a new timer.
    pub fn new(name: &str) -> Self {
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    /// Returns the elapsed time.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Returns the elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    /// Logs the elapsed time.
    pub fn stop(&self) {
        log::info!("{}: {:.3}s", self.name, self.elapsed_secs());
    }
}
