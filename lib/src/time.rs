//! The simulation clock.

use serde::{Deserialize, Serialize};
use time::Duration;

/// Monotonic simulated time driving orbital animation.
///
/// Advanced once per render frame by the wall-clock frame delta scaled
/// by the time multiplier; a paused clock ignores `advance` entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimClock {
    elapsed: Duration,
    multiplier: f64,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            elapsed: Duration::ZERO,
            multiplier: 1.0,
            paused: false,
        }
    }
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, frame_dt: Duration) {
        if !self.paused {
            self.elapsed += Duration::seconds_f64(frame_dt.as_seconds_f64() * self.multiplier);
        }
    }

    /// Elapsed simulated time in days (the canonical unit for orbital
    /// periods).
    pub fn elapsed_days(&self) -> f64 {
        self.elapsed.as_seconds_f64() / 86_400.0
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = multiplier.max(0.0);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) {
        self.paused = !self.paused;
    }
}
