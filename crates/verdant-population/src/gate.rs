//! Spawn gating by time of day.
//!
//! Time of day is normalized to `[0.0, 1.0)`: 0.0 is midnight, 0.25 dawn,
//! 0.5 noon, 0.75 dusk.

use serde::{Deserialize, Serialize};

/// Predicate deciding whether a spawn pass may run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum SpawnGate {
    /// Spawning is always allowed.
    #[default]
    Always,
    /// Spawning is allowed inside `[start, end]`. When `start > end` the
    /// window wraps past midnight.
    TimeWindow {
        /// Window start, normalized time of day.
        start: f64,
        /// Window end, normalized time of day.
        end: f64,
    },
}

impl SpawnGate {
    /// Dusk to dawn.
    pub const NIGHT: Self = Self::TimeWindow {
        start: 0.75,
        end: 0.25,
    };

    /// Whether the gate is open at `time_of_day`.
    ///
    /// Without a clock (`None`) every gate is open.
    pub fn is_open(&self, time_of_day: Option<f64>) -> bool {
        match (*self, time_of_day) {
            (Self::Always, _) | (_, None) => true,
            (Self::TimeWindow { start, end }, Some(t)) => {
                if start > end {
                    t >= start || t <= end
                } else {
                    t >= start && t <= end
                }
            }
        }
    }
}

/// In-game clock driving time-of-day gates.
#[derive(Clone, Debug)]
pub struct DayClock {
    /// Current time of day, normalized `[0.0, 1.0)`.
    pub time_of_day: f64,
    /// Duration of one full day in seconds.
    pub day_length_seconds: f64,
}

impl DayClock {
    /// Create a clock starting at `time_of_day`.
    pub fn new(day_length_seconds: f64, time_of_day: f64) -> Self {
        Self {
            time_of_day: time_of_day.rem_euclid(1.0),
            day_length_seconds,
        }
    }

    /// Advance the clock by `dt` seconds. A non-positive day length freezes it.
    pub fn advance(&mut self, dt: f64) {
        if self.day_length_seconds <= 0.0 {
            return;
        }
        self.time_of_day = (self.time_of_day + dt / self.day_length_seconds).rem_euclid(1.0);
    }

    /// Whether `gate` is open right now.
    pub fn allows(&self, gate: &SpawnGate) -> bool {
        gate.is_open(Some(self.time_of_day))
    }
}
