//! Recent lap time history and lap-to-lap deltas

use serde::{Deserialize, Serialize};

use crate::output::MAX_SECONDS;

/// Rolling record of a vehicle's five most recent lap times.
///
/// A lap only enters the record once the vehicle is more than two seconds
/// into the next lap, because last-lap-time readings are unreliable right
/// at the line. Invalid laps occupy a slot as `0.0` and are treated as
/// missing by [`best`](Self::best) and [`delta`](Self::delta).
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapTimeHistory {
    /// Five most recent lap times, oldest first. Zero marks an invalid lap.
    pub recent: [f64; 5],
    /// Best of [`recent`](Self::recent), or [`MAX_SECONDS`] when empty.
    pub best_recent: f64,
    /// Lap start time of the lap currently being driven.
    pub last_lap_start: f64,
}

impl LapTimeHistory {
    pub fn update(&mut self, lap_start: f64, lap_elapsed: f64, last_lap_time: f64) {
        if self.last_lap_start == lap_start || lap_elapsed - lap_start <= 2.0 {
            return;
        }
        if self.last_lap_start < lap_start {
            self.recent.rotate_left(1);
            self.recent[4] = if last_lap_time > 0.0 { last_lap_time } else { 0.0 };
        } else {
            // Lap start moved backwards: session change, history is stale.
            self.recent = [0.0; 5];
        }
        self.last_lap_start = lap_start;
        self.best_recent = self
            .recent
            .iter()
            .map(|&laptime| if laptime > 0.0 { laptime } else { MAX_SECONDS })
            .fold(MAX_SECONDS, f64::min);
    }

    /// Best valid recent lap time, or [`MAX_SECONDS`] when none recorded.
    pub fn best(&self) -> f64 {
        self.best_recent
    }

    /// Lap-for-lap gaps `target - self` over the newest `max_count` slots
    /// (at most five), oldest first. Slots where either side is invalid
    /// yield [`MAX_SECONDS`].
    pub fn delta(&self, target: &LapTimeHistory, max_count: usize) -> Vec<f64> {
        (5usize.saturating_sub(max_count)..5)
            .map(|index| {
                if self.recent[index] > 0.0 && target.recent[index] > 0.0 {
                    target.recent[index] - self.recent[index]
                } else {
                    MAX_SECONDS
                }
            })
            .collect()
    }
}
