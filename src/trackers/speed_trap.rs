//! Speed trap readings

use crate::calc;

/// Latches a vehicle's speed at a fixed trap position on the lap.
///
/// Arms while the vehicle approaches the trap, then interpolates the speed
/// at the exact trap distance from the samples either side of the crossing.
/// Repeated lap-distance samples are ignored, so a stalled feed cannot
/// re-trigger a reading.
#[derive(Default, Debug, Clone)]
pub struct SpeedTrap {
    record_next: bool,
    speed_before: f64,
    last_distance: f64,
    distance_before: f64,
    /// Latest trap reading, meters per second.
    pub speed: f64,
}

impl SpeedTrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, speed: f64, lap_distance: f64, trap_position: f64, track_length: f64) {
        if self.last_distance == lap_distance {
            return;
        }
        self.last_distance = lap_distance;

        // Signed distance from the trap, wrapped to the nearer half lap.
        let offset =
            calc::circular_relative_distance(track_length, trap_position, lap_distance);

        if self.record_next {
            if offset < 0.0 {
                self.distance_before = offset;
                self.speed_before = speed;
            } else {
                // A teleport (pit recall, session skip) lands far past the
                // trap; only a plausible crossing produces a reading.
                if offset - self.distance_before < 200.0 {
                    self.speed = calc::linear_interp(
                        0.0,
                        self.distance_before,
                        self.speed_before,
                        offset,
                        speed,
                    );
                }
                self.record_next = false;
            }
        } else if offset < 0.0 {
            self.record_next = true;
        }
    }
}
