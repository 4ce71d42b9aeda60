//! Pit visit timing

use crate::telemetry::PaddockZone;

/// Times a vehicle's pit lane visits from the scoring feed.
///
/// `elapsed` is total time spent in the pit lane for the current (or most
/// recent) visit, `stopped` the portion of it spent standing still. Both
/// hold their final values after pit exit so the last stop stays readable.
/// `pitting` covers the whole in-and-out lap, not just the lane itself.
#[derive(Debug, Clone)]
pub struct PitTimer {
    pub elapsed: f64,
    pub stopped: f64,
    pub pitting: bool,
    /// Lap number of the most recent pit stop.
    pub lap_stopped: i32,
    slot_id: i32,
    pit_in_time: f64,
    pit_stop_time: f64,
    last_zone: PaddockZone,
    last_pit_lap: i32,
}

impl Default for PitTimer {
    fn default() -> Self {
        Self {
            elapsed: 0.0,
            stopped: 0.0,
            pitting: false,
            lap_stopped: 0,
            slot_id: -1,
            pit_in_time: 0.0,
            pit_stop_time: 0.0,
            last_zone: PaddockZone::OnTrack,
            last_pit_lap: 99999,
        }
    }
}

impl PitTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        slot_id: i32,
        zone: PaddockZone,
        elapsed_time: f64,
        laps_done: i32,
        speed: f64,
    ) {
        // Slot reassigned to a different vehicle.
        if self.slot_id != slot_id {
            self.slot_id = slot_id;
            self.elapsed = 0.0;
            self.stopped = 0.0;
            self.pitting = false;
            self.pit_in_time = elapsed_time;
            self.pit_stop_time = elapsed_time;
            self.last_zone = PaddockZone::OnTrack;
            self.last_pit_lap = laps_done;
        }
        // Session rewind.
        if self.last_pit_lap > laps_done {
            self.last_pit_lap = laps_done;
        }
        if self.last_zone != zone {
            self.last_zone = zone;
            self.pit_in_time = elapsed_time;
            self.pit_stop_time = elapsed_time;
            if zone.in_pit_area() {
                self.elapsed = 0.0;
                self.stopped = 0.0;
            }
        }
        if zone.in_pit_area() {
            if zone == PaddockZone::Garage {
                self.elapsed = 0.0;
                self.stopped = 0.0;
                self.last_pit_lap = laps_done;
            } else {
                self.elapsed += elapsed_time - self.pit_in_time;
                if speed < 0.1 {
                    self.stopped += elapsed_time - self.pit_stop_time;
                }
            }
            self.pit_in_time = elapsed_time;
            self.pit_stop_time = elapsed_time;
            // The pit state can desync from scoring for a moment; only a
            // stop of real length marks the lap as a pit lap.
            if self.elapsed > 2.0 && self.stopped > 1.0 {
                self.last_pit_lap = laps_done;
            }
        }
        self.pitting = zone.in_pit_area() || laps_done == self.last_pit_lap;
        self.lap_stopped = self.last_pit_lap;
    }
}
