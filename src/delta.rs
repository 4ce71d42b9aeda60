//! Sparse distance-indexed sample history for one lap
//!
//! A [`DeltaTrack`] records `N` accumulating channels against lap distance:
//! a growable live array for the lap in progress and a frozen reference copy
//! of the last clean lap. Lookups interpolate the reference at an arbitrary
//! distance, which is what turns "wear so far this lap" into "wear compared
//! to the same point of the reference lap".
//!
//! Positions come from the simulator's lap-distance channel, which desyncs
//! briefly around the start/finish line; [`DeltaTrack::correct_position`]
//! applies the guards every caller needs.

use crate::calc;

/// Distance-indexed delta history over `N` channels.
#[derive(Debug, Clone)]
pub struct DeltaTrack<const N: usize> {
    /// Lap in progress; always starts with the all-zero seed sample.
    live: Vec<(f64, [f64; N])>,
    /// Last frozen clean lap.
    reference: Vec<(f64, [f64; N])>,
    /// Minimum spacing between recorded samples, meters.
    min_delta_distance: f64,
    /// Whether the current lap records at all; decided at the lap boundary.
    recording: bool,
    /// Reference holds more than the seed sample.
    has_reference: bool,
    /// Recording cursor: distance of the last accepted sample.
    last_position: f64,
}

const SEED: f64 = 0.0;

impl<const N: usize> DeltaTrack<N> {
    pub fn new(min_delta_distance: f64) -> Self {
        Self {
            live: vec![(SEED, [0.0; N])],
            reference: vec![(SEED, [0.0; N])],
            min_delta_distance,
            recording: false,
            has_reference: false,
            last_position: 0.0,
        }
    }

    /// Drop both arrays back to the seed state. The recording flag and
    /// cursor deliberately survive; the next lap boundary refreshes them.
    pub fn reset(&mut self) {
        self.live.truncate(1);
        self.live[0] = (SEED, [0.0; N]);
        self.reference.truncate(1);
        self.reference[0] = (SEED, [0.0; N]);
        self.has_reference = false;
    }

    /// Promote the live array to the reference. Returns false (and keeps the
    /// old reference) when the live array holds nothing beyond the seed.
    pub fn freeze(&mut self) -> bool {
        if self.live.len() > 1 {
            self.reference.clone_from(&self.live);
            self.has_reference = true;
            true
        } else {
            false
        }
    }

    /// Start a new lap: clear the live array, decide whether this lap
    /// records (only when the boundary was caught within the first second of
    /// lap time), and snap the cursor to the current position.
    pub fn begin_lap(&mut self, lap_time_now: f64, position: f64) {
        self.live.truncate(1);
        self.live[0] = (SEED, [0.0; N]);
        self.recording = lap_time_now < 1.0;
        self.has_reference = self.reference.len() > 1;
        self.last_position = position;
    }

    /// Guard the raw lap-distance channel and advance the cursor.
    ///
    /// Returns the corrected position to use for this tick.
    pub fn correct_position(&mut self, lap_time: f64, position: f64) -> f64 {
        if 0.0 < lap_time && lap_time < 1.0 && position > 300.0 {
            // Stale distance right after the line cross.
            self.last_position = 0.0;
            0.0
        } else {
            if self.last_position > position {
                self.last_position = position;
            }
            position
        }
    }

    /// Append `(position, values)` when this lap records and the spacing
    /// threshold is met.
    pub fn record(&mut self, position: f64, values: [f64; N]) {
        if self.recording && position - self.last_position >= self.min_delta_distance {
            self.live.push((position, values));
            self.last_position = position;
        }
    }

    pub fn has_reference(&self) -> bool {
        self.has_reference
    }

    /// Interpolate the reference at `position`.
    ///
    /// Queries at or before the first reference distance yield zeros;
    /// queries beyond the last sample extrapolate the final segment.
    pub fn lookup(&self, position: f64) -> [f64; N] {
        match self.bracket(position) {
            Some((low, high)) => {
                let mut values = [0.0; N];
                for (column, value) in values.iter_mut().enumerate() {
                    *value = calc::linear_interp(
                        position,
                        low.0,
                        low.1[column],
                        high.0,
                        high.1[column],
                    );
                }
                values
            }
            None => [0.0; N],
        }
    }

    /// Reference values for delta computation, or `None` while deltas are
    /// meaningless: no reference lap yet, within 0.3 s of the lap start, or
    /// the query falls before the first reference sample.
    pub fn delta_reference(&self, position: f64, lap_time: f64) -> Option<[f64; N]> {
        if !self.has_reference || lap_time <= 0.3 {
            return None;
        }
        self.bracket(position)?;
        Some(self.lookup(position))
    }

    /// Bracketing reference samples around `position`, or `None` at bracket
    /// index 0.
    fn bracket(&self, position: f64) -> Option<(&(f64, [f64; N]), &(f64, [f64; N]))> {
        let index = self
            .reference
            .partition_point(|sample| sample.0 < position)
            .min(self.reference.len() - 1);
        if index == 0 {
            return None;
        }
        Some((&self.reference[index - 1], &self.reference[index]))
    }
}
