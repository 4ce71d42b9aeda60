//! Tyre and brake wear estimation
//!
//! Both estimators share one skeleton: accumulate per-wheel wear over the
//! lap, record the accumulation against lap distance into a [`DeltaTrack`],
//! freeze clean laps as the reference, and project end-of-lap wear from the
//! live gap to the reference. They differ in input channel and units (tread
//! percent vs brake millimetres), in the fallback projection used before a
//! reference lap exists, and in the brake-only failure/calibration extras.

use tracing::{info, warn};

use crate::calc;
use crate::config::WheelsConfig;
use crate::delta::DeltaTrack;
use crate::output::WheelsOutput;
use crate::store::{Axle, ThresholdStore};
use crate::telemetry::PlayerTelemetry;

use super::ResetEdge;

const WHEEL_LABELS: [&str; 4] = ["Front left", "Front right", "Rear left", "Rear right"];

/// End-of-lap projection to use while no reference lap exists.
#[derive(Debug, Clone, Copy)]
pub(super) enum FallbackEstimate {
    /// Blend current and valid accumulation by lap progress.
    ProgressBlend(f64),
    /// Take whichever accumulation is larger.
    MaxOfLaps,
}

/// Lap-bound wear accumulation over `N` channels, shared by the tyre,
/// brake, and consumption estimators.
#[derive(Debug, Clone)]
pub(super) struct WearCore<const N: usize> {
    track: DeltaTrack<N>,
    last_lap_start: f64,
    last_reading: [f64; N],
    pub(super) current_lap: [f64; N],
    pub(super) valid_lap: [f64; N],
    /// Lap touched the pit lane at some point; such laps never become the
    /// reference.
    pit_lap: bool,
}

impl<const N: usize> WearCore<N> {
    pub(super) fn new(min_delta_distance: f64) -> Self {
        Self {
            track: DeltaTrack::new(min_delta_distance),
            last_lap_start: 0.0,
            last_reading: [0.0; N],
            current_lap: [0.0; N],
            valid_lap: [0.0; N],
            pit_lap: false,
        }
    }

    /// Zero accumulators and drop the reference. The pit-lap flag survives;
    /// it clears at the next lap boundary like any other lap.
    pub(super) fn reset(&mut self) {
        self.track.reset();
        self.last_lap_start = 0.0;
        self.last_reading = [0.0; N];
        self.current_lap = [0.0; N];
        self.valid_lap = [0.0; N];
    }

    /// Lap bookkeeping for one tick: pit-lap flag, lap boundary, position
    /// guards, and sample recording.
    ///
    /// Returns the finished lap's accumulation when a boundary fired, plus
    /// the guarded position for this tick's lookups.
    pub(super) fn advance(
        &mut self,
        lap_start_time: f64,
        lap_time: f64,
        raw_position: f64,
        in_pits: bool,
    ) -> (Option<[f64; N]>, f64) {
        self.pit_lap |= in_pits;

        let finished = if lap_start_time != self.last_lap_start {
            self.last_lap_start = lap_start_time;
            let finished = self.current_lap;
            // A clean lap with real samples becomes the new reference; until
            // one lands, every partial lap re-seeds the valid accumulation.
            if (!self.pit_lap && self.track.freeze()) || !self.track.has_reference() {
                self.valid_lap = finished;
            }
            self.current_lap = [0.0; N];
            self.track.begin_lap(lap_time, raw_position);
            self.pit_lap = false;
            Some(finished)
        } else {
            None
        };

        let position = self.track.correct_position(lap_time, raw_position);
        self.track.record(position, self.current_lap);
        (finished, position)
    }

    /// Fold this tick's readings into the lap accumulation.
    ///
    /// Wear is the drop since the previous reading; rises (tyre change,
    /// refuel) and anything that happens in the pit lane do not count.
    pub(super) fn accumulate(&mut self, readings: &[f64; N], in_pits: bool) {
        for (channel, &reading) in readings.iter().enumerate() {
            let difference =
                if in_pits { 0.0 } else { self.last_reading[channel] - reading };
            self.last_reading[channel] = reading;
            if difference > 0.0 {
                self.current_lap[channel] += difference;
            }
        }
    }

    /// Per-channel gap between this lap and the reference at equal
    /// distance; zeros while deltas are meaningless.
    pub(super) fn reference_deltas(&self, position: f64, lap_time: f64) -> [f64; N] {
        match self.track.delta_reference(position, lap_time) {
            Some(reference) => {
                let mut deltas = [0.0; N];
                for (channel, delta) in deltas.iter_mut().enumerate() {
                    *delta = self.current_lap[channel] - reference[channel];
                }
                deltas
            }
            None => [0.0; N],
        }
    }

    /// `(estimated, estimated_valid)` end-of-lap projection for one channel.
    pub(super) fn estimate(
        &self,
        channel: usize,
        delta: f64,
        fallback: FallbackEstimate,
    ) -> (f64, f64) {
        if self.track.has_reference() {
            let estimated = self.valid_lap[channel] + delta;
            let estimated_valid =
                if self.pit_lap { self.valid_lap[channel] } else { estimated };
            (estimated, estimated_valid)
        } else {
            let estimated = match fallback {
                FallbackEstimate::ProgressBlend(progress) => {
                    calc::wear_weighted(self.current_lap[channel], self.valid_lap[channel], progress)
                }
                FallbackEstimate::MaxOfLaps => {
                    self.current_lap[channel].max(self.valid_lap[channel])
                }
            };
            (estimated, estimated)
        }
    }

    pub(super) fn has_reference(&self) -> bool {
        self.track.has_reference()
    }

    #[cfg(test)]
    pub(super) fn pit_lap(&self) -> bool {
        self.pit_lap
    }
}

/// Tyre tread wear per wheel, in percent of a new tyre.
#[derive(Debug, Clone)]
pub struct TyreWearEstimator {
    reset_edge: ResetEdge,
    core: WearCore<4>,
}

impl TyreWearEstimator {
    pub fn new(config: &WheelsConfig) -> Self {
        Self { reset_edge: ResetEdge::new(), core: WearCore::new(config.minimum_delta_distance) }
    }

    pub fn step(&mut self, reset: bool, player: &PlayerTelemetry, output: &mut WheelsOutput) {
        if self.reset_edge.changed(reset) {
            self.core.reset();
            output.tread_wear_last_lap = [0.0; 4];
        }

        let readings = player.tyre_wear.map(|fraction| fraction * 100.0);
        let (finished, position) = self.core.advance(
            player.lap_start_time,
            player.lap_time_current,
            player.lap_distance,
            player.in_pits,
        );
        if let Some(finished) = finished {
            output.tread_wear_last_lap = finished;
        }

        self.core.accumulate(&readings, player.in_pits);
        let deltas = self.core.reference_deltas(position, player.lap_time_current);

        for wheel in 0..4 {
            let (estimated, estimated_valid) = self.core.estimate(
                wheel,
                deltas[wheel],
                FallbackEstimate::ProgressBlend(player.lap_progress),
            );
            output.tread_depth[wheel] = readings[wheel];
            output.tread_wear_current_lap[wheel] = self.core.current_lap[wheel];
            output.tread_wear_estimated[wheel] = estimated;
            output.tread_wear_estimated_valid[wheel] = estimated_valid;
        }
    }
}

/// Brake wear per wheel, in millimetres of disc thickness.
///
/// Beyond the shared skeleton this calibrates the maximum observed
/// thickness per wheel and captures failure thicknesses into the
/// [`ThresholdStore`] when a disc reading collapses to zero.
#[derive(Debug, Clone)]
pub struct BrakeWearEstimator<S> {
    reset_edge: ResetEdge,
    core: WearCore<4>,
    store: S,
    max_thickness: [f64; 4],
    /// Last positive reading per wheel; the value a disc "failed at" once
    /// the reading collapses.
    failure_record: [f64; 4],
}

impl<S: ThresholdStore> BrakeWearEstimator<S> {
    pub fn new(config: &WheelsConfig, store: S) -> Self {
        Self {
            reset_edge: ResetEdge::new(),
            core: WearCore::new(config.minimum_delta_distance),
            store,
            max_thickness: [0.0; 4],
            failure_record: [0.0; 4],
        }
    }

    pub fn step(&mut self, reset: bool, player: &PlayerTelemetry, output: &mut WheelsOutput) {
        if self.reset_edge.changed(reset) {
            self.core.reset();
            self.max_thickness = [0.0; 4];
            output.brake_wear_last_lap = [0.0; 4];
            output.brake_thickness_failure =
                self.store.load(&player.class_name, &player.vehicle_name);
        }

        // Simulator exposes no brake data; everything holds.
        if !player.has_brake_data() {
            return;
        }

        let readings = player.brake_thickness.map(|meters| meters * 1000.0);
        let (finished, position) = self.core.advance(
            player.lap_start_time,
            player.lap_time_current,
            player.lap_distance,
            player.in_pits,
        );
        if let Some(finished) = finished {
            output.brake_wear_last_lap = finished;
        }

        for wheel in 0..4 {
            self.note_failure(wheel, readings[wheel], player, output);
            if self.max_thickness[wheel] < readings[wheel] {
                self.max_thickness[wheel] = readings[wheel];
                output.brake_thickness_max[wheel] = readings[wheel];
            }
        }

        self.core.accumulate(&readings, player.in_pits);
        let deltas = self.core.reference_deltas(position, player.lap_time_current);

        for wheel in 0..4 {
            let (estimated, estimated_valid) =
                self.core.estimate(wheel, deltas[wheel], FallbackEstimate::MaxOfLaps);
            output.brake_thickness[wheel] = readings[wheel];
            output.brake_wear_current_lap[wheel] = self.core.current_lap[wheel];
            output.brake_wear_estimated[wheel] = estimated;
            output.brake_wear_estimated_valid[wheel] = estimated_valid;
        }
    }

    fn note_failure(
        &mut self,
        wheel: usize,
        thickness: f64,
        player: &PlayerTelemetry,
        output: &mut WheelsOutput,
    ) {
        if thickness > 0.0 {
            self.failure_record[wheel] = thickness;
        } else if self.failure_record[wheel] > 0.0 {
            info!(
                "{} brake failed at {:.2}(mm)",
                WHEEL_LABELS[wheel], self.failure_record[wheel]
            );
            let rounded = (self.failure_record[wheel] * 100.0).round() / 100.0;
            if let Err(error) = self.store.save(
                &player.class_name,
                &player.vehicle_name,
                Axle::of_wheel(wheel),
                rounded,
            ) {
                warn!("Failed to persist brake failure threshold: {error}");
            }
            output.brake_thickness_failure =
                self.store.load(&player.class_name, &player.vehicle_name);
            self.failure_record[wheel] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryThresholdStore;

    fn tyre_player(
        lap_start: f64,
        lap_time: f64,
        distance: f64,
        wear: f64,
    ) -> PlayerTelemetry {
        PlayerTelemetry {
            lap_start_time: lap_start,
            lap_time_current: lap_time,
            lap_distance: distance,
            lap_progress: distance / 1000.0,
            tyre_wear: [wear; 4],
            ..Default::default()
        }
    }

    #[test]
    fn test_accumulation_ignores_rises_and_plateaus() {
        let mut core = WearCore::<4>::new(5.0);
        for reading in [5.0, 4.8, 4.8, 4.5] {
            core.accumulate(&[reading; 4], false);
        }
        assert_eq!(core.current_lap, [0.5; 4]);
    }

    #[test]
    fn test_accumulation_suppressed_in_pits() {
        let mut core = WearCore::<4>::new(5.0);
        core.accumulate(&[5.0; 4], false);
        core.accumulate(&[4.8; 4], false);
        core.accumulate(&[4.8; 4], false);
        // The 4.8 -> 4.5 drop happens inside the pit lane (tyre service).
        core.accumulate(&[4.5; 4], true);
        assert_eq!(core.current_lap, [0.2; 4]);
        // Previous reading still advanced, so the drop is not double-counted.
        core.accumulate(&[4.5; 4], false);
        assert_eq!(core.current_lap, [0.2; 4]);
    }

    /// Drive a clean recorded lap so a reference exists, then check the
    /// projected wear on the following lap.
    #[test]
    fn test_reference_lap_drives_estimates() {
        let config = WheelsConfig::default();
        let mut estimator = TyreWearEstimator::new(&config);
        let mut output = WheelsOutput::default();

        // Lap boundary caught early: this lap records.
        estimator.step(false, &tyre_player(10.0, 0.5, 0.0, 1.0), &mut output);
        estimator.step(false, &tyre_player(10.0, 30.0, 500.0, 0.998), &mut output);
        estimator.step(false, &tyre_player(10.0, 60.0, 990.0, 0.996), &mut output);
        assert!((output.tread_wear_current_lap[0] - 0.4).abs() < 1e-9);

        // Next boundary freezes the lap as reference.
        estimator.step(false, &tyre_player(100.0, 0.2, 2.0, 0.996), &mut output);
        assert!((output.tread_wear_last_lap[0] - 0.4).abs() < 1e-9);
        assert!(estimator.core.has_reference());
        // Estimate equals the promoted valid lap right after the boundary.
        assert!((output.tread_wear_estimated[0] - 0.4).abs() < 1e-9);

        // Mid-lap: estimate = valid + (current - reference at distance).
        estimator.step(false, &tyre_player(100.0, 40.0, 750.0, 0.993), &mut output);
        let reference_at_750 = 250.0 * 0.2 / 490.0;
        let expected = 0.4 + (0.3 - reference_at_750);
        assert!((output.tread_wear_estimated[0] - expected).abs() < 1e-9);
        assert!((output.tread_wear_estimated_valid[0] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pit_lap_never_becomes_reference() {
        let config = WheelsConfig::default();
        let mut estimator = TyreWearEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(false, &tyre_player(10.0, 0.5, 0.0, 1.0), &mut output);
        let mut pit_tick = tyre_player(10.0, 30.0, 500.0, 0.998);
        pit_tick.in_pits = true;
        estimator.step(false, &pit_tick, &mut output);
        estimator.step(false, &tyre_player(10.0, 60.0, 990.0, 0.996), &mut output);
        assert!(estimator.core.pit_lap());

        estimator.step(false, &tyre_player(100.0, 0.2, 2.0, 0.996), &mut output);
        assert!(!estimator.core.has_reference());
        // Out-lap seed: valid accumulation still took the partial lap. The
        // pit tick suppressed one 0.2 drop, so only 0.2 accumulated.
        assert!((estimator.core.valid_lap[0] - 0.2).abs() < 1e-9);
        // Pit-lap flag cleared at the boundary.
        assert!(!estimator.core.pit_lap());
    }

    #[test]
    fn test_fallback_blend_before_reference() {
        let mut core = WearCore::<1>::new(5.0);
        core.current_lap = [0.3];
        core.valid_lap = [2.0];
        let (estimated, estimated_valid) =
            core.estimate(0, 0.0, FallbackEstimate::ProgressBlend(0.25));
        assert!((estimated - (0.3 * 0.25 + 2.0 * 0.75)).abs() < 1e-12);
        assert_eq!(estimated, estimated_valid);

        let (estimated, _) = core.estimate(0, 0.0, FallbackEstimate::MaxOfLaps);
        assert_eq!(estimated, 2.0);
    }

    #[test]
    fn test_reset_edge_fires_once() {
        let config = WheelsConfig::default();
        let mut estimator = TyreWearEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(false, &tyre_player(10.0, 0.5, 0.0, 1.0), &mut output);
        estimator.step(false, &tyre_player(10.0, 30.0, 500.0, 0.99), &mut output);
        assert!(output.tread_wear_current_lap[0] > 0.0);

        // Flag flips: state zeroed.
        estimator.step(true, &tyre_player(10.0, 31.0, 505.0, 0.99), &mut output);
        assert_eq!(output.tread_wear_current_lap[0], 0.0);

        // Flag held: wear resumes accumulating, no second zeroing.
        estimator.step(true, &tyre_player(10.0, 32.0, 510.0, 0.98), &mut output);
        assert!((output.tread_wear_current_lap[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_step_is_idempotent() {
        let config = WheelsConfig::default();
        let mut estimator = TyreWearEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(false, &tyre_player(10.0, 0.5, 0.0, 1.0), &mut output);
        estimator.step(false, &tyre_player(10.0, 30.0, 500.0, 0.998), &mut output);

        let tick = tyre_player(10.0, 45.0, 700.0, 0.997);
        estimator.step(false, &tick, &mut output);
        let first = output.clone();
        estimator.step(false, &tick, &mut output);
        assert_eq!(output, first);
    }

    #[test]
    fn test_brake_sentinel_skips_tick() {
        let config = WheelsConfig::default();
        let mut estimator = BrakeWearEstimator::new(&config, MemoryThresholdStore::new());
        let mut output = WheelsOutput::default();

        let mut player = tyre_player(10.0, 0.5, 0.0, 1.0);
        player.brake_thickness = [0.032, 0.032, -1.0, 0.028];
        estimator.step(false, &player, &mut output);
        assert_eq!(output.brake_thickness, [0.0; 4]);
        assert_eq!(output.brake_thickness_max, [0.0; 4]);
    }

    #[test]
    fn test_brake_scaling_and_max_calibration() {
        let config = WheelsConfig::default();
        let mut estimator = BrakeWearEstimator::new(&config, MemoryThresholdStore::new());
        let mut output = WheelsOutput::default();

        let mut player = tyre_player(10.0, 0.5, 0.0, 1.0);
        player.brake_thickness = [0.0319, 0.0319, 0.0279, 0.0279];
        estimator.step(false, &player, &mut output);
        assert!((output.brake_thickness[0] - 31.9).abs() < 1e-9);
        assert!((output.brake_thickness_max[0] - 31.9).abs() < 1e-9);

        // Readings can rise slightly as discs bed in; max follows.
        player.lap_time_current = 5.0;
        player.brake_thickness = [0.032, 0.032, 0.028, 0.028];
        estimator.step(false, &player, &mut output);
        assert!((output.brake_thickness_max[0] - 32.0).abs() < 1e-9);
        assert!((output.brake_thickness_max[2] - 28.0).abs() < 1e-9);
    }

    #[test]
    fn test_brake_failure_persists_threshold() {
        let config = WheelsConfig::default();
        let mut estimator = BrakeWearEstimator::new(&config, MemoryThresholdStore::new());
        let mut output = WheelsOutput::default();

        let mut player = tyre_player(10.0, 0.5, 0.0, 1.0);
        player.class_name = "GT3".into();
        player.vehicle_name = "Aster GT3 #7".into();
        player.brake_thickness = [0.010, 0.032, 0.028, 0.028];
        estimator.step(false, &player, &mut output);
        assert_eq!(output.brake_thickness_failure, [0.0; 4]);

        // Front-left disc lets go.
        player.lap_time_current = 5.0;
        player.brake_thickness[0] = 0.0;
        estimator.step(false, &player, &mut output);
        assert_eq!(output.brake_thickness_failure, [10.0, 10.0, 0.0, 0.0]);
        assert_eq!(estimator.failure_record[0], 0.0);

        // A later reset reloads the persisted thresholds.
        estimator.step(true, &player, &mut output);
        assert_eq!(output.brake_thickness_failure, [10.0, 10.0, 0.0, 0.0]);
    }
}
