//! Suspension travel envelope and static ride position
//!
//! Tracks the smallest and largest suspension deflection seen per wheel,
//! smoothed through a clamped EMA so kerb strikes and single-tick spikes do
//! not poison the envelope, plus the at-rest deflection captured whenever
//! the car sits still on its own weight.
//!
//! The reset flag is the in-pit-lane flag: while engaged the envelope
//! pauses entirely (cars get jacked up during stops), and each transition
//! restarts the envelope.

use crate::calc;
use crate::config::WheelsConfig;
use crate::output::WheelsOutput;
use crate::telemetry::{PaddockZone, PlayerTelemetry};

use super::ResetEdge;

/// Settle window after offroad excursions and contact, seconds.
const SETTLE_SECONDS: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct SuspensionTravelEstimator {
    reset_edge: ResetEdge,
    enable_offroad: bool,
    wheel_liftoff: f64,
    margin: f64,
    factor: f64,
    last_offroad_time: f64,
    /// Pause sentinel: the envelope never advances on a frozen clock.
    last_elapsed: f64,
    min_position: [f64; 4],
    max_position: [f64; 4],
    min_ema: [f64; 4],
    max_ema: [f64; 4],
}

impl SuspensionTravelEstimator {
    pub fn new(config: &WheelsConfig) -> Self {
        Self {
            reset_edge: ResetEdge::new(),
            enable_offroad: config.enable_suspension_measurement_while_offroad,
            wheel_liftoff: config.wheel_lift_off_threshold,
            margin: config.average_suspension_position_margin,
            factor: calc::ema_factor(config.average_suspension_position_samples, 3),
            last_offroad_time: 0.0,
            last_elapsed: -1.0,
            min_position: [f64::INFINITY; 4],
            max_position: [f64::NEG_INFINITY; 4],
            min_ema: [0.0; 4],
            max_ema: [0.0; 4],
        }
    }

    pub fn step(
        &mut self,
        reset: bool,
        elapsed: f64,
        player: &PlayerTelemetry,
        output: &mut WheelsOutput,
    ) {
        if self.reset_edge.changed(reset) {
            self.min_position = [f64::INFINITY; 4];
            self.max_position = [f64::NEG_INFINITY; 4];
            self.min_ema = [0.0; 4];
            self.max_ema = [0.0; 4];
        }

        let positions = player.suspension_deflection;
        output.suspension_position = positions;

        // Static capture: at rest on its own weight. Pit lane is excluded
        // (the car may be on jacks) but the garage stall is fine.
        if player.gear == 0
            && player.paddock_zone() != PaddockZone::PitLane
            && (self.enable_offroad || !player.any_wheel_offroad())
            && player.throttle_raw < 0.01
            && player.speed < 0.01
        {
            output.suspension_position_static = positions;
        }

        if self.reset_edge.engaged() {
            return;
        }

        if elapsed == self.last_elapsed {
            return;
        }
        self.last_elapsed = elapsed;

        if !self.enable_offroad && player.any_wheel_offroad() {
            self.last_offroad_time = elapsed;
        }
        if self.last_offroad_time > elapsed {
            // Session rewind.
            self.last_offroad_time = elapsed;
        }
        if elapsed - self.last_offroad_time < SETTLE_SECONDS
            || elapsed - player.impact_time < SETTLE_SECONDS
        {
            return;
        }

        for wheel in 0..4 {
            // An unloaded wheel reads full droop; that is not travel.
            if player.tyre_deflection[wheel] < self.wheel_liftoff {
                continue;
            }
            let position = positions[wheel];

            if self.min_ema[wheel] == 0.0 {
                self.min_ema[wheel] = position;
            }
            self.min_ema[wheel] = calc::exp_moving_avg(self.factor, self.min_ema[wheel], position)
                .max(self.min_ema[wheel] - self.margin);
            if self.min_position[wheel] > self.min_ema[wheel] {
                self.min_position[wheel] = self.min_ema[wheel];
            }

            if self.max_ema[wheel] == 0.0 {
                self.max_ema[wheel] = position;
            }
            self.max_ema[wheel] = calc::exp_moving_avg(self.factor, self.max_ema[wheel], position)
                .min(self.max_ema[wheel] + self.margin);
            if self.max_position[wheel] < self.max_ema[wheel] {
                self.max_position[wheel] = self.max_ema[wheel];
            }

            output.suspension_position_min[wheel] = self.min_position[wheel];
            output.suspension_position_max[wheel] = self.max_position[wheel];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settled_player(deflection: f64) -> PlayerTelemetry {
        PlayerTelemetry {
            suspension_deflection: [deflection; 4],
            tyre_deflection: [5.0; 4],
            speed: 40.0,
            gear: 4,
            throttle_raw: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_static_capture_requires_rest_outside_pit_lane() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        let mut player = settled_player(12.0);
        player.gear = 0;
        player.speed = 0.0;
        player.throttle_raw = 0.0;
        estimator.step(false, 10.0, &player, &mut output);
        assert_eq!(output.suspension_position_static, [12.0; 4]);

        // On pit-lane jacks: no capture.
        player.suspension_deflection = [2.0; 4];
        player.in_pits = true;
        estimator.step(true, 11.0, &player, &mut output);
        assert_eq!(output.suspension_position_static, [12.0; 4]);

        // Rolling in gear: no capture, but the raw position still updates.
        player.in_pits = false;
        player.gear = 3;
        player.speed = 20.0;
        estimator.step(false, 12.0, &player, &mut output);
        assert_eq!(output.suspension_position_static, [12.0; 4]);
        assert_eq!(output.suspension_position, [2.0; 4]);
    }

    #[test]
    fn test_envelope_tracks_min_and_max() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        let mut elapsed = 10.0;
        for deflection in [12.0, 11.0, 10.0, 13.0, 14.0, 15.0] {
            estimator.step(false, elapsed, &settled_player(deflection), &mut output);
            elapsed += 0.1;
        }
        assert!(output.suspension_position_min[0] < 12.0);
        assert!(output.suspension_position_max[0] > 12.0);
        assert!(output.suspension_position_min[0] <= output.suspension_position_max[0]);
    }

    #[test]
    fn test_margin_clamps_spikes() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(false, 10.0, &settled_player(10.0), &mut output);
        let max_before = output.suspension_position_max[0];
        // Kerb strike: a 90 mm spike may move the max EMA by at most the
        // configured margin in one tick.
        estimator.step(false, 10.1, &settled_player(100.0), &mut output);
        assert!(
            output.suspension_position_max[0] - max_before
                <= config.average_suspension_position_margin + 1e-9
        );
    }

    #[test]
    fn test_lifted_wheel_skips_envelope() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        let mut player = settled_player(12.0);
        player.tyre_deflection[1] = 0.2;
        estimator.step(false, 10.0, &player, &mut output);
        assert!(output.suspension_position_min[0].is_finite());
        // Untouched output slot for the airborne wheel.
        assert_eq!(output.suspension_position_min[1], 0.0);
    }

    #[test]
    fn test_offroad_and_impact_settle_window() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        let mut player = settled_player(12.0);
        player.wheels_offroad = 2;
        estimator.step(false, 10.0, &player, &mut output);
        assert_eq!(output.suspension_position_min[0], 0.0);

        // Back on track but still inside the settle window.
        player.wheels_offroad = 0;
        estimator.step(false, 11.0, &player, &mut output);
        assert_eq!(output.suspension_position_min[0], 0.0);

        // Window expired.
        estimator.step(false, 13.5, &player, &mut output);
        assert!(output.suspension_position_min[0] > 0.0);
    }

    #[test]
    fn test_envelope_pauses_while_flag_engaged() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(true, 10.0, &settled_player(12.0), &mut output);
        estimator.step(true, 10.1, &settled_player(30.0), &mut output);
        assert_eq!(output.suspension_position_min[0], 0.0);
        assert_eq!(output.suspension_position, [30.0; 4]);
    }

    #[test]
    fn test_frozen_clock_is_idempotent() {
        let config = WheelsConfig::default();
        let mut estimator = SuspensionTravelEstimator::new(&config);
        let mut output = WheelsOutput::default();

        estimator.step(false, 10.0, &settled_player(12.0), &mut output);
        estimator.step(false, 10.1, &settled_player(11.0), &mut output);
        let first = output.clone();
        // Same tick replayed: nothing moves.
        estimator.step(false, 10.1, &settled_player(11.0), &mut output);
        assert_eq!(output, first);
    }
}
