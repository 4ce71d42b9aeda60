//! Wheel rotation analysis: differential locking, radius calibration, slip
//!
//! The effective rolling radius is never exposed by the simulator, so it is
//! calibrated online: whenever the car rolls straight and clean (strong
//! forward axle rotation, tiny left/right bias), the ratio of ground speed
//! to axle rotation feeds an EMA per axle. Slip ratios then fall out of the
//! calibrated radius. Calibration is keyed to the vehicle name and survives
//! garage resets for the same car.

use crate::calc;
use crate::config::WheelsConfig;
use crate::output::WheelsOutput;
use crate::telemetry::PlayerTelemetry;

use super::ResetEdge;

#[derive(Debug, Clone)]
pub struct WheelRotationEstimator {
    reset_edge: ResetEdge,
    min_axle_rotation: f64,
    max_bias_front: f64,
    max_bias_rear: f64,
    /// Vehicle the radius calibration belongs to.
    vehicle_name: String,
    radius_front_ema: f64,
    radius_rear_ema: f64,
    /// Pause sentinel: frozen acceleration means frozen physics.
    last_accel_max: f64,
    locking_front: f64,
    locking_rear: f64,
}

impl WheelRotationEstimator {
    pub fn new(config: &WheelsConfig) -> Self {
        Self {
            reset_edge: ResetEdge::new(),
            min_axle_rotation: config.minimum_axle_rotation,
            max_bias_front: config.maximum_rotation_difference_front,
            max_bias_rear: config.maximum_rotation_difference_rear,
            vehicle_name: String::new(),
            radius_front_ema: 0.0,
            radius_rear_ema: 0.0,
            last_accel_max: 0.0,
            locking_front: 1.0,
            locking_rear: 1.0,
        }
    }

    pub fn step(&mut self, reset: bool, player: &PlayerTelemetry, output: &mut WheelsOutput) {
        if self.reset_edge.changed(reset) {
            self.last_accel_max = 0.0;
            self.locking_front = 1.0;
            self.locking_rear = 1.0;
            // Radius calibration only restarts with a different car.
            if self.vehicle_name != player.vehicle_name {
                self.vehicle_name.clone_from(&player.vehicle_name);
                self.radius_front_ema = 0.0;
                self.radius_rear_ema = 0.0;
            }
        }

        let rotation = player.wheel_rotation;
        let speed = player.speed;
        let accel_max = player.accel_lateral.abs().max(player.accel_longitudinal.abs());

        let axle_front = calc::axle_rotation(rotation[0], rotation[1]);
        let axle_rear = calc::axle_rotation(rotation[2], rotation[3]);
        let bias_front = calc::rotation_bias(axle_front, rotation[0], rotation[1]);
        let bias_rear = calc::rotation_bias(axle_rear, rotation[2], rotation[3]);

        // Locking only means something with real forward rotation; the
        // value holds outside that window.
        if axle_front < -self.min_axle_rotation {
            self.locking_front =
                calc::locking_percent(axle_front, rotation[0].min(rotation[1]));
        }
        if axle_rear < -self.min_axle_rotation {
            self.locking_rear = calc::locking_percent(axle_rear, rotation[2].min(rotation[3]));
        }

        // Identical acceleration to the previous tick means the simulator
        // is paused; calibration holds.
        if self.last_accel_max != accel_max {
            self.last_accel_max = accel_max;
            // Adapt faster under load, where the tyre is actually deformed.
            let factor = 2.0 / (40.0 * accel_max).max(20.0);
            if axle_front < -self.min_axle_rotation
                && bias_front > 0.0
                && bias_front < self.max_bias_front
            {
                self.radius_front_ema = calc::exp_moving_avg(
                    factor,
                    self.radius_front_ema,
                    calc::rotation_to_radius(speed, axle_front),
                );
            }
            if axle_rear < -self.min_axle_rotation
                && bias_rear > 0.0
                && bias_rear < self.max_bias_rear
            {
                self.radius_rear_ema = calc::exp_moving_avg(
                    factor,
                    self.radius_rear_ema,
                    calc::rotation_to_radius(speed, axle_rear),
                );
            }
        }

        output.locking_percent_front = self.locking_front;
        output.locking_percent_rear = self.locking_rear;
        output.slip_ratio[0] = calc::slip_ratio(rotation[0], self.radius_front_ema, speed);
        output.slip_ratio[1] = calc::slip_ratio(rotation[1], self.radius_front_ema, speed);
        output.slip_ratio[2] = calc::slip_ratio(rotation[2], self.radius_rear_ema, speed);
        output.slip_ratio[3] = calc::slip_ratio(rotation[3], self.radius_rear_ema, speed);
    }
}
