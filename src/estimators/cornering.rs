//! Cornering radius from the driven arc
//!
//! Fits a circle through three world positions sampled along the car's
//! path and publishes the radius. The sample ring only advances while the
//! car actually moves, so a paused or frozen feed changes nothing, and a
//! degenerate (straight-line) fit holds the previous radius instead of
//! exploding toward infinity.

use std::collections::VecDeque;

use crate::calc;
use crate::config::WheelsConfig;
use crate::output::WheelsOutput;
use crate::telemetry::PlayerTelemetry;

#[derive(Debug, Clone)]
pub struct CorneringRadiusEstimator {
    last_position: (f64, f64),
    half_window: usize,
    ring: VecDeque<(f64, f64)>,
}

impl CorneringRadiusEstimator {
    pub fn new(config: &WheelsConfig) -> Self {
        let half_window = (config.cornering_radius_sampling_interval as usize).clamp(5, 100);
        Self {
            last_position: (0.0, 0.0),
            half_window,
            ring: VecDeque::from(vec![(0.0, 0.0); half_window * 2]),
        }
    }

    pub fn step(&mut self, player: &PlayerTelemetry, output: &mut WheelsOutput) {
        let position = (player.position_longitudinal, player.position_lateral);
        if position == self.last_position {
            return;
        }
        self.last_position = position;
        self.ring.pop_front();
        self.ring.push_back(position);

        let first = self.ring[0];
        let middle = self.ring[self.half_window];
        let last = self.ring[self.ring.len() - 1];
        if let Some(center) = calc::circle_center(first, middle, last) {
            output.cornering_radius = calc::planar_distance(first, center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_at(longitudinal: f64, lateral: f64) -> PlayerTelemetry {
        PlayerTelemetry {
            position_longitudinal: longitudinal,
            position_lateral: lateral,
            ..Default::default()
        }
    }

    #[test]
    fn test_radius_on_circular_path() {
        let config = WheelsConfig::default();
        let mut estimator = CorneringRadiusEstimator::new(&config);
        let mut output = WheelsOutput::default();

        // 50 m circle around the origin; enough points to flush the seed.
        for i in 1..=60 {
            let angle = i as f64 * 0.02;
            estimator.step(
                &player_at(50.0 * angle.cos(), 50.0 * angle.sin()),
                &mut output,
            );
        }
        assert!((output.cornering_radius - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_straight_line_holds_previous_radius() {
        let config = WheelsConfig::default();
        let mut estimator = CorneringRadiusEstimator::new(&config);
        let mut output = WheelsOutput::default();
        output.cornering_radius = 75.0;

        // Colinear with the (0, 0) seed points: every fit is degenerate.
        for i in 1..=50 {
            let t = i as f64;
            estimator.step(&player_at(t, 2.0 * t), &mut output);
        }
        assert_eq!(output.cornering_radius, 75.0);
    }

    #[test]
    fn test_stationary_car_changes_nothing() {
        let config = WheelsConfig::default();
        let mut estimator = CorneringRadiusEstimator::new(&config);
        let mut output = WheelsOutput::default();

        for i in 1..=60 {
            let angle = i as f64 * 0.02;
            estimator.step(
                &player_at(50.0 * angle.cos(), 50.0 * angle.sin()),
                &mut output,
            );
        }
        let settled = output.cornering_radius;

        // Same sample repeated: the ring must not advance.
        for _ in 0..10 {
            estimator.step(&player_at(50.0 * 1.2f64.cos(), 50.0 * 1.2f64.sin()), &mut output);
        }
        assert_eq!(output.cornering_radius, settled);
    }
}
