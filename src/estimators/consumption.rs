//! Fuel and energy consumption estimation
//!
//! Runs the wear skeleton over a single channel: the remaining amount of a
//! consumable. Fuel works in liters against the tank capacity; virtual
//! energy works in percent against a fixed capacity of 100. The engine only
//! steps the energy instance when the vehicle actually carries virtual
//! energy.

use crate::config::ConsumptionConfig;
use crate::output::ConsumptionOutput;
use crate::telemetry::PlayerTelemetry;

use super::ResetEdge;
use super::wear::{FallbackEstimate, WearCore};

/// Which consumable an estimator instance tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consumable {
    /// Liters remaining against tank capacity.
    Fuel,
    /// Virtual energy percent remaining against 100.
    Energy,
}

/// Per-lap consumption with reference-lap projection.
#[derive(Debug, Clone)]
pub struct ConsumptionEstimator {
    reset_edge: ResetEdge,
    core: WearCore<1>,
    consumable: Consumable,
    /// Amount when the stint started; re-anchored whenever the level rises.
    amount_stint_start: f64,
    last_amount: f64,
}

impl ConsumptionEstimator {
    pub fn new(config: &ConsumptionConfig, consumable: Consumable) -> Self {
        Self {
            reset_edge: ResetEdge::new(),
            core: WearCore::new(config.minimum_delta_distance),
            consumable,
            amount_stint_start: 0.0,
            last_amount: 0.0,
        }
    }

    pub fn step(&mut self, reset: bool, player: &PlayerTelemetry, output: &mut ConsumptionOutput) {
        let (capacity, amount) = match self.consumable {
            Consumable::Fuel => (player.fuel_capacity, player.fuel_remaining),
            Consumable::Energy => player.energy_percent(),
        };

        if self.reset_edge.changed(reset) {
            self.core.reset();
            self.amount_stint_start = amount;
            self.last_amount = amount;
            output.last_lap_consumption = 0.0;
        }

        // Refuel or car swap raises the level: new stint.
        if amount > self.last_amount {
            self.amount_stint_start = amount;
        }
        self.last_amount = amount;

        let (finished, position) = self.core.advance(
            player.lap_start_time,
            player.lap_time_current,
            player.lap_distance,
            player.in_pits,
        );
        if let Some([finished]) = finished {
            output.last_lap_consumption = finished;
        }

        self.core.accumulate(&[amount], player.in_pits);
        let [delta] = self.core.reference_deltas(position, player.lap_time_current);
        let (estimated, estimated_valid) =
            self.core.estimate(0, delta, FallbackEstimate::ProgressBlend(player.lap_progress));

        output.capacity = capacity;
        output.amount_current = amount;
        output.amount_stint_start = self.amount_stint_start;
        output.used_current_lap = self.core.current_lap[0];
        output.delta_consumption = delta;
        output.estimated_consumption = estimated;
        output.estimated_valid_consumption = estimated_valid;
    }
}

/// Liters of fuel per percent of energy, from the two full-lap projections.
///
/// 0 while either projection is missing; the ratio is meaningless then.
pub fn fuel_energy_ratio(fuel_estimated: f64, energy_estimated: f64) -> f64 {
    if fuel_estimated > 0.0 && energy_estimated > 0.0 {
        fuel_estimated / energy_estimated
    } else {
        0.0
    }
}
