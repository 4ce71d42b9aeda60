//! Derived-metric output records
//!
//! Plain data, rewritten in place by the estimators each tick and published
//! by the engine as one immutable [`EngineOutputs`] snapshot per computed
//! tick. Wheel arrays are ordered front-left, front-right, rear-left,
//! rear-right throughout.

use serde::{Deserialize, Serialize};

use crate::trackers::LapTimeHistory;

/// Placeholder for a missing or invalid lap time.
pub const MAX_SECONDS: f64 = 99999.0;

/// Wheel-related metrics for the player vehicle.
///
/// Wear units: tread in percent of new, brake thickness in millimetres.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WheelsOutput {
    /// Differential locking fraction per axle; 1.0 = wheels turn together.
    pub locking_percent_front: f64,
    pub locking_percent_rear: f64,
    /// Radius in meters of the arc the vehicle is currently describing.
    pub cornering_radius: f64,
    /// Per-wheel slip ratio; negative under braking lock, positive under
    /// wheelspin.
    pub slip_ratio: [f64; 4],

    /// Remaining tread per wheel, percent.
    pub tread_depth: [f64; 4],
    pub tread_wear_current_lap: [f64; 4],
    pub tread_wear_last_lap: [f64; 4],
    /// Projected full-lap tread wear at the current pace.
    pub tread_wear_estimated: [f64; 4],
    /// Projection that ignores the distortion of a pit lap.
    pub tread_wear_estimated_valid: [f64; 4],

    /// Remaining brake thickness per wheel, millimetres.
    pub brake_thickness: [f64; 4],
    /// Highest thickness seen since reset (new-pad calibration).
    pub brake_thickness_max: [f64; 4],
    /// Known failure thickness per wheel from earlier observed failures.
    pub brake_thickness_failure: [f64; 4],
    pub brake_wear_current_lap: [f64; 4],
    pub brake_wear_last_lap: [f64; 4],
    pub brake_wear_estimated: [f64; 4],
    pub brake_wear_estimated_valid: [f64; 4],

    /// Raw suspension deflection per wheel, millimetres.
    pub suspension_position: [f64; 4],
    /// Deflection captured at rest in the garage/pit stall.
    pub suspension_position_static: [f64; 4],
    /// Observed travel envelope, smoothed.
    pub suspension_position_min: [f64; 4],
    pub suspension_position_max: [f64; 4],
}

/// Consumption metrics for one consumable (fuel in liters, energy in
/// percent).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionOutput {
    /// Tank capacity (liters) or 100 for energy.
    pub capacity: f64,
    /// Current remaining amount.
    pub amount_current: f64,
    /// Amount when the stint started; re-anchored on refuelling.
    pub amount_stint_start: f64,
    /// Amount consumed on the current lap so far.
    pub used_current_lap: f64,
    pub last_lap_consumption: f64,
    /// Consumption gain/loss versus the reference lap at equal distance.
    pub delta_consumption: f64,
    /// Projected full-lap consumption at the current pace.
    pub estimated_consumption: f64,
    /// Projection that ignores the distortion of a pit lap.
    pub estimated_valid_consumption: f64,
}

/// Per-vehicle tracker outputs (player included).
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOutput {
    pub slot_id: i32,
    pub is_player: bool,
    /// In the pit lane/garage now, or stopped earlier on this lap.
    pub pitting: bool,
    /// Seconds spent in the pit lane during the current/last visit.
    pub pit_elapsed: f64,
    /// Seconds stationary during the current/last visit.
    pub pit_stopped: f64,
    /// Lap number of the last pit stop.
    pub lap_stopped: i32,
    /// Interpolated speed at the speed-trap line, m/s.
    pub speed_trap: f64,
    pub lap_history: LapTimeHistory,
}

/// One published tick of derived metrics.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutputs {
    /// Monotonic compute-tick counter, independent of telemetry tick rate.
    pub tick: u64,
    pub wheels: WheelsOutput,
    pub fuel: ConsumptionOutput,
    pub energy: ConsumptionOutput,
    /// Liters of fuel burned per percent of virtual energy; 0 when the
    /// session has no energy component.
    pub fuel_energy_ratio: f64,
    pub vehicles: Vec<VehicleOutput>,
}
