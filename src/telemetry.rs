//! Telemetry snapshot types consumed by the engine
//!
//! A [`TelemetrySnapshot`] is one tick of raw simulator data: a detailed
//! block for the player vehicle, a common block for every vehicle on track,
//! and session-level values. The engine only ever borrows snapshots; feeds
//! own them until they are handed over.
//!
//! Units follow the simulator conventions the estimators expect:
//! - wheel rotation in rad/s, rolling forward is negative
//! - suspension deflection and tyre vertical deflection in millimetres
//! - tyre tread as remaining fraction (0..1), brake thickness in meters
//!   with −1.0 meaning the simulator exposes no brake data
//! - distances in meters, times in seconds, speeds in m/s

use serde::{Deserialize, Serialize};

/// Where a vehicle currently sits relative to the pit complex.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaddockZone {
    /// On the racing surface.
    #[default]
    OnTrack,
    /// In the pit lane, possibly stopped in a pit box.
    PitLane,
    /// Parked in the garage stall.
    Garage,
}

impl PaddockZone {
    /// True anywhere inside the pit complex (lane or garage).
    pub fn in_pit_area(self) -> bool {
        !matches!(self, PaddockZone::OnTrack)
    }
}

/// One tick of raw telemetry for every consumer in the engine.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySnapshot {
    pub session: SessionTelemetry,
    pub player: PlayerTelemetry,
    pub vehicles: Vec<VehicleTelemetry>,
}

/// Session-level values.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTelemetry {
    /// Session elapsed time in seconds. Goes backwards on session restart.
    pub elapsed: f64,
    /// Whether the player is on track and driving. Gates the compute cadence.
    pub active: bool,
    /// Track length in meters.
    pub track_length: f64,
    /// Speed-trap position as lap distance in meters.
    pub speed_trap_position: f64,
}

/// Detailed player-vehicle channels.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTelemetry {
    pub vehicle_name: String,
    pub class_name: String,

    /// Wheel rotation rad/s: front-left, front-right, rear-left, rear-right.
    pub wheel_rotation: [f64; 4],
    /// Suspension deflection per wheel, millimetres.
    pub suspension_deflection: [f64; 4],
    /// Remaining tread fraction per wheel, 0..1.
    pub tyre_wear: [f64; 4],
    /// Tyre vertical deflection per wheel, millimetres. Near zero when a
    /// wheel leaves the ground.
    pub tyre_deflection: [f64; 4],
    /// Remaining brake thickness per wheel in meters; −1.0 when the
    /// simulator exposes no brake data.
    pub brake_thickness: [f64; 4],
    /// Count of wheels currently off the racing surface.
    pub wheels_offroad: u8,

    pub speed: f64,
    pub accel_lateral: f64,
    pub accel_longitudinal: f64,
    pub in_pits: bool,
    pub in_garage: bool,
    /// Session time of the last vehicle impact.
    pub impact_time: f64,
    /// Raw world position used for the cornering fit.
    pub position_longitudinal: f64,
    pub position_lateral: f64,

    /// Session time at which the current lap started.
    pub lap_start_time: f64,
    /// Elapsed time of the current lap.
    pub lap_time_current: f64,
    /// Distance into the current lap, meters.
    pub lap_distance: f64,
    /// Lap completion fraction 0..1.
    pub lap_progress: f64,

    /// Gearbox position; 0 is neutral, negative is reverse.
    pub gear: i8,
    /// Unfiltered throttle input 0..1.
    pub throttle_raw: f64,

    pub fuel_capacity: f64,
    pub fuel_remaining: f64,
    /// Virtual (hybrid) energy remaining; 0 when the format has none.
    pub virtual_energy: f64,
    pub max_virtual_energy: f64,
}

impl PlayerTelemetry {
    /// Paddock zone derived from the pit flags.
    pub fn paddock_zone(&self) -> PaddockZone {
        if self.in_garage {
            PaddockZone::Garage
        } else if self.in_pits {
            PaddockZone::PitLane
        } else {
            PaddockZone::OnTrack
        }
    }

    /// Whether the simulator reports brake thickness at all.
    pub fn has_brake_data(&self) -> bool {
        !self.brake_thickness.contains(&-1.0)
    }

    /// True when any wheel is off the racing surface.
    pub fn any_wheel_offroad(&self) -> bool {
        self.wheels_offroad > 0
    }

    /// Energy telemetry normalized to percent: `(capacity, remaining)`.
    ///
    /// Capacity is always 100; remaining is 0 when the vehicle carries no
    /// virtual energy.
    pub fn energy_percent(&self) -> (f64, f64) {
        if self.max_virtual_energy > 0.0 {
            (100.0, self.virtual_energy / self.max_virtual_energy * 100.0)
        } else {
            (100.0, 0.0)
        }
    }
}

/// Common channels available for every vehicle on track.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTelemetry {
    /// Simulator slot id; changes when a different vehicle occupies the
    /// entry.
    pub slot_id: i32,
    pub is_player: bool,
    pub zone: PaddockZone,
    pub speed: f64,
    /// Distance into the current lap, meters.
    pub lap_distance: f64,
    pub laps_completed: i32,
    /// Session time at which the current lap started.
    pub lap_start_time: f64,
    /// Per-vehicle elapsed time in seconds.
    pub elapsed_time: f64,
    pub last_lap_time: f64,
}
