//! Engine configuration
//!
//! All knobs default to values tuned against rFactor-style telemetry; a
//! partial YAML/JSON document deserializes over the defaults, so consumers
//! only spell out what they change.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{EngineError, Result};

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compute period in milliseconds while the player is driving.
    pub active_interval_ms: u64,
    /// Compute period in milliseconds while idle (menus, garage, replays).
    pub idle_interval_ms: u64,
    pub wheels: WheelsConfig,
    pub fuel: ConsumptionConfig,
    pub energy: ConsumptionConfig,
}

impl EngineConfig {
    /// Loads configuration from a YAML file. Missing keys fall back to
    /// their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|error| EngineError::file_error(path.to_path_buf(), error))?;
        serde_yaml_ng::from_str(&raw)
            .map_err(|error| EngineError::parse_error(path.display().to_string(), error.to_string()))
    }

    pub fn active_interval(&self) -> Duration {
        Duration::from_millis(self.active_interval_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            active_interval_ms: 10,
            idle_interval_ms: 400,
            wheels: WheelsConfig::default(),
            fuel: ConsumptionConfig::default(),
            energy: ConsumptionConfig::default(),
        }
    }
}

/// Wheel estimator settings (rotation, wear, suspension, cornering).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelsConfig {
    /// Axle rotation (rad/s) below which locking and radius calibration
    /// engage; forward rotation is negative so the threshold is applied as
    /// `axle < -minimum_axle_rotation`.
    pub minimum_axle_rotation: f64,
    /// Upper rotation-bias bound for front radius calibration.
    pub maximum_rotation_difference_front: f64,
    /// Upper rotation-bias bound for rear radius calibration.
    pub maximum_rotation_difference_rear: f64,
    /// Spacing in meters between recorded wear samples.
    pub minimum_delta_distance: f64,
    /// Keep accumulating the suspension envelope while wheels are offroad.
    pub enable_suspension_measurement_while_offroad: bool,
    /// EMA window (ticks) for the suspension envelope.
    pub average_suspension_position_samples: u32,
    /// Per-tick clamp (mm) on EMA movement, against spikes.
    pub average_suspension_position_margin: f64,
    /// Tyre vertical deflection (mm) below which a wheel counts as lifted.
    pub wheel_lift_off_threshold: f64,
    /// Cornering-fit chord length in position samples; clamped to 5..=100.
    pub cornering_radius_sampling_interval: u32,
}

impl Default for WheelsConfig {
    fn default() -> Self {
        Self {
            minimum_axle_rotation: 4.0,
            maximum_rotation_difference_front: 0.002,
            maximum_rotation_difference_rear: 0.002,
            minimum_delta_distance: 5.0,
            enable_suspension_measurement_while_offroad: false,
            average_suspension_position_samples: 20,
            average_suspension_position_margin: 1.0,
            wheel_lift_off_threshold: 1.0,
            cornering_radius_sampling_interval: 10,
        }
    }
}

/// Consumption estimator settings, one instance each for fuel and energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumptionConfig {
    /// Spacing in meters between recorded consumption samples.
    pub minimum_delta_distance: f64,
}

impl Default for ConsumptionConfig {
    fn default() -> Self {
        Self { minimum_delta_distance: 5.0 }
    }
}
