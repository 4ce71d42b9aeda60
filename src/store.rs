//! Persistence for observed brake-failure thicknesses
//!
//! When a brake disc fails on track, the thickness it failed at is worth
//! keeping: next session with the same car the wear display can warn as the
//! pads approach that thickness again. Thresholds are keyed by vehicle
//! class, vehicle name, and axle, so liveries sharing a car still share the
//! record.
//!
//! [`MemoryThresholdStore`] backs tests and callers that do not want disk
//! access; [`YamlThresholdStore`] keeps a flat YAML map on disk, loaded
//! eagerly and rewritten on every save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{EngineError, Result};

/// Which axle a threshold belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axle {
    Front,
    Rear,
}

impl Axle {
    /// Axle of a wheel index in FL, FR, RL, RR order.
    pub fn of_wheel(index: usize) -> Self {
        if index < 2 { Axle::Front } else { Axle::Rear }
    }

    fn tag(self) -> &'static str {
        match self {
            Axle::Front => "F",
            Axle::Rear => "R",
        }
    }
}

/// Storage for per-vehicle brake failure thicknesses (millimetres).
pub trait ThresholdStore {
    /// Per-wheel thresholds for a class/vehicle pair; 0.0 where nothing has
    /// been recorded.
    fn load(&self, class_name: &str, vehicle_name: &str) -> [f64; 4];

    /// Record a failure thickness for one axle.
    fn save(
        &mut self,
        class_name: &str,
        vehicle_name: &str,
        axle: Axle,
        thickness: f64,
    ) -> Result<()>;
}

fn entry_key(class_name: &str, vehicle_name: &str, axle: Axle) -> String {
    format!("{class_name} - {vehicle_name} - {}", axle.tag())
}

fn thresholds_from(
    entries: &HashMap<String, f64>,
    class_name: &str,
    vehicle_name: &str,
) -> [f64; 4] {
    let front =
        entries.get(&entry_key(class_name, vehicle_name, Axle::Front)).copied().unwrap_or(0.0);
    let rear =
        entries.get(&entry_key(class_name, vehicle_name, Axle::Rear)).copied().unwrap_or(0.0);
    [front, front, rear, rear]
}

/// In-memory threshold store.
#[derive(Default, Debug, Clone)]
pub struct MemoryThresholdStore {
    entries: HashMap<String, f64>,
}

impl MemoryThresholdStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThresholdStore for MemoryThresholdStore {
    fn load(&self, class_name: &str, vehicle_name: &str) -> [f64; 4] {
        thresholds_from(&self.entries, class_name, vehicle_name)
    }

    fn save(
        &mut self,
        class_name: &str,
        vehicle_name: &str,
        axle: Axle,
        thickness: f64,
    ) -> Result<()> {
        self.entries.insert(entry_key(class_name, vehicle_name, axle), thickness);
        Ok(())
    }
}

/// Threshold store persisted as a flat YAML map.
#[derive(Debug)]
pub struct YamlThresholdStore {
    path: PathBuf,
    entries: HashMap<String, f64>,
}

impl YamlThresholdStore {
    /// Load the store from `path`. A missing file is an empty store; a file
    /// that fails to parse is treated as empty with a warning rather than
    /// blocking engine startup.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_yaml_ng::from_str(&text) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!("Discarding unreadable threshold store {}: {error}", path.display());
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => {
                return Err(EngineError::store(
                    format!("reading {}", path.display()),
                    error.to_string(),
                ));
            }
        };
        debug!("Threshold store loaded: {} entries from {}", entries.len(), path.display());
        Ok(Self { path, entries })
    }

    fn write_back(&self) -> Result<()> {
        let text = serde_yaml_ng::to_string(&self.entries).map_err(|error| {
            EngineError::store("serializing threshold store", error.to_string())
        })?;
        std::fs::write(&self.path, text).map_err(|error| {
            EngineError::store(format!("writing {}", self.path.display()), error.to_string())
        })
    }
}

impl ThresholdStore for YamlThresholdStore {
    fn load(&self, class_name: &str, vehicle_name: &str) -> [f64; 4] {
        thresholds_from(&self.entries, class_name, vehicle_name)
    }

    fn save(
        &mut self,
        class_name: &str,
        vehicle_name: &str,
        axle: Axle,
        thickness: f64,
    ) -> Result<()> {
        self.entries.insert(entry_key(class_name, vehicle_name, axle), thickness);
        self.write_back()
    }
}
