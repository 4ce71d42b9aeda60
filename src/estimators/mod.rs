//! Per-tick stateful estimators for the player vehicle
//!
//! Each estimator owns its cross-tick state and exposes one `step` method
//! taking a reset flag plus the current telemetry. The engine derives the
//! flag per estimator (garage for wear/rotation/consumption, pit lane for
//! suspension, session rewind ORed into both) and calls every estimator
//! once per compute tick.
//!
//! Steps are idempotent: repeating a call with unchanged telemetry and an
//! unchanged flag leaves every output field as it was. Estimators therefore
//! never assume a fixed tick rate.

mod consumption;
mod cornering;
mod rotation;
mod suspension;
mod wear;

pub use consumption::{Consumable, ConsumptionEstimator, fuel_energy_ratio};
pub use cornering::CorneringRadiusEstimator;
pub use rotation::WheelRotationEstimator;
pub use suspension::SuspensionTravelEstimator;
pub use wear::{BrakeWearEstimator, TyreWearEstimator};

/// Reset-edge detection shared by the estimators.
///
/// The first call always counts as an edge so state is zeroed before any
/// telemetry is trusted; after that only flag transitions fire.
#[derive(Debug, Clone)]
pub(crate) struct ResetEdge {
    is_first_call: bool,
    last_reset: bool,
}

impl ResetEdge {
    pub(crate) fn new() -> Self {
        Self { is_first_call: true, last_reset: false }
    }

    /// True when the flag differs from the previous call.
    pub(crate) fn changed(&mut self, reset: bool) -> bool {
        let edge = self.is_first_call || self.last_reset != reset;
        self.is_first_call = false;
        self.last_reset = reset;
        edge
    }

    /// Flag value recorded by the last `changed` call.
    pub(crate) fn engaged(&self) -> bool {
        self.last_reset
    }
}
