//! Derived-metrics calculation engine for racing simulator telemetry.
//!
//! Raceline turns raw simulator telemetry snapshots into pit-wall grade
//! derived metrics: tyre and brake wear projections, fuel and virtual energy
//! consumption, wheel slip and locking, suspension travel envelopes,
//! cornering radius, pit timing, lap-time history and speed traps.
//!
//! # Features
//!
//! - **Tick-driven**: one owned compute loop steps every estimator against
//!   the latest snapshot and publishes an immutable output record per tick
//! - **Reference laps**: wear and consumption record distance-indexed
//!   reference laps for live deltas and full-lap projections
//! - **Feed-agnostic**: anything implementing [`TelemetryFeed`] drives the
//!   engine; a paced replay feed is included
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use raceline::{Engine, EngineConfig, MemoryThresholdStore, ReplayFeed, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> raceline::Result<()> {
//!     let feed = ReplayFeed::new(load_recording(), 50.0);
//!     let engine = Engine::spawn(feed, EngineConfig::default(), MemoryThresholdStore::new());
//!
//!     let mut outputs = engine.subscribe(UpdateRate::Max(10));
//!     while let Some(tick) = outputs.next().await {
//!         println!("Fuel per lap: {:.2}L", tick.fuel.estimated_consumption);
//!     }
//!     Ok(())
//! }
//!
//! fn load_recording() -> Vec<raceline::TelemetrySnapshot> {
//!     Vec::new()
//! }
//! ```

// Core data and pure helpers
mod calc;
pub mod config;
mod delta;
mod error;
pub mod output;
pub mod telemetry;

// Estimators and trackers (per-tick state machines)
pub mod estimators;
pub mod trackers;

// Engine architecture
pub mod engine;
pub mod feed;
pub mod store;
pub mod stream;

// Core exports
pub use config::{ConsumptionConfig, EngineConfig, WheelsConfig};
pub use error::{EngineError, Result};
pub use output::{ConsumptionOutput, EngineOutputs, MAX_SECONDS, VehicleOutput, WheelsOutput};
pub use telemetry::{
    PaddockZone, PlayerTelemetry, SessionTelemetry, TelemetrySnapshot, VehicleTelemetry,
};

// Tracker exports
pub use trackers::{LapTimeHistory, PitTimer, SpeedTrap};

// Main API exports
pub use engine::{Engine, EngineHandle, MAX_VEHICLES};
pub use feed::{ReplayFeed, TelemetryFeed};
pub use store::{Axle, MemoryThresholdStore, ThresholdStore, YamlThresholdStore};
pub use stream::{ThrottleExt, UpdateRate};
