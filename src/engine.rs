//! Engine spawns and manages the derived-metrics tasks
//!
//! Two tasks cooperate through watch channels: a feed pump that owns the
//! [`TelemetryFeed`] and publishes the latest snapshot, and a compute loop
//! that steps every estimator and tracker against that snapshot at a fixed
//! cadence and publishes immutable [`EngineOutputs`]. Consumers subscribe
//! through [`EngineHandle`], optionally throttled below the compute rate.

use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use crate::config::EngineConfig;
use crate::estimators::{
    BrakeWearEstimator, Consumable, ConsumptionEstimator, CorneringRadiusEstimator,
    SuspensionTravelEstimator, TyreWearEstimator, WheelRotationEstimator, fuel_energy_ratio,
};
use crate::feed::TelemetryFeed;
use crate::output::{ConsumptionOutput, EngineOutputs, VehicleOutput, WheelsOutput};
use crate::store::ThresholdStore;
use crate::stream::{ThrottleExt, UpdateRate};
use crate::telemetry::TelemetrySnapshot;
use crate::trackers::{LapTimeHistory, PitTimer, SpeedTrap};

/// Upper bound on tracked vehicle slots per snapshot.
pub const MAX_VEHICLES: usize = 128;

#[derive(Default)]
struct VehicleState {
    slot_id: i32,
    pit_timer: PitTimer,
    speed_trap: SpeedTrap,
    lap_history: LapTimeHistory,
}

/// Engine spawns and manages the derived-metrics tasks
///
/// Spawns a feed pump task that owns the feed, and a compute task that owns
/// all estimator state. Estimator state is never shared; only the published
/// output snapshots cross task boundaries.
pub struct Engine;

impl Engine {
    /// Spawn engine tasks for the given feed.
    ///
    /// Returns a handle carrying the output channel and a cancellation
    /// token for graceful shutdown.
    pub fn spawn<F, S>(feed: F, config: EngineConfig, store: S) -> EngineHandle
    where
        F: TelemetryFeed,
        S: ThresholdStore + Send + 'static,
    {
        let (snapshot_tx, snapshot_rx) = watch::channel(None);
        let (output_tx, output_rx) = watch::channel(None);
        let cancel = CancellationToken::new();

        // Publish rate while active; subscriptions normalize against this.
        let source_hz = 1000.0 / config.active_interval_ms.max(1) as f64;

        let cancel_pump = cancel.clone();
        tokio::spawn(async move {
            Self::feed_pump_task(feed, snapshot_tx, cancel_pump).await;
        });

        let cancel_compute = cancel.clone();
        tokio::spawn(async move {
            Self::compute_task(snapshot_rx, output_tx, config, store, cancel_compute).await;
        });

        EngineHandle { outputs: output_rx, source_hz, cancel }
    }

    /// Feed pump task - reads snapshots and publishes the latest
    async fn feed_pump_task<F>(
        mut feed: F,
        snapshot_tx: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
        cancel: CancellationToken,
    ) where
        F: TelemetryFeed,
    {
        info!("Feed pump task started");
        let mut snapshot_count = 0u64;
        let mut error_count = 0u32;
        const MAX_ERRORS: u32 = 10;

        loop {
            if cancel.is_cancelled() {
                info!("Feed pump cancelled");
                break;
            }

            // Use select to allow cancellation during feed.next_snapshot()
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Feed pump cancelled during read");
                    break;
                }
                result = feed.next_snapshot() => result,
            };

            match result {
                Ok(Some(snapshot)) => {
                    snapshot_count += 1;
                    error_count = 0; // Reset error count on success

                    trace!(
                        "Snapshot {}: elapsed={:.3} active={}",
                        snapshot_count, snapshot.session.elapsed, snapshot.session.active
                    );

                    if snapshot_tx.send(Some(Arc::new(snapshot))).is_err() {
                        debug!("Snapshot receiver dropped, shutting down");
                        break;
                    }
                }
                Ok(None) => {
                    info!("Feed ended after {} snapshots", snapshot_count);
                    let _ = snapshot_tx.send(None);
                    break;
                }
                Err(e) => {
                    // Feed error - don't crash on transient failures
                    error_count += 1;
                    error!("Feed error ({}/{}): {}", error_count, MAX_ERRORS, e);

                    if !e.is_retryable() || error_count >= MAX_ERRORS {
                        error!("Unrecoverable feed error, shutting down");
                        let _ = snapshot_tx.send(None);
                        break;
                    }

                    // Exponential backoff: 50ms, 100ms, 200ms, ...
                    let backoff = Duration::from_millis(50 * (1 << error_count.min(5)));
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        info!("Feed pump task ended (processed {} snapshots)", snapshot_count);
    }

    /// Compute task - owns all estimator and tracker state
    async fn compute_task<S>(
        snapshot_rx: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,
        output_tx: watch::Sender<Option<Arc<EngineOutputs>>>,
        config: EngineConfig,
        store: S,
        cancel: CancellationToken,
    ) where
        S: ThresholdStore + Send + 'static,
    {
        info!("Compute task started");
        let active_interval = config.active_interval();
        let idle_interval = config.idle_interval();

        let mut rotation = WheelRotationEstimator::new(&config.wheels);
        let mut suspension = SuspensionTravelEstimator::new(&config.wheels);
        let mut cornering = CorneringRadiusEstimator::new(&config.wheels);
        let mut tyre_wear = TyreWearEstimator::new(&config.wheels);
        let mut brake_wear = BrakeWearEstimator::new(&config.wheels, store);
        let mut fuel = ConsumptionEstimator::new(&config.fuel, Consumable::Fuel);
        let mut energy = ConsumptionEstimator::new(&config.energy, Consumable::Energy);

        let mut vehicles: Vec<VehicleState> = Vec::new();
        let mut wheels_out = WheelsOutput::default();
        let mut fuel_out = ConsumptionOutput::default();
        let mut energy_out = ConsumptionOutput::default();
        let mut last_session_elapsed = 0.0;
        let mut tick = 0u64;
        let mut period = active_interval;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Compute task cancelled");
                    break;
                }
                _ = tokio::time::sleep(period) => {}
            }

            let latest = { snapshot_rx.borrow().clone() };
            let Some(snapshot) = latest else {
                period = idle_interval;
                continue;
            };
            if !snapshot.session.active {
                period = idle_interval;
                continue;
            }
            period = active_interval;

            let session = &snapshot.session;
            let player = &snapshot.player;

            // Session elapsed moving backwards marks a session change.
            let new_session = session.elapsed < last_session_elapsed;
            last_session_elapsed = session.elapsed;

            let reset_garage = player.in_garage || new_session;
            let reset_pit = player.in_pits || new_session;

            rotation.step(reset_garage, player, &mut wheels_out);
            suspension.step(reset_pit, session.elapsed, player, &mut wheels_out);
            cornering.step(player, &mut wheels_out);
            tyre_wear.step(reset_garage, player, &mut wheels_out);
            brake_wear.step(reset_garage, player, &mut wheels_out);
            fuel.step(reset_garage, player, &mut fuel_out);
            // Cars without virtual energy keep all-zero energy outputs.
            if player.max_virtual_energy > 0.0 {
                energy.step(reset_garage, player, &mut energy_out);
            }
            let ratio = fuel_energy_ratio(
                fuel_out.estimated_consumption,
                energy_out.estimated_consumption,
            );

            let count = snapshot.vehicles.len().min(MAX_VEHICLES);
            vehicles.resize_with(count, VehicleState::default);
            let mut vehicle_outputs = Vec::with_capacity(count);
            for (state, vehicle) in vehicles.iter_mut().zip(&snapshot.vehicles) {
                // A different vehicle taking over the entry gets fresh
                // trackers.
                if state.slot_id != vehicle.slot_id {
                    *state = VehicleState { slot_id: vehicle.slot_id, ..Default::default() };
                }
                state.pit_timer.update(
                    vehicle.slot_id,
                    vehicle.zone,
                    vehicle.elapsed_time,
                    vehicle.laps_completed,
                    vehicle.speed,
                );
                state.speed_trap.update(
                    vehicle.speed,
                    vehicle.lap_distance,
                    session.speed_trap_position,
                    session.track_length,
                );
                state.lap_history.update(
                    vehicle.lap_start_time,
                    vehicle.elapsed_time,
                    vehicle.last_lap_time,
                );
                vehicle_outputs.push(VehicleOutput {
                    slot_id: vehicle.slot_id,
                    is_player: vehicle.is_player,
                    pitting: state.pit_timer.pitting,
                    pit_elapsed: state.pit_timer.elapsed,
                    pit_stopped: state.pit_timer.stopped,
                    lap_stopped: state.pit_timer.lap_stopped,
                    speed_trap: state.speed_trap.speed,
                    lap_history: state.lap_history,
                });
            }

            tick += 1;
            let outputs = EngineOutputs {
                tick,
                wheels: wheels_out.clone(),
                fuel: fuel_out.clone(),
                energy: energy_out.clone(),
                fuel_energy_ratio: ratio,
                vehicles: vehicle_outputs,
            };

            if output_tx.send(Some(Arc::new(outputs))).is_err() {
                debug!("Output receiver dropped, shutting down");
                break;
            }
        }

        info!("Compute task ended ({} ticks)", tick);
    }
}

/// Handle to a running engine
pub struct EngineHandle {
    /// Output watch receiver
    outputs: watch::Receiver<Option<Arc<EngineOutputs>>>,

    /// Publish frequency while active
    source_hz: f64,

    /// Cancellation token for stopping tasks
    cancel: CancellationToken,
}

impl EngineHandle {
    /// Subscribe to output snapshots
    pub fn subscribe(
        &self,
        rate: UpdateRate,
    ) -> impl Stream<Item = Arc<EngineOutputs>> + Send + 'static {
        // Create base output stream from watch channel
        let outputs = WatchStream::new(self.outputs.clone()).filter_map(|opt| async move { opt });

        match rate.normalize(self.source_hz) {
            UpdateRate::Native => outputs.boxed(),
            UpdateRate::Max(hz) => {
                // Throttle with latest-wins semantics
                let interval = Duration::from_secs_f64(1.0 / hz as f64);
                outputs.throttle(interval).boxed()
            }
        }
    }

    /// Get the latest output snapshot (if any tick has been published)
    pub fn latest(&self) -> Option<Arc<EngineOutputs>> {
        self.outputs.borrow().clone()
    }

    /// Get the publish frequency
    pub fn source_hz(&self) -> f64 {
        self.source_hz
    }

    /// Stop the engine tasks
    pub fn shutdown(&self) {
        debug!("Shutting down engine");
        self.cancel.cancel();
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        debug!("Dropping engine handle");
        // Cancel tasks on drop for clean shutdown
        self.cancel.cancel();
    }
}
