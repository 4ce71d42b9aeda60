//! Telemetry feed trait and replay feed

use tokio::time::{Duration, Interval, interval};
use tracing::{debug, trace};

use crate::error::{EngineError, Result};
use crate::telemetry::TelemetrySnapshot;

/// Trait for telemetry snapshot sources
///
/// Feeds abstract over different sources (shared memory, network, recorded
/// sessions) and handle their own timing internally: a live feed waits for
/// the simulator to publish, a replay feed paces itself at playback speed.
#[async_trait::async_trait]
pub trait TelemetryFeed: Send + 'static {
    /// Get the next telemetry snapshot
    ///
    /// Returns:
    /// - `Ok(Some(snapshot))` - New snapshot available
    /// - `Ok(None)` - Feed ended (normal termination)
    /// - `Err(e)` - Error occurred
    async fn next_snapshot(&mut self) -> Result<Option<TelemetrySnapshot>>;

    /// Get the native tick rate in Hz
    fn tick_rate(&self) -> f64;
}

/// Replay feed that plays back a recorded snapshot sequence
pub struct ReplayFeed {
    snapshots: Vec<TelemetrySnapshot>,

    /// Playback speed multiplier (1.0 = normal, 2.0 = double speed)
    speed: f64,

    /// Snapshot pacing interval
    interval: Interval,

    /// Native tick rate of the recording
    tick_rate: f64,

    cursor: usize,
}

impl ReplayFeed {
    /// Create a new replay feed from a recorded snapshot sequence
    pub fn new(snapshots: Vec<TelemetrySnapshot>, tick_rate: f64) -> Self {
        let tick_rate = tick_rate.clamp(1.0, 1000.0);
        let interval = interval(Duration::from_secs_f64(1.0 / tick_rate));
        debug!("Opened replay: {} snapshots at {}Hz", snapshots.len(), tick_rate);
        Self { snapshots, speed: 1.0, interval, tick_rate, cursor: 0 }
    }

    /// Set playback speed
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(0.1, 10.0); // Clamp to reasonable range

        // Update interval based on new speed
        let frame_duration = Duration::from_secs_f64(1.0 / (self.tick_rate * self.speed));
        self.interval = interval(frame_duration);

        debug!("Playback speed set to {}x", self.speed);
    }

    /// Get current speed
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Seek to a specific snapshot index
    pub fn seek_to(&mut self, index: usize) -> Result<()> {
        if index >= self.snapshots.len() {
            return Err(EngineError::feed_error(format!(
                "Cannot seek to snapshot {} (recording has {} snapshots)",
                index,
                self.snapshots.len()
            )));
        }
        debug!("Seeking to snapshot {}", index);
        self.cursor = index;
        Ok(())
    }

    /// Get current playback time in seconds
    pub fn current_time(&self) -> f64 {
        self.cursor as f64 / self.tick_rate
    }

    /// Get total duration in seconds
    pub fn duration(&self) -> f64 {
        self.snapshots.len() as f64 / self.tick_rate
    }
}

#[async_trait::async_trait]
impl TelemetryFeed for ReplayFeed {
    async fn next_snapshot(&mut self) -> Result<Option<TelemetrySnapshot>> {
        if self.cursor >= self.snapshots.len() {
            debug!("Reached end of replay");
            return Ok(None);
        }

        // Wait for next snapshot timing (pacing)
        self.interval.tick().await;

        let snapshot = self.snapshots[self.cursor].clone();
        self.cursor += 1;

        trace!("Snapshot {}/{}", self.cursor, self.snapshots.len());

        Ok(Some(snapshot))
    }

    fn tick_rate(&self) -> f64 {
        self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(count: usize) -> Vec<TelemetrySnapshot> {
        (0..count)
            .map(|i| {
                let mut snapshot = TelemetrySnapshot::default();
                snapshot.session.elapsed = i as f64;
                snapshot
            })
            .collect()
    }

    #[tokio::test]
    async fn test_replay_yields_in_order_then_ends() {
        let mut feed = ReplayFeed::new(recording(3), 1000.0);
        for expected in 0..3 {
            let snapshot = feed.next_snapshot().await.unwrap().unwrap();
            assert_eq!(snapshot.session.elapsed, expected as f64);
        }
        assert!(feed.next_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seek_and_duration() {
        let mut feed = ReplayFeed::new(recording(10), 100.0);
        assert_eq!(feed.duration(), 0.1);

        feed.seek_to(7).unwrap();
        assert_eq!(feed.current_time(), 0.07);
        let snapshot = feed.next_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.session.elapsed, 7.0);

        assert!(feed.seek_to(10).is_err());
    }

    #[tokio::test]
    async fn test_speed_is_clamped() {
        let mut feed = ReplayFeed::new(recording(1), 100.0);
        feed.set_speed(50.0);
        assert_eq!(feed.speed(), 10.0);
        feed.set_speed(0.0);
        assert_eq!(feed.speed(), 0.1);
    }
}
