//! Per-vehicle trackers
//!
//! Small stateful trackers kept per observed vehicle slot, fed once per
//! tick from the scoring feed: lap-time history for delta comparisons, the
//! pit-stop timer, and the speed-trap reading. Unlike the estimators these
//! carry no reset signal; each detects its own discontinuities (slot
//! reassignment, session rewind, repeated samples).

mod lap_history;
mod pit_timer;
mod speed_trap;

pub use lap_history::LapTimeHistory;
pub use pit_timer::PitTimer;
pub use speed_trap::SpeedTrap;
