//! Pure numeric helpers shared by the estimators
//!
//! Everything here is stateless and unit-free except where noted. Wheel
//! rotation follows the simulator convention: rolling forward is negative
//! rad/s.

/// Smoothing factor for an exponential moving average over `samples` ticks.
///
/// Clamped below by `min_samples` so a tiny configured window cannot turn the
/// average into a raw passthrough.
pub fn ema_factor(samples: u32, min_samples: u32) -> f64 {
    2.0 / (samples.max(min_samples) as f64 + 1.0)
}

/// One exponential-moving-average step: `last + factor * (sample - last)`.
pub fn exp_moving_avg(factor: f64, last: f64, sample: f64) -> f64 {
    last + factor * (sample - last)
}

/// Combined rotation of an axle from its two wheel speeds.
///
/// Harmonic mean rather than arithmetic: a wheel spun up off the ground
/// dominates an arithmetic mean but barely moves the harmonic one. Wheels
/// rotating in opposite directions give 0.
pub fn axle_rotation(left: f64, right: f64) -> f64 {
    if left * right >= 0.0 && left + right != 0.0 {
        2.0 * left * right / (left + right)
    } else {
        0.0
    }
}

/// Normalized left/right rotation difference against the axle rotation.
pub fn rotation_bias(axle: f64, left: f64, right: f64) -> f64 {
    if axle != 0.0 { ((left - right) / axle).abs() } else { 0.0 }
}

/// Differential locking fraction for one axle.
///
/// `extreme` is the fastest-rotating wheel on the axle (most negative while
/// rolling forward). 1.0 means both wheels turn together (locked or simply
/// straight-line driving); values toward 0 mean the differential lets the
/// wheels diverge.
pub fn locking_percent(axle: f64, extreme: f64) -> f64 {
    if extreme != 0.0 { axle / extreme } else { 1.0 }
}

/// Effective rolling radius from ground speed and wheel rotation.
pub fn rotation_to_radius(speed: f64, rotation: f64) -> f64 {
    if rotation != 0.0 { (speed / rotation).abs() } else { 0.0 }
}

/// Slip ratio of one wheel given its calibrated rolling radius.
///
/// Returns 0 below 0.1 m/s; the quotient is meaningless at a standstill.
pub fn slip_ratio(rotation: f64, radius: f64, speed: f64) -> f64 {
    if speed > 0.1 { (rotation.abs() * radius - speed) / speed } else { 0.0 }
}

/// Linear interpolation of `y` at `x` between `(x1, y1)` and `(x2, y2)`.
///
/// Extrapolates outside the segment; degenerate segments return `y1`.
pub fn linear_interp(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let span = x2 - x1;
    if span != 0.0 { y1 + (x - x1) * (y2 - y1) / span } else { y1 }
}

/// Center of the circle through three points, or `None` when they are
/// colinear.
pub fn circle_center(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<(f64, f64)> {
    let p = b.0 - a.0;
    let q = b.1 - a.1;
    let r = c.0 - a.0;
    let s = c.1 - a.1;
    let t = p * p + q * q;
    let u = r * r + s * s;
    let v = 2.0 * (p * s - q * r);
    if v == 0.0 {
        return None;
    }
    Some((a.0 + (s * t - q * u) / v, a.1 + (p * u - r * t) / v))
}

/// Euclidean distance between two planar points.
pub fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - b.0).hypot(a.1 - b.1)
}

/// Signed distance from `reference` to `target` along a closed loop of
/// `circle_length`, wrapped into `±circle_length / 2`.
pub fn circular_relative_distance(circle_length: f64, reference: f64, target: f64) -> f64 {
    let mut relative = target - reference;
    if relative.abs() > circle_length * 0.5 {
        if target > reference {
            relative -= circle_length;
        } else if target < reference {
            relative += circle_length;
        }
    }
    relative
}

/// Lap-progress-weighted wear estimate used before any reference lap exists.
pub fn wear_weighted(current: f64, valid: f64, lap_progress: f64) -> f64 {
    current * lap_progress + valid * (1.0 - lap_progress)
}
