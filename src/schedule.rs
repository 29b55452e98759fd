//! Poll scheduling on 5-second wall-clock boundaries.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Tick interval in seconds.
const TICK: i64 = 5;

/// Fraction of a second past a boundary within which the boundary still
/// counts as "now" rather than as already fired.
const DEADBAND: f64 = 0.15;

/// Seconds to wait until the next 5-second-aligned wall-clock instant.
///
/// `now` is a clock reading in seconds. Calls landing just past a boundary
/// (fractional part above the deadband) roll over to the following one so
/// a single tick never fires twice.
pub fn seconds_until_next_tick(now: f64) -> f64 {
    let whole = now.floor();
    let sec = (whole as i64).rem_euclid(60);
    let offset = (TICK - (sec % TICK)) % TICK;
    let mut target = whole + offset as f64;
    if offset == 0 && now - whole > DEADBAND {
        target += TICK as f64;
    }
    (target - now).max(0.0)
}

/// Delay until the next tick, read off the system clock.
pub fn next_tick_delay() -> Duration {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    Duration::from_secs_f64(seconds_until_next_tick(now))
}
