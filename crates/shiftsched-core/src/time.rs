//! Time Model (C1).
//!
//! Normalizes every time reference used by the rest of the core to a single
//! minute index `t`, stepped by [`STEP_MINUTES`]. `(day, hour, minute)` only
//! exists at the I/O boundary (C2 payload parsing, C6 progress-event output).

/// Slot granularity, in minutes. Fixed by the spec.
pub const STEP_MINUTES: i64 = 15;

/// One day, in minutes.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Convert a `(day, hour, minute)` triple to a minute index `t`.
///
/// Pure and total for any `day >= 0`, `0 <= hour < 24`, `0 <= minute < 60`.
pub fn to_t(day: i64, hour: i64, minute: i64) -> i64 {
    day * MINUTES_PER_DAY + hour * 60 + minute
}

/// Convert a minute index `t` back to `(day, hour, minute)`.
///
/// Total for `t >= 0`. Pairs with [`to_t`] as an exact inverse.
pub fn from_t(t: i64) -> (i64, i64, i64) {
    let day = t.div_euclid(MINUTES_PER_DAY);
    let rem = t.rem_euclid(MINUTES_PER_DAY);
    let hour = rem.div_euclid(60);
    let minute = rem.rem_euclid(60);
    (day, hour, minute)
}

/// The horizon length in minutes for a run of `num_hours` hours.
pub fn horizon_minutes(num_hours: i64) -> i64 {
    num_hours * 60
}

/// The ordered slot set `T = {0, step, 2*step, ..., H - step}`.
pub fn slots(horizon: i64) -> Vec<i64> {
    (0..horizon).step_by(STEP_MINUTES as usize).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_to_from() {
        for day in 0..3 {
            for hour in 0..24 {
                for minute in (0..60).step_by(15) {
                    let t = to_t(day, hour, minute);
                    assert_eq!(from_t(t), (day, hour, minute));
                }
            }
        }
    }

    #[test]
    fn round_trip_from_to() {
        let horizon = horizon_minutes(48);
        for t in slots(horizon) {
            let (d, h, m) = from_t(t);
            assert_eq!(to_t(d, h, m), t);
        }
    }

    #[test]
    fn slots_cover_horizon() {
        let horizon = horizon_minutes(24);
        let s = slots(horizon);
        assert_eq!(s.len(), 96);
        assert_eq!(s[0], 0);
        assert_eq!(*s.last().unwrap(), horizon - STEP_MINUTES);
    }
}
