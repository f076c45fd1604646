//! Planning-horizon clock.
//!
//! All instants are whole minutes since the start of the horizon. Flights
//! repeat daily at a fixed minute of day.

/// Minutes since the start of the planning horizon.
pub type Minute = i64;

pub const MINUTES_PER_HOUR: i64 = 60;
pub const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Number of days covered by the per-minute warehouse timeline.
pub const HORIZON_DAYS: i64 = 4;
pub const HORIZON_MINUTES: i64 = HORIZON_DAYS * MINUTES_PER_DAY;

/// Minimum layover between two connecting flights.
pub const CONNECTION_MINUTES: i64 = 2 * MINUTES_PER_HOUR;

/// Time a unit waits in the origin warehouse before its first departure.
pub const ORIGIN_HANDLING_MINUTES: i64 = 2 * MINUTES_PER_HOUR;

/// Time a delivered unit stays in the destination warehouse for pickup.
pub const PICKUP_BUFFER_MINUTES: i64 = 2 * MINUTES_PER_HOUR;

/// Maximum transit time promised for a same-continent delivery.
pub const SAME_CONTINENT_PROMISE_HOURS: f64 = 48.0;

/// Maximum transit time promised for a cross-continent delivery.
pub const CROSS_CONTINENT_PROMISE_HOURS: f64 = 72.0;

/// Converts minutes to fractional hours.
#[inline]
pub fn hours(minutes: i64) -> f64 {
    minutes as f64 / MINUTES_PER_HOUR as f64
}

/// First instant at or after `not_before` whose minute of day equals
/// `minute_of_day`.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::time::next_occurrence;
///
/// assert_eq!(next_occurrence(600, 0), 600);
/// assert_eq!(next_occurrence(600, 601), 1440 + 600);
/// assert_eq!(next_occurrence(600, 1440 + 600), 1440 + 600);
/// ```
pub fn next_occurrence(minute_of_day: i64, not_before: Minute) -> Minute {
    let day = not_before.div_euclid(MINUTES_PER_DAY);
    let candidate = day * MINUTES_PER_DAY + minute_of_day.rem_euclid(MINUTES_PER_DAY);
    if candidate < not_before {
        candidate + MINUTES_PER_DAY
    } else {
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_occurrence_same_day() {
        assert_eq!(next_occurrence(480, 100), 480);
    }

    #[test]
    fn test_next_occurrence_rolls_to_next_day() {
        assert_eq!(next_occurrence(480, 481), MINUTES_PER_DAY + 480);
    }

    #[test]
    fn test_next_occurrence_negative_start() {
        assert_eq!(next_occurrence(30, -10), 30);
    }

    #[test]
    fn test_hours() {
        assert!((hours(90) - 1.5).abs() < 1e-12);
    }
}
