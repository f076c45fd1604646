//! Daily scheduled cargo flights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ids::AirportId;
use super::time::{next_occurrence, Minute, MINUTES_PER_DAY};

/// Operational state of a flight, set by the host before a solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FlightStatus {
    #[default]
    Scheduled,
    /// Departs and arrives `minutes` later than scheduled.
    Delayed { minutes: u32 },
    /// Removed from the network.
    Cancelled,
}

/// A flight that operates every day at the same local minute.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::{AirportId, Flight};
///
/// // 22:00 → 06:30 next day
/// let f = Flight::new("LA2470", AirportId(0), AirportId(1), 1320, 390, 300);
/// assert_eq!(f.duration_minutes(), 510);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flight {
    pub code: String,
    pub origin: AirportId,
    pub destination: AirportId,
    /// Scheduled departure, minute of day.
    pub departure: u32,
    /// Scheduled arrival, minute of day (may be on the following day).
    pub arrival: u32,
    /// Maximum units on board.
    pub capacity: u32,
    pub status: FlightStatus,
}

impl Flight {
    pub fn new(
        code: impl Into<String>,
        origin: AirportId,
        destination: AirportId,
        departure: u32,
        arrival: u32,
        capacity: u32,
    ) -> Self {
        Self {
            code: code.into(),
            origin,
            destination,
            departure,
            arrival,
            capacity,
            status: FlightStatus::Scheduled,
        }
    }

    pub fn with_status(mut self, status: FlightStatus) -> Self {
        self.status = status;
        self
    }

    /// Block time in minutes. Equal departure and arrival minutes mean a
    /// full day in the air.
    pub fn duration_minutes(&self) -> i64 {
        let d = (self.arrival as i64 - self.departure as i64).rem_euclid(MINUTES_PER_DAY);
        if d == 0 {
            MINUTES_PER_DAY
        } else {
            d
        }
    }

    pub fn is_operational(&self) -> bool {
        self.status != FlightStatus::Cancelled
    }

    /// Delay applied to every daily instance.
    pub fn delay_minutes(&self) -> i64 {
        match self.status {
            FlightStatus::Delayed { minutes } => minutes as i64,
            _ => 0,
        }
    }

    /// Actual departure of the first daily instance leaving at or after
    /// `not_before`, delays included.
    pub fn next_departure(&self, not_before: Minute) -> Minute {
        let delay = self.delay_minutes();
        next_occurrence(self.departure as i64, not_before - delay) + delay
    }
}
