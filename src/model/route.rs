//! Itineraries: ordered flight segments carrying one shipment unit.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ids::{AirportId, FlightId};
use super::time::{hours, Minute, CONNECTION_MINUTES};

/// Flat cost of a leg that stays within one continent.
pub const SAME_CONTINENT_LEG_COST: f64 = 1.0;

/// Flat cost of a leg that crosses continents.
pub const CROSS_CONTINENT_LEG_COST: f64 = 2.5;

/// One flight taken by a shipment, with its scheduled instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub flight: FlightId,
    pub origin: AirportId,
    pub destination: AirportId,
    /// Block time in minutes.
    pub duration: i64,
    pub same_continent: bool,
    /// Actual departure of the instance taken.
    pub departure: Minute,
    /// Actual arrival of the instance taken.
    pub arrival: Minute,
}

impl Segment {
    pub fn cost(&self) -> f64 {
        if self.same_continent {
            SAME_CONTINENT_LEG_COST
        } else {
            CROSS_CONTINENT_LEG_COST
        }
    }
}

/// Ordered segments from a shipment's start airport to its destination.
///
/// An empty route means the unit already sits at its destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    segments: Vec<Segment>,
}

impl Route {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of flights taken.
    pub fn hops(&self) -> usize {
        self.segments.len()
    }

    pub fn flights(&self) -> impl Iterator<Item = FlightId> + '_ {
        self.segments.iter().map(|s| s.flight)
    }

    pub fn origin(&self) -> Option<AirportId> {
        self.segments.first().map(|s| s.origin)
    }

    pub fn destination(&self) -> Option<AirportId> {
        self.segments.last().map(|s| s.destination)
    }

    pub fn departure(&self) -> Option<Minute> {
        self.segments.first().map(|s| s.departure)
    }

    pub fn arrival(&self) -> Option<Minute> {
        self.segments.last().map(|s| s.arrival)
    }

    /// Airports visited in order, start included.
    pub fn airports(&self) -> Vec<AirportId> {
        let mut path = Vec::with_capacity(self.segments.len() + 1);
        if let Some(first) = self.segments.first() {
            path.push(first.origin);
        }
        path.extend(self.segments.iter().map(|s| s.destination));
        path
    }

    pub fn touches(&self, airport: AirportId) -> bool {
        self.segments
            .iter()
            .any(|s| s.origin == airport || s.destination == airport)
    }

    pub fn uses_flight(&self, flight: FlightId) -> bool {
        self.segments.iter().any(|s| s.flight == flight)
    }

    pub fn is_cross_continent(&self) -> bool {
        self.segments.iter().any(|s| !s.same_continent)
    }

    /// Transit time: block times plus one connection per layover.
    pub fn transit_minutes(&self) -> i64 {
        if self.segments.is_empty() {
            return 0;
        }
        let flying: i64 = self.segments.iter().map(|s| s.duration).sum();
        flying + CONNECTION_MINUTES * (self.segments.len() as i64 - 1)
    }

    pub fn transit_hours(&self) -> f64 {
        hours(self.transit_minutes())
    }

    pub fn cost(&self) -> f64 {
        self.segments.iter().map(Segment::cost).sum()
    }
}
