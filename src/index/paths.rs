//! Connection discovery, path estimation and flight scheduling.

use std::collections::VecDeque;

use super::ProblemIndex;
use crate::model::time::{hours, Minute, CONNECTION_MINUTES};
use crate::model::{
    AirportId, FlightId, Route, Segment, CROSS_CONTINENT_LEG_COST, SAME_CONTINENT_LEG_COST,
};

/// Flat block-time estimate of a same-continent leg.
const SAME_CONTINENT_LEG_HOURS: f64 = 12.0;

/// Flat block-time estimate of a cross-continent leg.
const CROSS_CONTINENT_LEG_HOURS: f64 = 24.0;

/// Rough time and cost of an airport path, before any flight is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEstimate {
    pub hours: f64,
    pub cost: f64,
    pub legs: usize,
}

impl ProblemIndex {
    /// Breadth-first shortest path by number of airports.
    ///
    /// Only operational flights are followed. Returns the airport sequence
    /// including both ends, `[from]` when `from == to`.
    pub fn shortest_path(&self, from: AirportId, to: AirportId) -> Option<Vec<AirportId>> {
        if from == to {
            return Some(vec![from]);
        }
        let n = self.airports.len();
        let mut parent: Vec<Option<AirportId>> = vec![None; n];
        let mut seen = vec![false; n];
        let mut queue = VecDeque::new();
        seen[from.0] = true;
        queue.push_back(from);

        while let Some(at) = queue.pop_front() {
            for &fid in self.outgoing(at) {
                let next = self.flights[fid.0].destination;
                if seen[next.0] {
                    continue;
                }
                seen[next.0] = true;
                parent[next.0] = Some(at);
                if next == to {
                    let mut path = vec![to];
                    let mut cur = to;
                    while let Some(p) = parent[cur.0] {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                queue.push_back(next);
            }
        }
        None
    }

    /// Estimates time and cost of an airport path using flat per-leg
    /// constants and a connection allowance at every layover.
    pub fn estimate_path(&self, path: &[AirportId]) -> PathEstimate {
        let mut estimate = PathEstimate {
            hours: 0.0,
            cost: 0.0,
            legs: path.len().saturating_sub(1),
        };
        for pair in path.windows(2) {
            if self.continent(pair[0]) == self.continent(pair[1]) {
                estimate.hours += SAME_CONTINENT_LEG_HOURS;
                estimate.cost += SAME_CONTINENT_LEG_COST;
            } else {
                estimate.hours += CROSS_CONTINENT_LEG_HOURS;
                estimate.cost += CROSS_CONTINENT_LEG_COST;
            }
        }
        if estimate.legs > 1 {
            estimate.hours += hours(CONNECTION_MINUTES) * (estimate.legs - 1) as f64;
        }
        estimate
    }

    /// Schedules a chain of flights for a unit ready at `ready_at`.
    ///
    /// The first flight leaves at its next instance on or after `ready_at`;
    /// each later flight leaves at least one connection after the previous
    /// arrival. Returns `None` when the chain is broken or uses a cancelled
    /// flight.
    pub fn schedule(&self, flights: &[FlightId], ready_at: Minute) -> Option<Route> {
        let mut segments: Vec<Segment> = Vec::with_capacity(flights.len());
        let mut not_before = ready_at;
        for &fid in flights {
            let flight = self.flight(fid);
            if !flight.is_operational() {
                return None;
            }
            if let Some(prev) = segments.last() {
                if prev.destination != flight.origin {
                    return None;
                }
                not_before = prev.arrival + CONNECTION_MINUTES;
            }
            let departure = flight.next_departure(not_before);
            let duration = flight.duration_minutes();
            segments.push(Segment {
                flight: fid,
                origin: flight.origin,
                destination: flight.destination,
                duration,
                same_continent: self.is_same_continent(fid),
                departure,
                arrival: departure + duration,
            });
        }
        Some(Route::new(segments))
    }
}
