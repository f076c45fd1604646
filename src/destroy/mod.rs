//! Destroy operators.
//!
//! A destroy operator picks up to `count` placed shipments and evicts them:
//! their routes leave the solution, their units are released from the
//! ledger and they join the unassigned set. The partial solution stays in
//! place and the evicted `(shipment, route)` pairs are returned.
//!
//! Every operator tolerates an empty solution (no-op) and never evicts
//! more shipments than are placed. Operators whose qualifying candidate
//! set is too small fall back to [`DestroyOperator::RandomBiased`].
//!
//! # References
//!
//! Shaw (1998), "Using Constraint Programming and Local Search Methods to
//! Solve Vehicle Routing Problems"; Ropke & Pisinger (2006), Section 3.1

mod congestion;
mod geographic;
mod random;
mod similarity;
mod time_window;
mod urgency;

use std::fmt;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::index::ProblemIndex;
use crate::model::{slack_hours, AirportId, Route, ShipmentId, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

pub use similarity::endpoint_similarity;

/// A shipment removed from the solution together with the route it had.
#[derive(Debug, Clone, PartialEq)]
pub struct Eviction {
    pub shipment: ShipmentId,
    pub route: Route,
}

/// Whether a similarity-driven operator always takes the top candidate or
/// samples among good ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    Deterministic,
    Randomized,
}

/// Closed set of destroy operators.
///
/// The controller's weight matrix is indexed by [`position`](Self::position)
/// in the enabled list, so the set of variants is fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DestroyOperator {
    /// Slack-biased removal with a small skip probability.
    RandomBiased,
    /// Shipments passing through the busiest cross-continent hub region.
    Geographic,
    /// The least time-pressured slack tier.
    TimeWindow,
    /// Shipments on flights loaded past the congestion threshold.
    Congestion,
    /// Shaw relatedness removal.
    Similarity(SelectionMode),
    /// The most time-critical shipments.
    Urgency(SelectionMode),
}

impl DestroyOperator {
    pub const ALL: [DestroyOperator; 8] = [
        DestroyOperator::RandomBiased,
        DestroyOperator::Geographic,
        DestroyOperator::TimeWindow,
        DestroyOperator::Congestion,
        DestroyOperator::Similarity(SelectionMode::Deterministic),
        DestroyOperator::Similarity(SelectionMode::Randomized),
        DestroyOperator::Urgency(SelectionMode::Deterministic),
        DestroyOperator::Urgency(SelectionMode::Randomized),
    ];

    pub fn name(self) -> &'static str {
        match self {
            DestroyOperator::RandomBiased => "random-biased",
            DestroyOperator::Geographic => "geographic",
            DestroyOperator::TimeWindow => "time-window",
            DestroyOperator::Congestion => "congestion",
            DestroyOperator::Similarity(SelectionMode::Deterministic) => "shaw",
            DestroyOperator::Similarity(SelectionMode::Randomized) => "shaw-randomized",
            DestroyOperator::Urgency(SelectionMode::Deterministic) => "urgency",
            DestroyOperator::Urgency(SelectionMode::Randomized) => "urgency-randomized",
        }
    }

    /// Chooses which shipments to evict without touching the solution.
    pub fn select<R: Rng>(
        self,
        index: &ProblemIndex,
        solution: &Solution,
        ledger: &ResourceLedger,
        count: usize,
        rng: &mut R,
    ) -> Vec<ShipmentId> {
        let placed = placed_shipments(index, solution);
        let count = count.min(placed.len());
        if count == 0 {
            return Vec::new();
        }
        let picked = match self {
            DestroyOperator::RandomBiased => Some(random::select(&placed, count, rng)),
            DestroyOperator::Geographic => geographic::select(index, &placed, count),
            DestroyOperator::TimeWindow => time_window::select(&placed, count, rng),
            DestroyOperator::Congestion => congestion::select(index, ledger, &placed, count),
            DestroyOperator::Similarity(mode) => {
                Some(similarity::select(index, &placed, count, mode, rng))
            }
            DestroyOperator::Urgency(mode) => Some(urgency::select(index, &placed, count, mode, rng)),
        };
        match picked {
            Some(ids) => ids,
            None => {
                tracing::trace!(operator = self.name(), "falling back to random-biased removal");
                random::select(&placed, count, rng)
            }
        }
    }

    /// Evicts up to `count` shipments, releasing their resources.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_airfreight::destroy::DestroyOperator;
    /// use u_airfreight::index::ProblemIndex;
    /// use u_airfreight::model::{Airport, AirportId, Continent, Flight, FlightId, ShipmentId, ShipmentUnit};
    /// use u_airfreight::random::create_rng;
    /// use u_airfreight::solution::{ResourceLedger, Solution};
    ///
    /// let index = ProblemIndex::new(
    ///     vec![
    ///         Airport::new("A", Continent::Europe, 10).as_depot(),
    ///         Airport::new("B", Continent::Europe, 10),
    ///     ],
    ///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 5)],
    ///     (0..3).map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(1)).with_window(0, 2880)).collect(),
    /// ).unwrap();
    /// let mut sol = Solution::unassigned_from(&index);
    /// for i in 0..3 {
    ///     sol.assign(ShipmentId(i), index.schedule(&[FlightId(0)], 0).unwrap());
    /// }
    /// let mut ledger = ResourceLedger::from_solution(&index, &sol, false);
    ///
    /// let evicted = DestroyOperator::RandomBiased.destroy(&index, &mut sol, &mut ledger, 2, &mut create_rng(1));
    /// assert_eq!(evicted.len(), 2);
    /// assert_eq!(sol.assigned_len() + evicted.len(), 3);
    /// assert_eq!(ledger.flight_reserved(FlightId(0)), 1);
    /// ```
    pub fn destroy<R: Rng>(
        self,
        index: &ProblemIndex,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        count: usize,
        rng: &mut R,
    ) -> Vec<Eviction> {
        let ids = self.select(index, solution, ledger, count, rng);
        evict(index, solution, ledger, &ids)
    }

    /// Index of this operator in `enabled`, if present.
    pub fn position(self, enabled: &[DestroyOperator]) -> Option<usize> {
        enabled.iter().position(|&op| op == self)
    }
}

impl fmt::Display for DestroyOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Removes `ids` from `solution`, releasing their ledger bookings.
///
/// Ids that are not placed are skipped.
pub fn evict(
    index: &ProblemIndex,
    solution: &mut Solution,
    ledger: &mut ResourceLedger,
    ids: &[ShipmentId],
) -> Vec<Eviction> {
    let mut evicted = Vec::with_capacity(ids.len());
    for &id in ids {
        let Some(route) = solution.unassign(id) else {
            continue;
        };
        if let Some(unit) = index.shipment(id) {
            ledger.release(unit, &route);
        }
        evicted.push(Eviction { shipment: id, route });
    }
    evicted
}

/// A placed shipment with its route and precomputed slack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Placed<'a> {
    pub id: ShipmentId,
    pub unit: &'a ShipmentUnit,
    pub route: &'a Route,
    pub slack: f64,
}

impl Placed<'_> {
    /// Already at its destination: an empty route frees no capacity.
    pub fn is_delivered(&self) -> bool {
        self.route.is_empty()
    }

    /// Airport the shipment leaves from, falling back to its destination
    /// for empty routes without a fixed start.
    pub fn origin(&self) -> AirportId {
        self.route
            .origin()
            .or(self.unit.start())
            .unwrap_or(self.unit.destination)
    }
}

/// Placed shipments known to the index, in shipment id order.
pub(crate) fn placed_shipments<'a>(
    index: &'a ProblemIndex,
    solution: &'a Solution,
) -> Vec<Placed<'a>> {
    solution
        .routes()
        .iter()
        .filter_map(|(&id, route)| {
            let unit = index.shipment(id)?;
            Some(Placed {
                id,
                unit,
                route,
                slack: slack_hours(unit, route),
            })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::index::fixtures::*;
    use crate::random::create_rng;

    #[test]
    fn test_every_operator_conserves_shipments() {
        let index = index(50, 12);
        for op in DestroyOperator::ALL {
            for count in [0, 1, 5, 12, 30] {
                let (mut sol, mut ledger) = placed(&index);
                let mut rng = create_rng(count as u64);
                let evicted = op.destroy(&index, &mut sol, &mut ledger, count, &mut rng);
                assert_eq!(evicted.len(), count.min(12), "{op} with count {count}");
                assert_eq!(sol.assigned_len() + evicted.len(), 12);
                assert_eq!(sol.unassigned_len(), evicted.len());
                assert_eq!(ledger, ResourceLedger::from_solution(&index, &sol, true));
            }
        }
    }

    #[test]
    fn test_empty_solution_is_noop() {
        let index = index(50, 4);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, false);
        let mut rng = create_rng(0);
        for op in DestroyOperator::ALL {
            assert!(op
                .destroy(&index, &mut sol, &mut ledger, 3, &mut rng)
                .is_empty());
        }
        assert_eq!(sol.unassigned_len(), 4);
    }

    #[test]
    fn test_evicted_are_distinct() {
        let index = index(50, 10);
        for op in DestroyOperator::ALL {
            let (sol, ledger) = placed(&index);
            let mut picked = op.select(&index, &sol, &ledger, 6, &mut create_rng(9));
            picked.sort();
            picked.dedup();
            assert_eq!(picked.len(), 6, "{op}");
        }
    }

    #[test]
    fn test_evict_skips_unplaced() {
        let index = index(50, 2);
        let (mut sol, mut ledger) = placed(&index);
        let out = evict(&index, &mut sol, &mut ledger, &[ShipmentId(0), ShipmentId(0), ShipmentId(7)]);
        assert_eq!(out.len(), 1);
        assert_eq!(sol.unassigned_len(), 1);
    }

    #[test]
    fn test_names_unique() {
        let mut names: Vec<_> = DestroyOperator::ALL.iter().map(|op| op.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), DestroyOperator::ALL.len());
        assert_eq!(
            DestroyOperator::TimeWindow.position(&DestroyOperator::ALL),
            Some(2)
        );
    }
}
