//! Repair and construction operators.
//!
//! A repair operator walks the solution's unassigned set and commits every
//! shipment it can place. A route is committed only after the
//! [`FeasibilityChecker`] accepts it against the current ledger; the
//! ledger is updated on every commit so later insertions see the capacity
//! already taken. Shipments that cannot be placed stay unassigned.
//!
//! [`IntelligentRepair`] is not part of the adaptive portfolio: the
//! controller runs it as a fallback on shipments that keep failing.
//!
//! # References
//!
//! Ropke & Pisinger (2006), Section 3.2 (greedy and regret-k insertion)

mod candidates;
mod capacity;
mod greedy;
mod intelligent;
mod multi_depot;
mod regret;
mod time_based;

use std::fmt;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::feasibility::FeasibilityChecker;
use crate::index::ProblemIndex;
use crate::model::{Route, ShipmentId, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

pub use candidates::{
    candidate_routes, earliest_chain, route_km, routes_from, routes_with_legs, MAX_LEGS,
};
pub use intelligent::{IntelligentRepair, RepairMemory, Strategy};
pub use multi_depot::{construct, construct_randomized};

/// Read-only state shared by repair operators during one run.
#[derive(Debug, Clone, Copy)]
pub struct RepairContext<'a> {
    pub index: &'a ProblemIndex,
    pub checker: FeasibilityChecker<'a>,
    /// Options compared by regret insertion.
    pub regret_k: usize,
}

impl<'a> RepairContext<'a> {
    pub fn new(index: &'a ProblemIndex, temporal: bool, regret_k: usize) -> Self {
        Self {
            index,
            checker: FeasibilityChecker::new(index, temporal),
            regret_k: regret_k.max(2),
        }
    }

    /// Commits `route` for `unit` if the checker accepts it.
    pub fn try_commit(
        &self,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        unit: &ShipmentUnit,
        route: &Route,
    ) -> bool {
        if self.checker.check_unit(unit, route, ledger).is_err() {
            return false;
        }
        ledger.reserve(unit, route);
        solution.assign(unit.id, route.clone());
        true
    }

    /// Commits the first feasible route of `routes`.
    pub fn commit_first<'r>(
        &self,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        unit: &ShipmentUnit,
        routes: impl IntoIterator<Item = &'r Route>,
    ) -> bool {
        routes
            .into_iter()
            .any(|route| self.try_commit(solution, ledger, unit, route))
    }

    /// Unassigned shipments known to the index, in id order.
    pub(crate) fn pending(&self, solution: &Solution) -> Vec<&'a ShipmentUnit> {
        solution
            .unassigned()
            .iter()
            .filter_map(|&id| self.index.shipment(id))
            .collect()
    }
}

/// Closed set of repair operators in the adaptive portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RepairOperator {
    /// Earliest deadline first, fewest connections first.
    Greedy,
    /// Hardest-to-place first by regret over the k best options.
    Regret,
    /// Tightest deadline first into the route with most slack.
    TimeBased,
    /// Largest first into the route with most spare capacity.
    CapacityBased,
    /// Depot choice by a weighted blend with randomized top-3 pick.
    MultiDepot,
}

impl RepairOperator {
    pub const ALL: [RepairOperator; 5] = [
        RepairOperator::Greedy,
        RepairOperator::Regret,
        RepairOperator::TimeBased,
        RepairOperator::CapacityBased,
        RepairOperator::MultiDepot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RepairOperator::Greedy => "greedy",
            RepairOperator::Regret => "regret",
            RepairOperator::TimeBased => "time-based",
            RepairOperator::CapacityBased => "capacity-based",
            RepairOperator::MultiDepot => "multi-depot",
        }
    }

    /// Inserts what it can and returns the shipments still unassigned.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_airfreight::index::ProblemIndex;
    /// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
    /// use u_airfreight::random::create_rng;
    /// use u_airfreight::repair::{RepairContext, RepairOperator};
    /// use u_airfreight::solution::{ResourceLedger, Solution};
    ///
    /// let index = ProblemIndex::new(
    ///     vec![
    ///         Airport::new("A", Continent::Europe, 10).as_depot(),
    ///         Airport::new("B", Continent::Europe, 10),
    ///     ],
    ///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 2)],
    ///     (0..3).map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(1)).with_window(0, 2880)).collect(),
    /// ).unwrap();
    /// let ctx = RepairContext::new(&index, true, 3);
    /// let mut sol = Solution::unassigned_from(&index);
    /// let mut ledger = ResourceLedger::new(&index, true);
    ///
    /// let left = RepairOperator::Greedy.repair(&ctx, &mut sol, &mut ledger, &mut create_rng(0));
    /// assert_eq!(sol.assigned_len(), 2);
    /// assert_eq!(left, vec![ShipmentId(2)]);
    /// ```
    pub fn repair<R: Rng>(
        self,
        ctx: &RepairContext<'_>,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Vec<ShipmentId> {
        match self {
            RepairOperator::Greedy => greedy::repair(ctx, solution, ledger),
            RepairOperator::Regret => regret::repair(ctx, solution, ledger),
            RepairOperator::TimeBased => time_based::repair(ctx, solution, ledger),
            RepairOperator::CapacityBased => capacity::repair(ctx, solution, ledger),
            RepairOperator::MultiDepot => multi_depot::repair(ctx, solution, ledger, rng),
        }
        solution.unassigned().iter().copied().collect()
    }

    pub fn position(self, enabled: &[RepairOperator]) -> Option<usize> {
        enabled.iter().position(|&op| op == self)
    }
}

impl fmt::Display for RepairOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Deadline ordering key; units without a deadline sort last.
pub(crate) fn deadline_key(unit: &ShipmentUnit) -> (i64, ShipmentId) {
    (unit.deadline.unwrap_or(i64::MAX), unit.id)
}
