//! Fallback repair for shipments that keep failing.
//!
//! Standard operators place shipments in bulk and give up on anything
//! that does not fit. Units that stay unassigned over several iterations
//! are handed here, hardest first, and tried with a sequence of
//! progressively more invasive strategies. Successful strategies are
//! remembered per shipment and replayed first next time.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::candidates::{candidate_routes, routes_with_legs, MAX_LEGS};
use super::RepairContext;
use crate::index::ProblemIndex;
use crate::model::{Route, ShipmentId, ShipmentUnit};
use crate::ranking::{Composition, RankRule, Ranker};
use crate::solution::{ResourceLedger, Solution};

/// Highest pre-insertion load a flight may carry under normal strategies.
const NORMAL_UTILIZATION: f64 = 0.85;

/// Highest pre-insertion load accepted by the relaxed pass.
const RELAXED_UTILIZATION: f64 = 0.95;

/// Eviction attempts per shipment in the swap strategy.
const MAX_SWAP_ATTEMPTS: usize = 10;

/// Insertion strategies, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Strategy {
    /// Direct flight (or already at the destination).
    Direct,
    /// Two or three flights.
    MultiHop,
    /// Relocate a placed shipment that blocks a full flight.
    Swap,
    /// Direct and multi-hop with a higher load ceiling.
    Relaxed,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Direct,
        Strategy::MultiHop,
        Strategy::Swap,
        Strategy::Relaxed,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Direct => "direct",
            Strategy::MultiHop => "multi-hop",
            Strategy::Swap => "swap",
            Strategy::Relaxed => "relaxed",
        };
        f.write_str(name)
    }
}

/// Per-shipment insertion history kept across iterations of one run.
#[derive(Debug, Clone, Default)]
pub struct RepairMemory {
    failures: HashMap<ShipmentId, u32>,
    successes: HashMap<ShipmentId, Vec<Strategy>>,
}

impl RepairMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, id: ShipmentId) {
        *self.failures.entry(id).or_insert(0) += 1;
    }

    /// Remembers the strategy and clears the failure count.
    pub fn record_success(&mut self, id: ShipmentId, strategy: Strategy) {
        self.failures.remove(&id);
        let known = self.successes.entry(id).or_default();
        if !known.contains(&strategy) {
            known.push(strategy);
        }
    }

    pub fn failures(&self, id: ShipmentId) -> u32 {
        self.failures.get(&id).copied().unwrap_or(0)
    }

    /// Strategies that placed `id` before, oldest first.
    pub fn strategies(&self, id: ShipmentId) -> &[Strategy] {
        self.successes.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Shipments with at least `threshold` failures.
    pub fn struggling(&self, threshold: u32) -> impl Iterator<Item = ShipmentId> + '_ {
        self.failures
            .iter()
            .filter(move |(_, n)| **n >= threshold)
            .map(|(&id, _)| id)
    }
}

struct Difficulty<'a> {
    unit: &'a ShipmentUnit,
    failures: f64,
    /// Great-circle km from the nearest eligible origin, in thousands.
    distance: f64,
    /// Direct flights from eligible origins to the destination.
    directs: usize,
}

struct FailureHistory;

impl RankRule<Difficulty<'_>, ()> for FailureHistory {
    fn name(&self) -> &str {
        "failure-history"
    }
    fn score(&self, d: &Difficulty<'_>, _: &()) -> f64 {
        -(d.failures / (1.0 + d.failures))
    }
}

struct Distance;

impl RankRule<Difficulty<'_>, ()> for Distance {
    fn name(&self) -> &str {
        "distance"
    }
    fn score(&self, d: &Difficulty<'_>, _: &()) -> f64 {
        -(d.distance / (1.0 + d.distance))
    }
}

struct DirectScarcity;

impl RankRule<Difficulty<'_>, ()> for DirectScarcity {
    fn name(&self) -> &str {
        "direct-scarcity"
    }
    fn score(&self, d: &Difficulty<'_>, _: &()) -> f64 {
        -1.0 / (1.0 + d.directs as f64)
    }
}

struct PriorityFirst;

impl RankRule<Difficulty<'_>, ()> for PriorityFirst {
    fn name(&self) -> &str {
        "priority"
    }
    fn score(&self, d: &Difficulty<'_>, _: &()) -> f64 {
        -d.unit.priority.weight()
    }
}

fn difficulty<'a>(
    index: &ProblemIndex,
    memory: &RepairMemory,
    unit: &'a ShipmentUnit,
) -> Difficulty<'a> {
    let origins = index.eligible_origins(unit);
    let distance = origins
        .iter()
        .map(|&o| index.distance_km(o, unit.destination))
        .fold(f64::INFINITY, f64::min);
    Difficulty {
        unit,
        failures: memory.failures(unit.id) as f64,
        distance: if distance.is_finite() { distance / 1000.0 } else { 0.0 },
        directs: origins
            .iter()
            .map(|&o| index.direct_flights(o, unit.destination).count())
            .sum(),
    }
}

/// Hardest-first fallback insertion.
///
/// # Examples
///
/// ```
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
/// use u_airfreight::random::create_rng;
/// use u_airfreight::repair::{IntelligentRepair, RepairContext, RepairMemory};
/// use u_airfreight::solution::{ResourceLedger, Solution};
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 10).as_depot(),
///         Airport::new("B", Continent::Europe, 10),
///     ],
///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 5)],
///     vec![ShipmentUnit::new(ShipmentId(0), AirportId(1)).with_window(0, 2880)],
/// ).unwrap();
/// let ctx = RepairContext::new(&index, false, 3);
/// let mut memory = RepairMemory::new();
/// for _ in 0..3 {
///     memory.record_failure(ShipmentId(0));
/// }
/// let mut sol = Solution::unassigned_from(&index);
/// let mut ledger = ResourceLedger::new(&index, false);
///
/// let placed = IntelligentRepair::new(3).repair(&ctx, &mut memory, &mut sol, &mut ledger, &mut create_rng(0));
/// assert_eq!(placed, vec![ShipmentId(0)]);
/// assert_eq!(memory.failures(ShipmentId(0)), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntelligentRepair {
    /// Failures before a shipment is handed to this repair.
    pub failure_threshold: u32,
    /// Failures before the relaxed pass is allowed.
    pub relaxed_after: u32,
}

impl Default for IntelligentRepair {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            relaxed_after: 5,
        }
    }
}

impl IntelligentRepair {
    pub fn new(failure_threshold: u32) -> Self {
        Self {
            failure_threshold,
            ..Self::default()
        }
    }

    pub fn with_relaxed_after(mut self, failures: u32) -> Self {
        self.relaxed_after = failures;
        self
    }

    /// Tries every unassigned shipment with enough failures and returns
    /// the ones it placed.
    ///
    /// Units that stay unassigned get one more failure recorded.
    pub fn repair<R: Rng>(
        &self,
        ctx: &RepairContext<'_>,
        memory: &mut RepairMemory,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        rng: &mut R,
    ) -> Vec<ShipmentId> {
        let targets: Vec<Difficulty<'_>> = ctx
            .pending(solution)
            .into_iter()
            .filter(|u| memory.failures(u.id) >= self.failure_threshold)
            .map(|u| difficulty(ctx.index, memory, u))
            .collect();
        if targets.is_empty() {
            return Vec::new();
        }

        let ranker: Ranker<Difficulty<'_>, ()> = Ranker::new()
            .with_composition(Composition::Weighted)
            .with_weighted_rule(FailureHistory, 0.4)
            .with_weighted_rule(Distance, 0.2)
            .with_weighted_rule(DirectScarcity, 0.2)
            .with_weighted_rule(PriorityFirst, 0.2);

        let mut placed = Vec::new();
        for i in ranker.order(&targets, &()) {
            let unit = targets[i].unit;
            match self.place(ctx, memory, solution, ledger, unit, rng) {
                Some(strategy) => {
                    tracing::trace!(shipment = %unit.id, %strategy, "fallback insertion");
                    memory.record_success(unit.id, strategy);
                    placed.push(unit.id);
                }
                None => memory.record_failure(unit.id),
            }
        }
        placed
    }

    fn place<R: Rng>(
        &self,
        ctx: &RepairContext<'_>,
        memory: &RepairMemory,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        unit: &ShipmentUnit,
        rng: &mut R,
    ) -> Option<Strategy> {
        let relaxed = memory.failures(unit.id) >= self.relaxed_after;
        let replay = memory.strategies(unit.id).iter().copied();
        let order: Vec<Strategy> = replay.chain(Strategy::ALL).collect();
        let mut tried = Vec::with_capacity(Strategy::ALL.len());
        for strategy in order {
            if tried.contains(&strategy) || (strategy == Strategy::Relaxed && !relaxed) {
                continue;
            }
            tried.push(strategy);
            if self.attempt(ctx, solution, ledger, unit, strategy, rng) {
                return Some(strategy);
            }
        }
        None
    }

    fn attempt<R: Rng>(
        &self,
        ctx: &RepairContext<'_>,
        solution: &mut Solution,
        ledger: &mut ResourceLedger,
        unit: &ShipmentUnit,
        strategy: Strategy,
        rng: &mut R,
    ) -> bool {
        let index = ctx.index;
        match strategy {
            Strategy::Direct => {
                let routes = [0, 1].map(|legs| routes_with_legs(index, unit, legs));
                let routes = routes.iter().flatten();
                commit_below(ctx, solution, ledger, unit, routes, NORMAL_UTILIZATION)
            }
            Strategy::MultiHop => {
                let routes = [2, 3].map(|legs| routes_with_legs(index, unit, legs));
                let routes = routes.iter().flatten();
                commit_below(ctx, solution, ledger, unit, routes, NORMAL_UTILIZATION)
            }
            Strategy::Swap => try_swap(ctx, solution, ledger, unit, rng),
            Strategy::Relaxed => {
                let routes = candidate_routes(index, unit, MAX_LEGS);
                commit_below(ctx, solution, ledger, unit, &routes, RELAXED_UTILIZATION)
            }
        }
    }
}

/// Commits the first feasible route whose flights are all at most
/// `ceiling` loaded before insertion.
fn commit_below<'r>(
    ctx: &RepairContext<'_>,
    solution: &mut Solution,
    ledger: &mut ResourceLedger,
    unit: &ShipmentUnit,
    routes: impl IntoIterator<Item = &'r Route>,
    ceiling: f64,
) -> bool {
    routes.into_iter().any(|route| {
        route.flights().all(|f| ledger.utilization(ctx.index, f) <= ceiling)
            && ctx.try_commit(solution, ledger, unit, route)
    })
}

/// Frees a seat on a full flight by relocating one of its shipments.
///
/// The unit takes the freed route and the evicted shipment must find
/// another one; otherwise both moves are undone.
fn try_swap<R: Rng>(
    ctx: &RepairContext<'_>,
    solution: &mut Solution,
    ledger: &mut ResourceLedger,
    unit: &ShipmentUnit,
    rng: &mut R,
) -> bool {
    let index = ctx.index;
    let routes: Vec<Route> = candidate_routes(index, unit, 2)
        .into_iter()
        .filter(|r| ctx.checker.check_route_rules(unit, r).is_ok())
        .collect();

    let mut attempts = 0;
    for route in &routes {
        for flight in route.flights() {
            if ledger.flight_spare(index, flight) >= unit.items {
                continue;
            }
            let mut blockers: Vec<ShipmentId> = solution
                .routes()
                .iter()
                .filter(|(_, r)| r.uses_flight(flight))
                .map(|(&id, _)| id)
                .collect();
            if blockers.len() > 1 {
                let first = rng.random_range(0..blockers.len());
                blockers.rotate_left(first);
            }
            for other_id in blockers {
                if attempts >= MAX_SWAP_ATTEMPTS {
                    return false;
                }
                attempts += 1;
                let Some(other) = index.shipment(other_id) else {
                    continue;
                };
                let checkpoint = ledger.checkpoint();
                let Some(old) = solution.unassign(other_id) else {
                    continue;
                };
                ledger.release(other, &old);
                if ctx.try_commit(solution, ledger, unit, route) {
                    let alternatives = candidate_routes(index, other, MAX_LEGS);
                    let others = alternatives.iter().filter(|r| **r != old);
                    if ctx.commit_first(solution, ledger, other, others) {
                        return true;
                    }
                    solution.unassign(unit.id);
                }
                ledger.restore(checkpoint);
                solution.assign(other_id, old);
            }
        }
    }
    false
}
