//! Multi-depot insertion and initial construction.
//!
//! For each pending unit every eligible origin contributes its direct and
//! one-stop routes plus the earliest schedule along the breadth-first
//! shortest airport path. Feasible options are ranked by a weighted blend
//! of transit time, hops, continent change and leg cost, and one of the
//! top three is drawn.

use rand::seq::SliceRandom;
use rand::Rng;

use super::candidates::{candidate_routes, earliest_chain, routes_from, MAX_LEGS};
use super::{deadline_key, RepairContext};
use crate::model::{Route, ShipmentUnit};
use crate::ranking::{Composition, RankRule, Ranker};
use crate::solution::{ResourceLedger, Solution};

/// Probability of taking the best-ranked option.
const BEST_PROBABILITY: f64 = 0.6;

/// Options the draw chooses among.
const TOP_OPTIONS: usize = 3;

/// Scored feature vector of one feasible route.
struct DepotOption {
    route: Route,
    /// Transit over the continent promise.
    time: f64,
    /// Flights over the leg limit.
    hops: f64,
    /// 1 when the route starts on another continent.
    continent_change: f64,
    /// Leg cost over the costliest option of the unit.
    cost: f64,
}

struct Time;

impl RankRule<DepotOption, ()> for Time {
    fn name(&self) -> &str {
        "time"
    }
    fn score(&self, o: &DepotOption, _: &()) -> f64 {
        o.time
    }
}

struct Hops;

impl RankRule<DepotOption, ()> for Hops {
    fn name(&self) -> &str {
        "hops"
    }
    fn score(&self, o: &DepotOption, _: &()) -> f64 {
        o.hops
    }
}

struct ContinentChange;

impl RankRule<DepotOption, ()> for ContinentChange {
    fn name(&self) -> &str {
        "continent-change"
    }
    fn score(&self, o: &DepotOption, _: &()) -> f64 {
        o.continent_change
    }
}

struct Cost;

impl RankRule<DepotOption, ()> for Cost {
    fn name(&self) -> &str {
        "cost"
    }
    fn score(&self, o: &DepotOption, _: &()) -> f64 {
        o.cost
    }
}

fn depot_ranker() -> Ranker<DepotOption, ()> {
    Ranker::new()
        .with_composition(Composition::Weighted)
        .with_weighted_rule(Time, 0.4)
        .with_weighted_rule(Hops, 0.3)
        .with_weighted_rule(ContinentChange, 0.2)
        .with_weighted_rule(Cost, 0.1)
}

/// Feasible routes for `unit` over every eligible origin, deduplicated.
fn feasible_options(
    ctx: &RepairContext<'_>,
    ledger: &ResourceLedger,
    unit: &ShipmentUnit,
) -> Vec<DepotOption> {
    let index = ctx.index;
    let mut routes: Vec<Route> = Vec::new();
    for origin in index.eligible_origins(unit) {
        for legs in 0..=2 {
            routes.extend(routes_from(index, unit, origin, legs));
        }
        if let Some(path) = index.shortest_path(origin, unit.destination) {
            if path.len() > 1 {
                routes.extend(earliest_chain(index, unit, &path));
            }
        }
    }

    let mut unique: Vec<Route> = Vec::with_capacity(routes.len());
    for route in routes {
        if !unique.contains(&route) && ctx.checker.check_unit(unit, &route, ledger).is_ok() {
            unique.push(route);
        }
    }

    let max_cost = unique.iter().map(Route::cost).fold(0.0, f64::max);
    unique
        .into_iter()
        .map(|route| {
            let (time, continent_change) = match route.origin() {
                Some(origin) => (
                    route.transit_hours() / index.promise_hours(origin, unit.destination),
                    if index.continent(origin) == index.continent(unit.destination) {
                        0.0
                    } else {
                        1.0
                    },
                ),
                None => (0.0, 0.0),
            };
            let cost = if max_cost > 0.0 {
                route.cost() / max_cost
            } else {
                0.0
            };
            DepotOption {
                time,
                hops: route.hops() as f64 / MAX_LEGS as f64,
                continent_change,
                cost,
                route,
            }
        })
        .collect()
}

/// Earliest deadline first; each unit draws among its top-ranked depot
/// options.
pub(super) fn repair<R: Rng>(
    ctx: &RepairContext<'_>,
    solution: &mut Solution,
    ledger: &mut ResourceLedger,
    rng: &mut R,
) {
    let ranker = depot_ranker();
    let mut pending = ctx.pending(solution);
    pending.sort_by_key(|u| deadline_key(u));
    for unit in pending {
        let options = feasible_options(ctx, ledger, unit);
        let order = ranker.order(&options, &());
        let top = order.len().min(TOP_OPTIONS);
        let pick = match top {
            0 => continue,
            1 => order[0],
            _ if rng.random_bool(BEST_PROBABILITY) => order[0],
            _ => order[rng.random_range(1..top)],
        };
        ctx.try_commit(solution, ledger, unit, &options[pick].route);
    }
}

/// Builds an initial solution from scratch with multi-depot insertion.
///
/// # Examples
///
/// ```
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
/// use u_airfreight::random::create_rng;
/// use u_airfreight::repair::{construct, RepairContext};
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 10).as_depot(),
///         Airport::new("B", Continent::Europe, 10),
///     ],
///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 5)],
///     (0..3).map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(1)).with_window(0, 2880)).collect(),
/// ).unwrap();
/// let ctx = RepairContext::new(&index, true, 3);
/// let (solution, _ledger) = construct(&ctx, &mut create_rng(0));
/// assert_eq!(solution.assigned_len(), 3);
/// ```
pub fn construct<R: Rng>(ctx: &RepairContext<'_>, rng: &mut R) -> (Solution, ResourceLedger) {
    let mut solution = Solution::unassigned_from(ctx.index);
    let mut ledger = ResourceLedger::new(ctx.index, ctx.checker.is_temporal());
    repair(ctx, &mut solution, &mut ledger, rng);
    (solution, ledger)
}

/// Builds an initial solution by placing units in random order on a
/// random feasible candidate route.
pub fn construct_randomized<R: Rng>(
    ctx: &RepairContext<'_>,
    rng: &mut R,
) -> (Solution, ResourceLedger) {
    let mut solution = Solution::unassigned_from(ctx.index);
    let mut ledger = ResourceLedger::new(ctx.index, ctx.checker.is_temporal());
    let mut pending = ctx.pending(&solution);
    pending.shuffle(rng);
    for unit in pending {
        let mut routes = candidate_routes(ctx.index, unit, MAX_LEGS);
        routes.shuffle(rng);
        ctx.commit_first(&mut solution, &mut ledger, unit, &routes);
    }
    (solution, ledger)
}
