//! Regret-k insertion.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::candidates::{candidate_routes, route_km};
use super::RepairContext;
use crate::index::ProblemIndex;
use crate::model::{AirportId, Route, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

/// Regret charged for every missing option among the k best.
pub(crate) const MISSING_OPTION_PENALTY: f64 = 10_000.0;

/// Options considered: direct and one-stop.
const OPTION_LEGS: usize = 2;

/// Insertion cost of a route: distance in hundreds of km plus transit
/// hours.
pub(crate) fn option_cost(index: &ProblemIndex, route: &Route) -> f64 {
    route_km(index, route) / 100.0 + route.transit_hours()
}

/// `Σ_{j=2..k} (c_j − c_1)` over ascending `costs`, with a penalty for
/// each missing option.
pub(crate) fn regret_value(costs: &[f64], k: usize) -> f64 {
    let Some(&best) = costs.first() else {
        return 0.0;
    };
    (1..k)
        .map(|j| match costs.get(j) {
            Some(&c) => c - best,
            None => MISSING_OPTION_PENALTY,
        })
        .sum()
}

struct Options<'a> {
    unit: &'a ShipmentUnit,
    /// Ascending by cost.
    routes: Vec<(Route, f64)>,
    /// Positions in `routes` that still pass the checker, ascending by cost.
    feasible: Vec<usize>,
}

impl Options<'_> {
    /// Drops options the ledger no longer admits. Commits only consume
    /// capacity, so an option once rejected never comes back.
    fn refresh(&mut self, ctx: &RepairContext<'_>, ledger: &ResourceLedger) {
        let unit = self.unit;
        let routes = &self.routes;
        self.feasible
            .retain(|&i| ctx.checker.check_unit(unit, &routes[i].0, ledger).is_ok());
    }

    fn regret(&self, k: usize) -> f64 {
        let costs: Vec<f64> = self
            .feasible
            .iter()
            .take(k)
            .map(|&i| self.routes[i].1)
            .collect();
        regret_value(&costs, k)
    }

    /// Some feasible option shares an airport with `touched`.
    fn touches_any(&self, touched: &[AirportId]) -> bool {
        self.feasible
            .iter()
            .any(|&i| touched.iter().any(|&a| self.routes[i].0.touches(a)))
    }
}

fn options_for<'a>(index: &ProblemIndex, unit: &'a ShipmentUnit) -> Options<'a> {
    let mut routes: Vec<(Route, f64)> = candidate_routes(index, unit, OPTION_LEGS)
        .into_iter()
        .map(|r| {
            let cost = option_cost(index, &r);
            (r, cost)
        })
        .collect();
    routes.sort_by(|a, b| a.1.total_cmp(&b.1));
    let feasible = (0..routes.len()).collect();
    Options {
        unit,
        routes,
        feasible,
    }
}

/// Repeatedly commits the shipment with the highest regret to its
/// cheapest still-feasible option.
///
/// Feasible option lists are kept between rounds; after a commit only the
/// shipments whose options share an airport with the committed route are
/// re-checked.
pub(super) fn repair(ctx: &RepairContext<'_>, solution: &mut Solution, ledger: &mut ResourceLedger) {
    let pending = ctx.pending(solution);
    let index = ctx.index;

    #[cfg(feature = "parallel")]
    let mut open: Vec<Options<'_>> = pending.par_iter().map(|&u| options_for(index, u)).collect();
    #[cfg(not(feature = "parallel"))]
    let mut open: Vec<Options<'_>> = pending.iter().map(|&u| options_for(index, u)).collect();

    for opts in &mut open {
        opts.refresh(ctx, ledger);
    }

    loop {
        open.retain(|o| !o.feasible.is_empty());
        let mut chosen: Option<(usize, f64)> = None;
        for (pos, opts) in open.iter().enumerate() {
            let regret = opts.regret(ctx.regret_k);
            if chosen.is_none_or(|(_, best)| regret > best) {
                chosen = Some((pos, regret));
            }
        }
        let Some((pos, regret)) = chosen else {
            break;
        };

        let opts = open.remove(pos);
        let route = &opts.routes[opts.feasible[0]].0;
        tracing::trace!(shipment = %opts.unit.id, regret, "regret insertion");
        if !ctx.try_commit(solution, ledger, opts.unit, route) {
            continue;
        }
        let touched = route.airports();
        for other in &mut open {
            if other.touches_any(&touched) {
                other.refresh(ctx, ledger);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::index::ProblemIndex;
    use crate::model::{FlightId, ShipmentId};

    #[test]
    fn test_regret_value() {
        assert_eq!(regret_value(&[], 3), 0.0);
        assert_eq!(regret_value(&[5.0, 7.0, 10.0], 3), 7.0);
        assert_eq!(regret_value(&[5.0, 7.0], 3), 2.0 + MISSING_OPTION_PENALTY);
        assert_eq!(regret_value(&[5.0], 2), MISSING_OPTION_PENALTY);
    }

    #[test]
    fn test_option_cost() {
        let index = index(10, 0);
        let route = index.schedule(&[FlightId(4)], 0).unwrap();
        let expected = index.distance_km(BRU, MAD) / 100.0 + 140.0 / 60.0;
        assert!((option_cost(&index, &route) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constrained_shipment_placed_first() {
        // unit 1 can only leave from BRU; unit 0 has several depots but
        // would grab the cheap BRU-MAD seat if it went first
        let units = vec![
            ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 4320),
            ShipmentUnit::new(ShipmentId(1), MAD)
                .with_origin(BRU)
                .with_window(0, 4320),
        ];
        let index = ProblemIndex::new(airports(), flights(1), units).unwrap();
        let ctx = RepairContext::new(&index, false, 3);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, false);
        repair(&ctx, &mut sol, &mut ledger);
        assert_eq!(sol.assigned_len(), 2);
        assert_eq!(sol.route(ShipmentId(1)).unwrap().origin(), Some(BRU));
        assert_ne!(sol.route(ShipmentId(0)).unwrap().origin(), Some(BRU));
    }

    #[test]
    fn test_cached_options_respect_capacity() {
        // single-seat flights: every commit invalidates options of others
        let index = index(1, 10);
        let ctx = RepairContext::new(&index, true, 3);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, true);
        repair(&ctx, &mut sol, &mut ledger);

        assert!(sol.assigned_len() >= 2);
        assert_eq!(sol.len(), 10);
        assert!(crate::feasibility::validate_solution(&index, &sol, true).is_feasible());
        assert_eq!(ledger, ResourceLedger::from_solution(&index, &sol, true));
    }
}
