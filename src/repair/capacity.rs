//! Spare-capacity insertion.

use std::cmp::Reverse;

use super::candidates::{candidate_routes, MAX_LEGS};
use super::RepairContext;
use crate::index::ProblemIndex;
use crate::model::{Route, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

/// Smallest share of capacity left on any flight of `route` once `unit`
/// is loaded; 1.0 for an empty route.
pub(crate) fn headroom(
    index: &ProblemIndex,
    ledger: &ResourceLedger,
    unit: &ShipmentUnit,
    route: &Route,
) -> f64 {
    route
        .flights()
        .map(|f| {
            let capacity = index.flight(f).capacity.max(1) as f64;
            let spare = ledger.flight_spare(index, f) as f64 - unit.items as f64;
            spare / capacity
        })
        .fold(1.0, f64::min)
}

/// Largest units first, each into the feasible route with the most
/// headroom left on its busiest flight.
pub(super) fn repair(ctx: &RepairContext<'_>, solution: &mut Solution, ledger: &mut ResourceLedger) {
    let mut pending = ctx.pending(solution);
    pending.sort_by_key(|u| (Reverse(u.items), u.id));
    for unit in pending {
        let routes = candidate_routes(ctx.index, unit, MAX_LEGS);
        let mut best: Option<(&Route, f64)> = None;
        for route in &routes {
            if ctx.checker.check_unit(unit, route, ledger).is_err() {
                continue;
            }
            let room = headroom(ctx.index, ledger, unit, route);
            if best.is_none_or(|(_, b)| room > b) {
                best = Some((route, room));
            }
        }
        if let Some((route, _)) = best {
            ctx.try_commit(solution, ledger, unit, route);
        }
    }
}
