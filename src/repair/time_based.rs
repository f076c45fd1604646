//! Deadline-pressure insertion.

use super::candidates::{candidate_routes, MAX_LEGS};
use super::RepairContext;
use crate::model::{slack_hours, Route, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

fn hours_to_deadline(unit: &ShipmentUnit) -> f64 {
    match unit.budget_minutes() {
        Some(_) => unit.budget_hours(),
        None => f64::INFINITY,
    }
}

/// Tightest budget first; each unit takes the feasible route that leaves
/// the most slack.
pub(super) fn repair(ctx: &RepairContext<'_>, solution: &mut Solution, ledger: &mut ResourceLedger) {
    let mut pending = ctx.pending(solution);
    pending.sort_by(|a, b| hours_to_deadline(a).total_cmp(&hours_to_deadline(b)));
    for unit in pending {
        let routes = candidate_routes(ctx.index, unit, MAX_LEGS);
        let best: Option<&Route> = routes
            .iter()
            .filter(|r| ctx.checker.check_unit(unit, r, ledger).is_ok())
            .fold(None, |best: Option<&Route>, r| match best {
                Some(b) if slack_hours(unit, b) >= slack_hours(unit, r) => Some(b),
                _ => Some(r),
            });
        if let Some(route) = best {
            ctx.try_commit(solution, ledger, unit, route);
        }
    }
}
