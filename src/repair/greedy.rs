//! Earliest-deadline greedy insertion.

use super::candidates::{routes_with_legs, MAX_LEGS};
use super::{deadline_key, RepairContext};
use crate::solution::{ResourceLedger, Solution};

/// Deadline ascending; per shipment, direct routes before one-stop before
/// two-stop, fastest first within each. The first feasible route wins.
pub(super) fn repair(ctx: &RepairContext<'_>, solution: &mut Solution, ledger: &mut ResourceLedger) {
    let mut pending = ctx.pending(solution);
    pending.sort_by_key(|u| deadline_key(u));
    for unit in pending {
        for legs in 0..=MAX_LEGS {
            let routes = routes_with_legs(ctx.index, unit, legs);
            if ctx.commit_first(solution, ledger, unit, &routes) {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::index::ProblemIndex;
    use crate::model::{FlightId, ShipmentId, ShipmentUnit};

    #[test]
    fn test_prefers_fewer_legs() {
        let index = index(50, 1);
        let ctx = RepairContext::new(&index, false, 3);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, false);
        repair(&ctx, &mut sol, &mut ledger);
        // BRU-MAD is the fastest direct option
        let route = sol.route(ShipmentId(0)).unwrap();
        assert_eq!(route.flights().collect::<Vec<_>>(), vec![FlightId(4)]);
    }

    #[test]
    fn test_earliest_deadline_gets_scarce_seat() {
        let units = vec![
            ShipmentUnit::new(ShipmentId(0), MAD)
                .with_origin(BRU)
                .with_window(0, 4000),
            ShipmentUnit::new(ShipmentId(1), MAD)
                .with_origin(BRU)
                .with_window(0, 1500),
        ];
        let index = ProblemIndex::new(airports(), flights(1), units).unwrap();
        let ctx = RepairContext::new(&index, false, 3);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, false);
        repair(&ctx, &mut sol, &mut ledger);
        assert!(sol.is_assigned(ShipmentId(1)));
        assert!(!sol.is_assigned(ShipmentId(0)));
    }

    #[test]
    fn test_moves_to_next_depot() {
        // the first unit takes the only BRU-MAD seat, the second moves on
        // to the next fastest depot
        let units = vec![
            ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 4320),
            ShipmentUnit::new(ShipmentId(1), MAD).with_window(0, 4320),
        ];
        let index = ProblemIndex::new(airports(), flights(1), units).unwrap();
        let ctx = RepairContext::new(&index, false, 3);
        let mut sol = Solution::unassigned_from(&index);
        let mut ledger = ResourceLedger::new(&index, false);
        repair(&ctx, &mut sol, &mut ledger);
        assert_eq!(sol.assigned_len(), 2);
        assert_eq!(sol.route(ShipmentId(1)).unwrap().origin(), Some(BOG));
    }
}
