//! Removal from congested flights.

use super::time_window::LOW_SLACK_HOURS;
use super::Placed;
use crate::index::ProblemIndex;
use crate::model::ShipmentId;
use crate::solution::ResourceLedger;

/// Utilization above which a flight counts as congested.
pub(crate) const CONGESTION_THRESHOLD: f64 = 0.85;

const EXCESS_WEIGHT: f64 = 100.0;

/// Penalty per hour of slack below the low-slack bound.
const LOW_SLACK_PENALTY: f64 = 2.0;

const ITEM_BONUS: f64 = 0.5;

/// Summed utilization excess over the threshold along the route.
pub(crate) fn congestion_excess(index: &ProblemIndex, ledger: &ResourceLedger, p: &Placed<'_>) -> f64 {
    p.route
        .flights()
        .map(|f| (ledger.utilization(index, f) - CONGESTION_THRESHOLD).max(0.0))
        .sum()
}

/// `None` if the shipment rides no congested flight.
fn score(index: &ProblemIndex, ledger: &ResourceLedger, p: &Placed<'_>) -> Option<f64> {
    let excess = congestion_excess(index, ledger, p);
    if excess <= 0.0 {
        return None;
    }
    let penalty = (LOW_SLACK_HOURS - p.slack).max(0.0) * LOW_SLACK_PENALTY;
    let score = excess * EXCESS_WEIGHT - penalty + ITEM_BONUS * p.unit.items as f64;
    (score > 0.0).then_some(score)
}

/// `None` when fewer than `count` shipments qualify.
pub(super) fn select(
    index: &ProblemIndex,
    ledger: &ResourceLedger,
    placed: &[Placed<'_>],
    count: usize,
) -> Option<Vec<ShipmentId>> {
    let mut scored: Vec<(ShipmentId, f64)> = placed
        .iter()
        .filter_map(|p| score(index, ledger, p).map(|s| (p.id, s)))
        .collect();
    if scored.len() < count {
        return None;
    }
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    Some(scored.into_iter().take(count).map(|(id, _)| id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destroy::{placed_shipments, testing::placed};
    use crate::index::fixtures::*;
    use crate::model::FlightId;
    use crate::solution::Solution;

    #[test]
    fn test_uncongested_network_falls_back() {
        let index = index(50, 6);
        let (sol, ledger) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        assert!(select(&index, &ledger, &placed, 1).is_none());
    }

    #[test]
    fn test_full_flight_shipments_qualify() {
        // capacity 3: the three Madrid units fill LIM-MAD, the Quito units
        // fill LIM-UIO
        let index = index(3, 6);
        let (sol, ledger) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        let ids = select(&index, &ledger, &placed, 6).unwrap();
        assert_eq!(ids.len(), 6);
        assert!(congestion_excess(&index, &ledger, &placed[0]) > 0.14);
    }

    #[test]
    fn test_prefers_more_congested() {
        let index = index(3, 6);
        let mut sol = Solution::unassigned_from(&index);
        // LIM-MAD full, LIM-UIO at a third
        for i in [0, 2, 4] {
            sol.assign(ShipmentId(i), index.schedule(&[FlightId(2)], 0).unwrap());
        }
        sol.assign(ShipmentId(1), index.schedule(&[FlightId(7)], 0).unwrap());
        let ledger = ResourceLedger::from_solution(&index, &sol, false);
        let placed = placed_shipments(&index, &sol);
        let ids = select(&index, &ledger, &placed, 3).unwrap();
        assert!(ids.iter().all(|id| id.0 % 2 == 0));
        assert!(select(&index, &ledger, &placed, 4).is_none());
    }
}
