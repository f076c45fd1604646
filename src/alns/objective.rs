//! Solution scoring.

use super::config::ObjectiveWeights;
use crate::index::ProblemIndex;
use crate::model::{slack_hours, Route, ShipmentUnit};
use crate::solution::{ResourceLedger, Solution};

/// Objective terms of one solution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Objective {
    pub routed: usize,
    pub items: u64,
    /// Routed on time over all shipments; 1.0 for an empty problem.
    pub on_time_rate: f64,
    pub avg_margin_hours: f64,
    pub avg_utilization: f64,
    pub avg_delivery_hours: f64,
    /// Weighted total, after the lateness penalty. Higher is better.
    pub score: f64,
}

/// Scheduled arrival no later than the deadline. An empty route is
/// delivered on the spot.
pub fn is_on_time(unit: &ShipmentUnit, route: &Route) -> bool {
    match route.arrival() {
        None => true,
        Some(arrival) => unit.deadline.is_some_and(|d| arrival <= d),
    }
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// Scores `solution`; `ledger` must match its route map.
///
/// ```text
/// score = routed·w_r + items·w_i + on_time_rate·w_o + margin·w_m
///       + utilization·w_u − delivery·w_d
/// ```
///
/// With an on-time rate below 1 the score loses `|score| × (1 − rate³)`.
pub fn evaluate(
    index: &ProblemIndex,
    solution: &Solution,
    ledger: &ResourceLedger,
    weights: &ObjectiveWeights,
) -> Objective {
    let mut routed = 0usize;
    let mut items = 0u64;
    let mut on_time = 0usize;
    let mut margin = 0.0;
    let mut delivery = 0.0;
    for (&id, route) in solution.routes() {
        let Some(unit) = index.shipment(id) else {
            continue;
        };
        routed += 1;
        items += u64::from(unit.items);
        if is_on_time(unit, route) {
            on_time += 1;
        }
        margin += slack_hours(unit, route);
        delivery += route.transit_hours();
    }

    let used: Vec<f64> = ledger
        .used_flights()
        .map(|f| ledger.utilization(index, f))
        .collect();

    let total = index.shipments().len();
    let on_time_rate = if total == 0 {
        1.0
    } else {
        on_time as f64 / total as f64
    };

    let mut objective = Objective {
        routed,
        items,
        on_time_rate,
        avg_margin_hours: mean(margin, routed),
        avg_utilization: mean(used.iter().sum(), used.len()),
        avg_delivery_hours: mean(delivery, routed),
        score: 0.0,
    };
    let mut score = weights.routed * routed as f64
        + weights.items * items as f64
        + weights.on_time * on_time_rate
        + weights.margin * objective.avg_margin_hours
        + weights.utilization * objective.avg_utilization
        - weights.delivery * objective.avg_delivery_hours;
    if on_time_rate < 1.0 {
        score -= score.abs() * (1.0 - on_time_rate.powi(3));
    }
    objective.score = score;
    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::model::{FlightId, ShipmentId};

    fn unit_weights() -> ObjectiveWeights {
        ObjectiveWeights {
            routed: 1.0,
            items: 0.0,
            on_time: 0.0,
            margin: 0.0,
            utilization: 0.0,
            delivery: 0.0,
        }
    }

    #[test]
    fn test_empty_problem() {
        let index = index(10, 0);
        let sol = Solution::new();
        let ledger = ResourceLedger::new(&index, false);
        let obj = evaluate(&index, &sol, &ledger, &ObjectiveWeights::default());
        assert_eq!(obj.on_time_rate, 1.0);
        assert_eq!(obj.routed, 0);
        assert_eq!(obj.score, ObjectiveWeights::default().on_time);
    }

    #[test]
    fn test_cubic_penalty() {
        let index = index(10, 2);
        let mut sol = Solution::unassigned_from(&index);
        sol.assign(ShipmentId(0), index.schedule(&[FlightId(4)], 0).unwrap());
        let ledger = ResourceLedger::from_solution(&index, &sol, false);
        let obj = evaluate(&index, &sol, &ledger, &unit_weights());
        assert_eq!(obj.routed, 1);
        assert_eq!(obj.on_time_rate, 0.5);
        // 1 − |1| × (1 − 0.125)
        assert!((obj.score - 0.125).abs() < 1e-12);
    }

    #[test]
    fn test_more_routed_scores_higher() {
        let index = index(10, 2);
        let mut one = Solution::unassigned_from(&index);
        one.assign(ShipmentId(0), index.schedule(&[FlightId(4)], 0).unwrap());
        let mut two = one.clone();
        two.assign(ShipmentId(1), index.schedule(&[FlightId(7)], 0).unwrap());
        let weights = ObjectiveWeights::default();
        let a = evaluate(&index, &one, &ResourceLedger::from_solution(&index, &one, false), &weights);
        let b = evaluate(&index, &two, &ResourceLedger::from_solution(&index, &two, false), &weights);
        assert!(b.score > a.score);
        assert_eq!(b.on_time_rate, 1.0);
        assert!((b.avg_utilization - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_late_arrival() {
        let unit = ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 600);
        let index = index(10, 0);
        // BRU-MAD leaves at 15:00 and lands after the deadline
        let route = index.schedule(&[FlightId(4)], 0).unwrap();
        assert!(!is_on_time(&unit, &route));
        assert!(is_on_time(&unit, &Route::empty()));
    }
}
