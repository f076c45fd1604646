//! Removal around the busiest cross-continent region.

use super::Placed;
use crate::index::ProblemIndex;
use crate::model::{Continent, ShipmentId};
use crate::ranking::{RankRule, Ranker};

struct CrossContinentFirst;

impl<'a> RankRule<Placed<'a>, ()> for CrossContinentFirst {
    fn name(&self) -> &str {
        "cross-continent-first"
    }
    fn score(&self, p: &Placed<'a>, _: &()) -> f64 {
        if p.route.is_cross_continent() {
            0.0
        } else {
            1.0
        }
    }
}

struct InTransitFirst;

impl<'a> RankRule<Placed<'a>, ()> for InTransitFirst {
    fn name(&self) -> &str {
        "in-transit-first"
    }
    fn score(&self, p: &Placed<'a>, _: &()) -> f64 {
        if p.is_delivered() {
            1.0
        } else {
            0.0
        }
    }
}

struct MostSlack;

impl<'a> RankRule<Placed<'a>, ()> for MostSlack {
    fn name(&self) -> &str {
        "most-slack"
    }
    fn score(&self, p: &Placed<'a>, _: &()) -> f64 {
        -p.slack
    }
}

struct MostItems;

impl<'a> RankRule<Placed<'a>, ()> for MostItems {
    fn name(&self) -> &str {
        "most-items"
    }
    fn score(&self, p: &Placed<'a>, _: &()) -> f64 {
        -(p.unit.items as f64)
    }
}

/// Continent crossed by the most cross-continent routes, if any.
pub(super) fn hub_continent(index: &ProblemIndex, placed: &[Placed<'_>]) -> Option<Continent> {
    let mut counts = [0usize; Continent::ALL.len()];
    for p in placed.iter().filter(|p| p.route.is_cross_continent()) {
        let mut seen = [false; Continent::ALL.len()];
        for airport in p.route.airports() {
            seen[index.continent(airport).index()] = true;
        }
        for (c, hit) in seen.iter().enumerate() {
            counts[c] += usize::from(*hit);
        }
    }
    let (best, &n) = counts
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))?;
    (n > 0).then_some(Continent::ALL[best])
}

fn touches(index: &ProblemIndex, p: &Placed<'_>, continent: Continent) -> bool {
    index.continent(p.unit.destination) == continent
        || p
            .route
            .airports()
            .into_iter()
            .any(|a| index.continent(a) == continent)
}

/// `None` when no route crosses continents or the region holds fewer than
/// `count` shipments.
pub(super) fn select(
    index: &ProblemIndex,
    placed: &[Placed<'_>],
    count: usize,
) -> Option<Vec<ShipmentId>> {
    let hub = hub_continent(index, placed)?;
    let candidates: Vec<Placed<'_>> = placed
        .iter()
        .filter(|p| touches(index, p, hub))
        .copied()
        .collect();
    if candidates.len() < count {
        return None;
    }
    let ranker = Ranker::new()
        .with_rule(CrossContinentFirst)
        .with_rule(InTransitFirst)
        .with_rule(MostSlack)
        .with_rule(MostItems);
    Some(
        ranker
            .order(&candidates, &())
            .into_iter()
            .take(count)
            .map(|i| candidates[i].id)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destroy::{placed_shipments, testing::placed};
    use crate::index::fixtures::*;
    use crate::model::{FlightId, ShipmentUnit};
    use crate::solution::Solution;

    #[test]
    fn test_hub_is_first_busiest_continent() {
        let index = index(50, 6);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        // LIM-MAD routes touch South America and Europe equally
        assert_eq!(hub_continent(&index, &placed), Some(Continent::Europe));
    }

    #[test]
    fn test_no_cross_continent_routes() {
        let index = index(50, 6);
        let mut sol = Solution::new();
        sol.assign(ShipmentId(1), index.schedule(&[FlightId(7)], 0).unwrap());
        let placed = placed_shipments(&index, &sol);
        assert_eq!(hub_continent(&index, &placed), None);
        assert_eq!(select(&index, &placed, 1), None);
    }

    #[test]
    fn test_cross_continent_ranked_first() {
        let index = crate::index::ProblemIndex::new(
            airports(),
            flights(50),
            vec![
                ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 4320),
                ShipmentUnit::new(ShipmentId(1), BRU).with_window(0, 4320),
                ShipmentUnit::new(ShipmentId(2), MAD).with_window(0, 4320).with_items(3),
            ],
        )
        .unwrap();
        let mut sol = Solution::new();
        sol.assign(ShipmentId(0), index.schedule(&[FlightId(2)], 0).unwrap());
        // BRU is a depot and the destination: delivered in place
        sol.assign(ShipmentId(1), crate::model::Route::empty());
        sol.assign(ShipmentId(2), index.schedule(&[FlightId(2)], 0).unwrap());
        let placed = placed_shipments(&index, &sol);
        let ids = select(&index, &placed, 3).unwrap();
        // equal slack, so more items wins, then the delivered one last
        assert_eq!(ids, vec![ShipmentId(2), ShipmentId(0), ShipmentId(1)]);
    }

    #[test]
    fn test_too_few_candidates() {
        let index = index(50, 4);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        // only the two Madrid shipments touch Europe
        assert!(select(&index, &placed, 3).is_none());
        assert_eq!(select(&index, &placed, 2).map(|v| v.len()), Some(2));
    }
}
