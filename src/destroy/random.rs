//! Slack-biased random removal.

use rand::Rng;

use super::Placed;
use crate::model::ShipmentId;

/// Chance of passing over a candidate while walking the ranked list.
const SKIP_PROBABILITY: f64 = 0.1;

/// Weight applied to shipments that already sit at their destination.
const DELIVERED_FACTOR: f64 = 0.1;

const ITEM_WEIGHT: f64 = 0.2;

pub(crate) fn removal_score(p: &Placed<'_>) -> f64 {
    let score = p.slack + ITEM_WEIGHT * p.unit.items as f64;
    if p.is_delivered() {
        score * DELIVERED_FACTOR
    } else {
        score
    }
}

/// Highest scores first; each candidate is skipped with a small
/// probability. Skipped candidates backfill when the walk runs short.
pub(super) fn select<R: Rng>(placed: &[Placed<'_>], count: usize, rng: &mut R) -> Vec<ShipmentId> {
    let mut ranked: Vec<(ShipmentId, f64)> =
        placed.iter().map(|p| (p.id, removal_score(p))).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut picked = Vec::with_capacity(count);
    let mut skipped = Vec::new();
    for (id, _) in ranked {
        if picked.len() == count {
            break;
        }
        if rng.random_bool(SKIP_PROBABILITY) {
            skipped.push(id);
        } else {
            picked.push(id);
        }
    }
    let missing = count - picked.len();
    picked.extend(skipped.into_iter().take(missing));
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destroy::{placed_shipments, testing::placed};
    use crate::index::fixtures::*;
    use crate::model::{Route, ShipmentUnit};
    use crate::random::create_rng;

    #[test]
    fn test_delivered_is_down_weighted() {
        let unit = ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 600);
        let route = Route::empty();
        let p = Placed {
            id: unit.id,
            unit: &unit,
            route: &route,
            slack: 10.0,
        };
        assert!((removal_score(&p) - 1.02).abs() < 1e-9);
    }

    #[test]
    fn test_exact_count() {
        let index = index(50, 9);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        for seed in 0..20 {
            let ids = select(&placed, 4, &mut create_rng(seed));
            assert_eq!(ids.len(), 4);
        }
    }

    #[test]
    fn test_prefers_high_slack() {
        // odd ids (LIM-UIO, 2h) keep more slack than even ids (LIM-MAD, 13h)
        let index = index(50, 10);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        let mut odd = 0;
        for seed in 0..30 {
            let ids = select(&placed, 5, &mut create_rng(seed));
            odd += ids.iter().filter(|id| id.0 % 2 == 1).count();
        }
        assert!(odd > 100, "odd picks {odd}");
    }
}
