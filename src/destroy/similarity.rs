//! Shaw relatedness removal.

use rand::Rng;

use super::{Placed, SelectionMode};
use crate::index::ProblemIndex;
use crate::model::time::hours;
use crate::model::{AirportId, ShipmentId};
use crate::random::roulette;

/// Relatedness of two airports in `(0, 1]`.
///
/// Identical airports score 1. Airports joined by a direct flight (either
/// way) score `1 / (1 + block hours)` of the shortest such flight; others
/// score `1 / (1 + km / 1000)`.
///
/// # Examples
///
/// ```
/// use u_airfreight::destroy::endpoint_similarity;
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight};
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 10),
///         Airport::new("B", Continent::Europe, 10),
///     ],
///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 5)],
///     vec![],
/// ).unwrap();
/// assert_eq!(endpoint_similarity(&index, AirportId(0), AirportId(0)), 1.0);
/// assert!((endpoint_similarity(&index, AirportId(1), AirportId(0)) - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn endpoint_similarity(index: &ProblemIndex, a: AirportId, b: AirportId) -> f64 {
    if a == b {
        return 1.0;
    }
    let block = index
        .direct_flights(a, b)
        .chain(index.direct_flights(b, a))
        .map(|f| index.flight(f).duration_minutes())
        .min();
    match block {
        Some(minutes) => 1.0 / (1.0 + hours(minutes)),
        None => 1.0 / (1.0 + index.distance_km(a, b) / 1000.0),
    }
}

/// Origin plus destination relatedness, in `(0, 2]`.
pub(crate) fn relatedness(index: &ProblemIndex, a: &Placed<'_>, b: &Placed<'_>) -> f64 {
    endpoint_similarity(index, a.origin(), b.origin())
        + endpoint_similarity(index, a.unit.destination, b.unit.destination)
}

/// Random seed shipment, then repeatedly the shipment most related to a
/// randomly chosen removed one.
pub(super) fn select<R: Rng>(
    index: &ProblemIndex,
    placed: &[Placed<'_>],
    count: usize,
    mode: SelectionMode,
    rng: &mut R,
) -> Vec<ShipmentId> {
    let mut remaining: Vec<usize> = (0..placed.len()).collect();
    let mut removed: Vec<usize> = Vec::with_capacity(count);
    removed.push(remaining.swap_remove(rng.random_range(0..remaining.len())));

    while removed.len() < count && !remaining.is_empty() {
        let reference = &placed[removed[rng.random_range(0..removed.len())]];
        let scores: Vec<f64> = remaining
            .iter()
            .map(|&i| relatedness(index, reference, &placed[i]))
            .collect();
        let pick = match mode {
            SelectionMode::Deterministic => argmax(&scores),
            SelectionMode::Randomized => roulette(&scores, rng).unwrap_or(0),
        };
        removed.push(remaining.swap_remove(pick));
    }
    removed.into_iter().map(|i| placed[i].id).collect()
}

/// First index of the largest value; 0 for an empty slice.
pub(crate) fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::destroy::{placed_shipments, testing::placed};
    use crate::index::fixtures::*;
    use crate::random::create_rng;

    #[test]
    fn test_direct_flight_similarity() {
        let index = index(10, 0);
        // LIM-BOG 3h
        assert!((endpoint_similarity(&index, BOG, LIM) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_distance_similarity() {
        let index = index(10, 0);
        // no direct BOG-BRU flight
        let s = endpoint_similarity(&index, BOG, BRU);
        let expected = 1.0 / (1.0 + index.distance_km(BOG, BRU) / 1000.0);
        assert!((s - expected).abs() < 1e-12);
        assert!(s < 0.2);
    }

    #[test]
    fn test_deterministic_groups_same_destination() {
        let index = index(50, 10);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        for seed in 0..10 {
            let ids = select(&index, &placed, 4, SelectionMode::Deterministic, &mut create_rng(seed));
            let parity = ids[0].0 % 2;
            assert!(ids.iter().all(|id| id.0 % 2 == parity), "seed {seed}: {ids:?}");
        }
    }

    #[test]
    fn test_randomized_count() {
        let index = index(50, 10);
        let (sol, _) = placed(&index);
        let placed = placed_shipments(&index, &sol);
        let ids = select(&index, &placed, 7, SelectionMode::Randomized, &mut create_rng(2));
        assert_eq!(ids.len(), 7);
    }

    #[test]
    fn test_argmax_first_of_ties() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), 1);
        assert_eq!(argmax(&[]), 0);
    }
}
