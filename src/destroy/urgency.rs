//! Removal of the most time-critical shipments.

use rand::Rng;

use super::similarity::relatedness;
use super::{Placed, SelectionMode};
use crate::index::ProblemIndex;
use crate::model::ShipmentId;

const TIME_WEIGHT: f64 = 0.4;
const PRIORITY_WEIGHT: f64 = 0.3;
const DURATION_WEIGHT: f64 = 0.3;

/// Share of the randomized blend given to relatedness with the last pick.
const RELATEDNESS_SHARE: f64 = 0.4;

/// Exponent of the rank-biased draw; higher stays closer to the top.
const RANK_BIAS: i32 = 3;

/// Urgency in `[0, 1]`.
///
/// Little slack, a high priority class and a long transit (relative to
/// the continent promise) all push it up.
pub(crate) fn urgency(index: &ProblemIndex, p: &Placed<'_>) -> f64 {
    let time = 1.0 / (1.0 + p.slack / 24.0);
    let priority = p.unit.priority.weight();
    let duration = match p.route.origin() {
        Some(origin) => {
            (p.route.transit_hours() / index.promise_hours(origin, p.unit.destination)).min(1.0)
        }
        None => 0.0,
    };
    TIME_WEIGHT * time + PRIORITY_WEIGHT * priority + DURATION_WEIGHT * duration
}

pub(super) fn select<R: Rng>(
    index: &ProblemIndex,
    placed: &[Placed<'_>],
    count: usize,
    mode: SelectionMode,
    rng: &mut R,
) -> Vec<ShipmentId> {
    let scores: Vec<f64> = placed.iter().map(|p| urgency(index, p)).collect();
    match mode {
        SelectionMode::Deterministic => {
            let mut order: Vec<usize> = (0..placed.len()).collect();
            order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
            order.into_iter().take(count).map(|i| placed[i].id).collect()
        }
        SelectionMode::Randomized => {
            let mut remaining: Vec<usize> = (0..placed.len()).collect();
            let mut picked: Vec<usize> = Vec::with_capacity(count);
            while picked.len() < count && !remaining.is_empty() {
                let last = picked.last().map(|&i| &placed[i]);
                let blend = |i: usize| match last {
                    Some(l) => {
                        (1.0 - RELATEDNESS_SHARE) * scores[i]
                            + RELATEDNESS_SHARE * relatedness(index, l, &placed[i]) / 2.0
                    }
                    None => scores[i],
                };
                let mut ranked: Vec<(usize, f64)> =
                    remaining.iter().enumerate().map(|(pos, &i)| (pos, blend(i))).collect();
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
                let u: f64 = rng.random();
                let rank = ((ranked.len() as f64) * u.powi(RANK_BIAS)) as usize;
                let pos = ranked[rank.min(ranked.len() - 1)].0;
                picked.push(remaining.swap_remove(pos));
            }
            picked.into_iter().map(|i| placed[i].id).collect()
        }
    }
}
