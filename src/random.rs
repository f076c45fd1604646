//! Seeded random number generation.
//!
//! Every stochastic decision in the search draws from one [`SearchRng`]
//! created here, so equal seeds replay identical runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generator threaded through operators and the controller.
pub type SearchRng = ChaCha8Rng;

/// Creates a deterministic generator from `seed`.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use u_airfreight::random::create_rng;
///
/// let mut a = create_rng(7);
/// let mut b = create_rng(7);
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
pub fn create_rng(seed: u64) -> SearchRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Roulette-wheel pick over non-negative weights.
///
/// Returns `None` for an empty slice. When every weight is zero the pick
/// is uniform.
pub fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.random_range(0..weights.len()));
    }
    let mut roll = rng.random_range(0.0..total);
    for (i, w) in weights.iter().enumerate() {
        roll -= w.max(0.0);
        if roll <= 0.0 {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Swaps a fraction of random element pairs, keeping most of the order.
pub fn partial_shuffle<T, R: Rng>(items: &mut [T], fraction: f64, rng: &mut R) {
    if items.len() < 2 {
        return;
    }
    let swaps = ((items.len() as f64) * fraction).ceil() as usize;
    for _ in 0..swaps {
        let a = rng.random_range(0..items.len());
        let b = rng.random_range(0..items.len());
        items.swap(a, b);
    }
}
