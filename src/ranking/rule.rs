//! Single ranking criterion.

/// Scores one item; lower scores rank first.
///
/// `C` carries whatever read-only state the rule needs (problem index,
/// ledger, precomputed slack...).
///
/// # Examples
///
/// ```
/// use u_airfreight::ranking::RankRule;
///
/// /// Heavier first.
/// struct MostItems;
///
/// impl RankRule<(u64, u32), ()> for MostItems {
///     fn name(&self) -> &str {
///         "most-items"
///     }
///     fn score(&self, item: &(u64, u32), _ctx: &()) -> f64 {
///         -(item.1 as f64)
///     }
/// }
///
/// assert_eq!(MostItems.score(&(1, 4), &()), -4.0);
/// ```
pub trait RankRule<T, C>: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, item: &T, context: &C) -> f64;
}
