//! Ordering of shipments and candidate routes by several criteria.

use std::cmp::Ordering;

use super::rule::RankRule;

/// How criteria combine into one ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composition {
    /// Criteria in insertion order, e.g. deadline then hop count. A later
    /// criterion only separates candidates that tie (within epsilon) on
    /// every earlier one.
    #[default]
    Lexicographic,

    /// One blended score, `Σ weight × score`, as used to choose a depot.
    Weighted,
}

struct WeightedRule<T, C> {
    rule: Box<dyn RankRule<T, C>>,
    weight: f64,
}

/// Orders shipments or candidate routes by a composition of criteria.
///
/// Candidates that tie on every criterion keep their input order.
///
/// # Examples
///
/// ```
/// use u_airfreight::ranking::{Composition, RankRule, Ranker};
///
/// struct Slack;
/// impl RankRule<(f64, u32), ()> for Slack {
///     fn name(&self) -> &str { "slack" }
///     fn score(&self, item: &(f64, u32), _: &()) -> f64 { -item.0 }
/// }
///
/// struct Items;
/// impl RankRule<(f64, u32), ()> for Items {
///     fn name(&self) -> &str { "items" }
///     fn score(&self, item: &(f64, u32), _: &()) -> f64 { -(item.1 as f64) }
/// }
///
/// let items = [(4.0, 1), (9.0, 1), (4.0, 3)];
/// let ranker = Ranker::new().with_rule(Slack).with_rule(Items);
/// assert_eq!(ranker.order(&items, &()), vec![1, 2, 0]);
///
/// let blended = Ranker::new()
///     .with_composition(Composition::Weighted)
///     .with_weighted_rule(Slack, 0.5)
///     .with_weighted_rule(Items, 2.0);
/// assert_eq!(blended.best(&items, &()), Some(2));
/// ```
pub struct Ranker<T, C> {
    rules: Vec<WeightedRule<T, C>>,
    composition: Composition,
    epsilon: f64,
}

impl<T, C> Ranker<T, C> {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            composition: Composition::Lexicographic,
            epsilon: 1e-9,
        }
    }

    pub fn with_composition(mut self, composition: Composition) -> Self {
        self.composition = composition;
        self
    }

    pub fn with_epsilon(mut self, eps: f64) -> Self {
        self.epsilon = eps;
        self
    }

    /// Appends a criterion with weight 1.0.
    pub fn with_rule<R: RankRule<T, C> + 'static>(self, rule: R) -> Self {
        self.with_weighted_rule(rule, 1.0)
    }

    /// Appends a criterion; `weight` only matters under
    /// [`Composition::Weighted`].
    pub fn with_weighted_rule<R: RankRule<T, C> + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Box::new(rule),
            weight,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|wr| wr.rule.name()).collect()
    }

    fn key(&self, item: &T, context: &C) -> Vec<f64> {
        match self.composition {
            Composition::Lexicographic => self
                .rules
                .iter()
                .map(|wr| wr.rule.score(item, context))
                .collect(),
            Composition::Weighted => vec![self.score(item, context)],
        }
    }

    /// Blended score of one candidate. Lexicographic rankers report their
    /// leading criterion.
    pub fn score(&self, item: &T, context: &C) -> f64 {
        match self.composition {
            Composition::Weighted => self
                .rules
                .iter()
                .map(|wr| wr.rule.score(item, context) * wr.weight)
                .sum(),
            Composition::Lexicographic => self
                .rules
                .first()
                .map(|wr| wr.rule.score(item, context))
                .unwrap_or(0.0),
        }
    }

    /// Positions of `items`, best candidate first.
    pub fn order(&self, items: &[T], context: &C) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..items.len()).collect();
        if self.rules.is_empty() {
            return indices;
        }
        let keys: Vec<Vec<f64>> = items.iter().map(|it| self.key(it, context)).collect();
        indices.sort_by(|&a, &b| {
            for (va, vb) in keys[a].iter().zip(&keys[b]) {
                if (va - vb).abs() > self.epsilon {
                    return va.total_cmp(vb);
                }
            }
            Ordering::Equal
        });
        indices
    }

    /// Candidates, best first.
    pub fn rank<'a>(&self, items: &'a [T], context: &C) -> Vec<&'a T> {
        self.order(items, context)
            .into_iter()
            .map(|i| &items[i])
            .collect()
    }

    /// Position of the best candidate, `None` when there is none.
    pub fn best(&self, items: &[T], context: &C) -> Option<usize> {
        self.order(items, context).first().copied()
    }
}

impl<T, C> Default for Ranker<T, C> {
    fn default() -> Self {
        Self::new()
    }
}
