//! Adaptive weights over destroy × repair pairs.
//!
//! Ropke & Pisinger (2006), Equation (1), applied per operator pair
//! rather than per operator.

use rand::Rng;

use crate::random::roulette;

/// Weight and running segment tally of one destroy/repair pair.
#[derive(Debug, Clone, PartialEq)]
struct OperatorStats {
    weight: f64,
    segment_credit: f64,
    segment_runs: usize,
}

impl OperatorStats {
    fn new() -> Self {
        Self {
            weight: 1.0,
            segment_credit: 0.0,
            segment_runs: 0,
        }
    }

    fn record(&mut self, score: f64) {
        self.segment_credit += score;
        self.segment_runs += 1;
    }

    /// Closes a segment for this destroy/repair pair.
    ///
    /// A pair that ran moves toward the mean credit it earned per run,
    /// `w ← (1 − λ)·w + λ·credit/runs`, and never drops below
    /// `min_weight`. A pair that never ran keeps its weight.
    fn update_weight(&mut self, reaction_factor: f64, min_weight: f64) {
        let credit = std::mem::take(&mut self.segment_credit);
        let runs = std::mem::take(&mut self.segment_runs);
        if runs == 0 {
            return;
        }
        let mean = credit / runs as f64;
        self.weight = ((1.0 - reaction_factor) * self.weight + reaction_factor * mean).max(min_weight);
    }
}

/// Weight matrix indexed by positions in the enabled operator lists.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorMatrix {
    repair: usize,
    cells: Vec<OperatorStats>,
}

impl OperatorMatrix {
    /// All pairs start at weight 1.
    pub fn new(destroy: usize, repair: usize) -> Self {
        Self {
            repair,
            cells: vec![OperatorStats::new(); destroy * repair],
        }
    }

    pub fn destroy_len(&self) -> usize {
        self.cells.len().checked_div(self.repair).unwrap_or(0)
    }

    pub fn repair_len(&self) -> usize {
        self.repair
    }

    /// Roulette pick of a `(destroy, repair)` pair.
    pub fn select<R: Rng>(&self, rng: &mut R) -> (usize, usize) {
        let weights: Vec<f64> = self.cells.iter().map(|c| c.weight).collect();
        let cell = roulette(&weights, rng).unwrap_or(0);
        (cell / self.repair.max(1), cell % self.repair.max(1))
    }

    pub fn record(&mut self, destroy: usize, repair: usize, score: f64) {
        let i = destroy * self.repair + repair;
        if let Some(cell) = self.cells.get_mut(i) {
            cell.record(score);
        }
    }

    /// Applies the segment update to every pair and resets the counters.
    pub fn end_segment(&mut self, reaction_factor: f64, min_weight: f64) {
        for cell in &mut self.cells {
            cell.update_weight(reaction_factor, min_weight);
        }
    }

    pub fn weight(&self, destroy: usize, repair: usize) -> f64 {
        self.cells
            .get(destroy * self.repair + repair)
            .map_or(0.0, |c| c.weight)
    }

    /// Weights as rows of destroy operators.
    pub fn weights(&self) -> Vec<Vec<f64>> {
        self.cells
            .chunks(self.repair.max(1))
            .map(|row| row.iter().map(|c| c.weight).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_update_weight() {
        let mut stats = OperatorStats::new();
        stats.record(33.0);
        stats.record(3.0);
        stats.update_weight(0.5, 0.01);
        // 1.0 * 0.5 + 18.0 * 0.5
        assert!((stats.weight - 9.5).abs() < 1e-12);
        assert_eq!(stats.segment_runs, 0);
    }

    #[test]
    fn test_unused_keeps_weight() {
        let mut stats = OperatorStats::new();
        stats.update_weight(0.5, 0.01);
        assert_eq!(stats.weight, 1.0);
    }

    #[test]
    fn test_min_weight_floor() {
        let mut stats = OperatorStats::new();
        stats.record(0.0);
        stats.update_weight(1.0, 0.05);
        assert_eq!(stats.weight, 0.05);
    }

    #[test]
    fn test_matrix_shape() {
        let m = OperatorMatrix::new(3, 2);
        assert_eq!((m.destroy_len(), m.repair_len()), (3, 2));
        assert_eq!(m.weights(), vec![vec![1.0; 2]; 3]);
    }

    #[test]
    fn test_selection_follows_weights() {
        let mut m = OperatorMatrix::new(2, 2);
        for _ in 0..10 {
            m.record(1, 0, 33.0);
            m.record(0, 0, 0.0);
            m.record(0, 1, 0.0);
            m.record(1, 1, 0.0);
        }
        m.end_segment(1.0, 0.001);
        assert_eq!(m.weight(1, 0), 33.0);

        let mut rng = create_rng(3);
        let hits = (0..1000).filter(|_| m.select(&mut rng) == (1, 0)).count();
        assert!(hits > 950, "hits {hits}");
    }
}
