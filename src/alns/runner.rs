//! ALNS execution loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;

use super::config::{AlnsConfig, InitialSolution};
use super::objective::{evaluate, Objective};
use super::stats::OperatorMatrix;
use crate::error::ConfigError;
use crate::index::ProblemIndex;
use crate::random::create_rng;
use crate::repair::{
    construct, construct_randomized, IntelligentRepair, RepairContext, RepairMemory,
};
use crate::solution::Solution;

/// Best improvements smaller than this are ties.
const IMPROVEMENT_EPS: f64 = 1e-9;

/// Result of an ALNS optimization run.
#[derive(Debug, Clone)]
pub struct AlnsResult {
    /// The best solution found.
    pub best: Solution,

    /// Objective terms of the best solution.
    pub best_objective: Objective,

    /// Iterations actually run.
    pub iterations: usize,

    /// Number of new bests found.
    pub improvements: usize,

    /// Final temperature.
    pub final_temperature: f64,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Whether the no-improvement limit ended the run.
    pub stopped_early: bool,

    /// Final pair weights, one row per enabled destroy operator.
    pub weights: Vec<Vec<f64>>,

    /// Best score before the first iteration and after each one.
    pub best_history: Vec<f64>,

    /// Current score before the first iteration and after each one.
    pub current_history: Vec<f64>,
}

/// Executes the ALNS search over a problem index.
///
/// # Examples
///
/// ```
/// use u_airfreight::alns::{AlnsConfig, AlnsRunner};
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 20).as_depot(),
///         Airport::new("B", Continent::Europe, 20).as_depot(),
///         Airport::new("C", Continent::Europe, 20),
///     ],
///     vec![
///         Flight::new("AC", AirportId(0), AirportId(2), 60, 180, 3),
///         Flight::new("BC", AirportId(1), AirportId(2), 90, 200, 3),
///     ],
///     (0..5).map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(2)).with_window(0, 2880)).collect(),
/// ).unwrap();
///
/// let config = AlnsConfig::default().with_max_iterations(50).with_removal(1, 3).with_seed(1);
/// let result = AlnsRunner::run(&index, &config).unwrap();
/// assert_eq!(result.best.assigned_len(), 5);
/// ```
pub struct AlnsRunner;

impl AlnsRunner {
    /// Runs ALNS optimization.
    pub fn run(index: &ProblemIndex, config: &AlnsConfig) -> Result<AlnsResult, ConfigError> {
        Self::run_with_cancel(index, config, None)
    }

    /// Runs ALNS with an optional cancellation token.
    ///
    /// The flag is polled before every iteration; the best solution found
    /// so far is returned.
    pub fn run_with_cancel(
        index: &ProblemIndex,
        config: &AlnsConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AlnsResult, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut rng = create_rng(seed);
        let ctx = RepairContext::new(index, config.temporal_validation, config.regret_k);
        let fallback = IntelligentRepair::new(config.failure_threshold);
        let mut memory = RepairMemory::new();

        tracing::info!(
            event = "solve_start",
            shipments = index.shipments().len(),
            flights = index.flights().len(),
            depots = index.depots().len(),
            max_iterations = config.max_iterations,
            seed,
            "ALNS started"
        );

        // Initialize
        let (mut current, mut ledger) = match config.initial_solution {
            InitialSolution::Construction => construct(&ctx, &mut rng),
            InitialSolution::Randomized => construct_randomized(&ctx, &mut rng),
        };
        for &id in current.unassigned() {
            memory.record_failure(id);
        }
        let mut current_objective = evaluate(index, &current, &ledger, &config.objective);
        let mut best = current.clone();
        let mut best_objective = current_objective;

        let mut matrix = OperatorMatrix::new(
            config.destroy_operators.len(),
            config.repair_operators.len(),
        );
        let mut temperature = config.initial_temperature;
        let mut improvements = 0usize;
        let mut iterations = 0usize;
        let mut no_improvement = 0usize;
        let mut cancelled = false;
        let mut stopped_early = false;

        let mut saved = ledger.checkpoint();
        let mut best_history = vec![best_objective.score];
        let mut current_history = vec![current_objective.score];

        for iteration in 0..config.max_iterations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if current.is_empty() {
                break;
            }
            iterations += 1;

            let (d_idx, r_idx) = matrix.select(&mut rng);
            let destroy = config.destroy_operators[d_idx];
            let repair = config.repair_operators[r_idx];

            // Destroy then repair on a copy; the ledger follows and is
            // restored on rejection
            ledger.checkpoint_into(&mut saved);
            let mut candidate = current.clone();
            let count = rng
                .random_range(config.min_removal..=config.max_removal)
                .min(candidate.assigned_len());
            let evicted = destroy.destroy(index, &mut candidate, &mut ledger, count, &mut rng);
            let left = repair.repair(&ctx, &mut candidate, &mut ledger, &mut rng);
            for &id in &left {
                memory.record_failure(id);
            }
            if config.intelligent_fallback && !left.is_empty() {
                fallback.repair(&ctx, &mut memory, &mut candidate, &mut ledger, &mut rng);
            }
            ledger.rebuild(index, &candidate);
            let candidate_objective = evaluate(index, &candidate, &ledger, &config.objective);
            let candidate_score = candidate_objective.score;

            // Determine score and acceptance
            let new_best = candidate_score > best_objective.score + IMPROVEMENT_EPS;
            let (accepted, score) = if new_best {
                best = candidate.clone();
                best_objective = candidate_objective;
                improvements += 1;
                (true, config.score_new_best)
            } else if candidate_score > current_objective.score + IMPROVEMENT_EPS {
                (true, config.score_improved)
            } else {
                let delta = candidate_score - current_objective.score;
                let accept_prob = (delta / temperature).exp();
                if rng.random::<f64>() < accept_prob {
                    (true, config.score_accepted)
                } else {
                    (false, 0.0)
                }
            };

            if new_best {
                no_improvement = 0;
            } else {
                no_improvement += 1;
            }

            if accepted {
                current = candidate;
                current_objective = candidate_objective;
            } else {
                ledger.restore_from(&saved);
            }

            matrix.record(d_idx, r_idx, score);

            tracing::trace!(
                iteration,
                destroy = %destroy,
                repair = %repair,
                evicted = evicted.len(),
                unassigned = current.unassigned_len(),
                candidate = candidate_score,
                accepted,
                "iteration"
            );

            best_history.push(best_objective.score);
            current_history.push(current_objective.score);

            // End-of-segment weight update and cooling
            if (iteration + 1).is_multiple_of(config.segment_length) {
                matrix.end_segment(config.reaction_factor, config.min_weight);
                temperature = (temperature * config.cooling_rate).max(config.final_temperature);
                tracing::debug!(
                    event = "segment",
                    iteration = iteration + 1,
                    temperature,
                    best = best_objective.score,
                    current = current_objective.score,
                    "weights updated"
                );
            }

            if config
                .max_no_improvement
                .is_some_and(|limit| no_improvement >= limit)
            {
                stopped_early = true;
                break;
            }
        }

        tracing::info!(
            event = "solve_end",
            iterations,
            improvements,
            cancelled,
            stopped_early,
            best = best_objective.score,
            routed = best_objective.routed,
            unassigned = best.unassigned_len(),
            "ALNS finished"
        );

        Ok(AlnsResult {
            best,
            best_objective,
            iterations,
            improvements,
            final_temperature: temperature,
            cancelled,
            stopped_early,
            weights: matrix.weights(),
            best_history,
            current_history,
        })
    }
}
