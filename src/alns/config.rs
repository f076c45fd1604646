//! ALNS configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::destroy::DestroyOperator;
use crate::error::ConfigError;
use crate::repair::RepairOperator;

/// How the search builds its starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InitialSolution {
    /// Multi-depot construction.
    #[default]
    Construction,
    /// Random order onto random feasible routes. Useful to check that the
    /// search recovers from a poor start.
    Randomized,
}

/// Weights of the objective terms.
///
/// The objective is maximized; `delivery` weighs a penalty.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObjectiveWeights {
    /// Per routed shipment.
    pub routed: f64,
    /// Per routed item.
    pub items: f64,
    /// On the on-time rate in `[0, 1]`.
    pub on_time: f64,
    /// On the average slack of routed shipments, in hours.
    pub margin: f64,
    /// On the average load factor of used flights.
    pub utilization: f64,
    /// On the average transit time of routed shipments, in hours.
    pub delivery: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            routed: 10.0,
            items: 1.0,
            on_time: 1000.0,
            margin: 2.0,
            utilization: 50.0,
            delivery: 1.0,
        }
    }
}

/// Settings of one cargo planning run.
///
/// # Scoring
///
/// Each iteration evicts some shipments with one destroy operator and
/// reinserts them with one repair operator. The pair is credited with
/// `score_new_best` when the rebuilt plan beats every plan seen so far,
/// `score_improved` when it beats the plan it started from, and
/// `score_accepted` when a worse plan is kept anyway. Credits are summed
/// over `segment_length` iterations before the pair weights move by
/// `reaction_factor`.
///
/// # Acceptance Criterion
///
/// Plans are scored higher-is-better. A worse plan survives with
/// probability `exp((candidate − current) / T)`. `T` starts at
/// `initial_temperature` and is multiplied by `cooling_rate` at the end
/// of each segment, never dropping below `final_temperature`.
///
/// # References
///
/// Ropke & Pisinger (2006), Section 3
///
/// # Examples
///
/// ```
/// use u_airfreight::alns::AlnsConfig;
///
/// let config = AlnsConfig::default()
///     .with_max_iterations(2000)
///     .with_segment_length(50)
///     .with_removal(2, 10)
///     .with_scores(33.0, 9.0, 3.0)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AlnsConfig {
    /// Enabled destroy operators. Order fixes the weight matrix rows.
    pub destroy_operators: Vec<DestroyOperator>,

    /// Enabled repair operators. Order fixes the weight matrix columns.
    pub repair_operators: Vec<RepairOperator>,

    /// Fewest shipments evicted per iteration.
    pub min_removal: usize,

    /// Most shipments evicted per iteration.
    pub max_removal: usize,

    /// Destroy/repair rounds before the run ends.
    pub max_iterations: usize,

    /// Rounds between weight updates and cooling steps.
    pub segment_length: usize,

    /// Credit when the plan beats every plan seen so far.
    pub score_new_best: f64,

    /// Credit when the plan beats the one it was rebuilt from.
    pub score_improved: f64,

    /// Credit when a worse plan is kept by the annealing test.
    pub score_accepted: f64,

    /// Share of a pair's weight replaced by its segment average, in (0, 1].
    pub reaction_factor: f64,

    /// Floor of every pair weight.
    pub min_weight: f64,

    /// Starting temperature.
    pub initial_temperature: f64,

    /// Temperature floor.
    pub final_temperature: f64,

    /// Geometric cooling per segment, in (0, 1).
    pub cooling_rate: f64,

    /// Options compared by regret insertion (at least 2).
    pub regret_k: usize,

    /// Stop after this many consecutive iterations without a new best.
    pub max_no_improvement: Option<usize>,

    /// Equal seeds give identical route maps. `None` draws one.
    pub seed: Option<u64>,

    /// Check per-minute warehouse occupancy on every insertion.
    pub temporal_validation: bool,

    /// Hand repeatedly failing shipments to the intelligent repair.
    pub intelligent_fallback: bool,

    /// Failures before a shipment reaches the intelligent repair.
    pub failure_threshold: u32,

    pub initial_solution: InitialSolution,

    pub objective: ObjectiveWeights,
}

impl Default for AlnsConfig {
    fn default() -> Self {
        Self {
            destroy_operators: DestroyOperator::ALL.to_vec(),
            repair_operators: RepairOperator::ALL.to_vec(),
            min_removal: 1,
            max_removal: 20,
            max_iterations: 1000,
            segment_length: 100,
            score_new_best: 33.0,
            score_improved: 9.0,
            score_accepted: 3.0,
            reaction_factor: 0.1,
            min_weight: 0.01,
            initial_temperature: 100.0,
            final_temperature: 0.01,
            cooling_rate: 0.9,
            regret_k: 3,
            max_no_improvement: Some(500),
            seed: None,
            temporal_validation: true,
            intelligent_fallback: true,
            failure_threshold: 3,
            initial_solution: InitialSolution::Construction,
            objective: ObjectiveWeights::default(),
        }
    }
}

impl AlnsConfig {
    pub fn with_destroy_operators(mut self, ops: impl IntoIterator<Item = DestroyOperator>) -> Self {
        self.destroy_operators = ops.into_iter().collect();
        self
    }

    pub fn with_repair_operators(mut self, ops: impl IntoIterator<Item = RepairOperator>) -> Self {
        self.repair_operators = ops.into_iter().collect();
        self
    }

    /// Shipments evicted per round; `min` is raised to 1 and `max` to `min`.
    pub fn with_removal(mut self, min: usize, max: usize) -> Self {
        self.min_removal = min.max(1);
        self.max_removal = max.max(self.min_removal);
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_segment_length(mut self, n: usize) -> Self {
        self.segment_length = n.max(1);
        self
    }

    pub fn with_scores(mut self, new_best: f64, improved: f64, accepted: f64) -> Self {
        self.score_new_best = new_best;
        self.score_improved = improved;
        self.score_accepted = accepted;
        self
    }

    pub fn with_reaction_factor(mut self, lambda: f64) -> Self {
        self.reaction_factor = lambda;
        self
    }

    /// Annealing schedule: start, per-segment factor and floor.
    pub fn with_temperature(mut self, initial: f64, cooling_rate: f64, last: f64) -> Self {
        self.initial_temperature = initial;
        self.cooling_rate = cooling_rate;
        self.final_temperature = last;
        self
    }

    pub fn with_regret_k(mut self, k: usize) -> Self {
        self.regret_k = k;
        self
    }

    /// `None` disables the early stop.
    pub fn with_max_no_improvement(mut self, n: Option<usize>) -> Self {
        self.max_no_improvement = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_temporal_validation(mut self, enabled: bool) -> Self {
        self.temporal_validation = enabled;
        self
    }

    /// Enables the fallback and sets how many failed insertions a
    /// shipment needs before it is handed over.
    pub fn with_intelligent_fallback(mut self, enabled: bool, failure_threshold: u32) -> Self {
        self.intelligent_fallback = enabled;
        self.failure_threshold = failure_threshold;
        self
    }

    pub fn with_initial_solution(mut self, initial: InitialSolution) -> Self {
        self.initial_solution = initial;
        self
    }

    pub fn with_objective(mut self, weights: ObjectiveWeights) -> Self {
        self.objective = weights;
        self
    }

    /// Rejects settings the planner cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.destroy_operators.is_empty() {
            return invalid("at least one destroy operator required".into());
        }
        if self.repair_operators.is_empty() {
            return invalid("at least one repair operator required".into());
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive".into());
        }
        if self.segment_length == 0 {
            return invalid("segment_length must be positive".into());
        }
        if self.min_removal == 0 || self.min_removal > self.max_removal {
            return invalid(format!(
                "removal range must satisfy 1 <= min <= max, got {}..={}",
                self.min_removal, self.max_removal
            ));
        }
        if self.reaction_factor <= 0.0 || self.reaction_factor > 1.0 {
            return invalid(format!(
                "reaction_factor must be in (0, 1], got {}",
                self.reaction_factor
            ));
        }
        if self.min_weight <= 0.0 {
            return invalid("min_weight must be positive".into());
        }
        if self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return invalid(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            ));
        }
        if self.initial_temperature <= 0.0 || self.final_temperature <= 0.0 {
            return invalid("temperatures must be positive".into());
        }
        if self.final_temperature > self.initial_temperature {
            return invalid("final_temperature must not exceed initial_temperature".into());
        }
        if self.regret_k < 2 {
            return invalid(format!("regret_k must be at least 2, got {}", self.regret_k));
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys take their
    /// defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_airfreight::alns::AlnsConfig;
    ///
    /// let config = AlnsConfig::from_toml_str(r#"
    ///     max_iterations = 300
    ///     seed = 7
    ///     repair_operators = ["greedy", "regret"]
    ///
    ///     [objective]
    ///     on_time = 500.0
    /// "#).unwrap();
    /// assert_eq!(config.max_iterations, 300);
    /// assert_eq!(config.repair_operators.len(), 2);
    /// assert_eq!(config.objective.routed, 10.0);
    /// ```
    #[cfg(feature = "serde")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }
}
