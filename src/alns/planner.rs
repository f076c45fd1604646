//! Planner facade.

use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::config::AlnsConfig;
use super::runner::{AlnsResult, AlnsRunner};
use crate::error::{ConfigError, SolveError};
use crate::feasibility::{validate_solution, FeasibilityReport};
use crate::index::ProblemIndex;
use crate::model::{Airport, Flight, Route, ShipmentId, ShipmentUnit};
use crate::solution::Solution;

/// Caller callbacks around a solve.
///
/// `before_solve` may change flight status or capacity (cancellations,
/// delays); the index is rebuilt from the changed flights and the search
/// treats them as ground truth.
pub trait PlannerHooks {
    fn before_solve(&mut self, _flights: &mut [Flight]) {}

    fn after_solve(&mut self, _result: &AlnsResult) {}
}

/// Owns one problem and its configuration, and keeps the latest result.
///
/// # Examples
///
/// ```
/// use u_airfreight::alns::{AlnsConfig, CargoPlanner};
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
///
/// let airports = vec![
///     Airport::new("SPIM", Continent::SouthAmerica, 20).as_depot(),
///     Airport::new("SKBO", Continent::SouthAmerica, 20),
/// ];
/// let flights = vec![Flight::new("LB1", AirportId(0), AirportId(1), 360, 540, 2)];
/// let shipments = (0..3)
///     .map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(1)).with_window(0, 2880))
///     .collect();
/// let config = AlnsConfig::default().with_max_iterations(30).with_seed(7);
///
/// let mut planner = CargoPlanner::new(airports, flights, shipments, config).unwrap();
/// planner.solve().unwrap();
/// assert_eq!(planner.best_routes().map(|r| r.len()), Some(2));
/// assert_eq!(planner.unassigned(), vec![ShipmentId(2)]);
/// ```
#[derive(Debug, Clone)]
pub struct CargoPlanner {
    index: ProblemIndex,
    config: AlnsConfig,
    result: Option<AlnsResult>,
}

impl CargoPlanner {
    /// Validates the configuration and indexes the problem.
    pub fn new(
        airports: Vec<Airport>,
        flights: Vec<Flight>,
        shipments: Vec<ShipmentUnit>,
        config: AlnsConfig,
    ) -> Result<Self, SolveError> {
        let index = ProblemIndex::new(airports, flights, shipments)?;
        Self::from_index(index, config)
    }

    pub fn from_index(index: ProblemIndex, config: AlnsConfig) -> Result<Self, SolveError> {
        config.validate()?;
        Ok(Self {
            index,
            config,
            result: None,
        })
    }

    pub fn index(&self) -> &ProblemIndex {
        &self.index
    }

    pub fn config(&self) -> &AlnsConfig {
        &self.config
    }

    /// Latest result, if a solve has run.
    pub fn result(&self) -> Option<&AlnsResult> {
        self.result.as_ref()
    }

    pub fn solve(&mut self) -> Result<&AlnsResult, SolveError> {
        self.solve_with_cancel(None)
    }

    pub fn solve_with_cancel(
        &mut self,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<&AlnsResult, SolveError> {
        let result = AlnsRunner::run_with_cancel(&self.index, &self.config, cancel)?;
        Ok(self.result.insert(result))
    }

    /// Solves with caller hooks around the search.
    pub fn solve_with_hooks<H: PlannerHooks + ?Sized>(
        &mut self,
        hooks: &mut H,
    ) -> Result<&AlnsResult, SolveError> {
        let mut flights = self.index.flights().to_vec();
        hooks.before_solve(&mut flights);
        if flights != self.index.flights() {
            tracing::info!(event = "network_changed", "flights changed before solve, rebuilding index");
            self.index = ProblemIndex::new(
                self.index.airports().to_vec(),
                flights,
                self.index.shipments().to_vec(),
            )?;
        }
        let result = AlnsRunner::run(&self.index, &self.config)?;
        hooks.after_solve(&result);
        Ok(self.result.insert(result))
    }

    /// Independent runs of the same problem under several configurations.
    ///
    /// Runs share nothing but the read-only index; with the `parallel`
    /// feature they run on the rayon pool.
    pub fn solve_portfolio(&self, configs: &[AlnsConfig]) -> Result<Vec<AlnsResult>, ConfigError> {
        #[cfg(feature = "parallel")]
        let results = configs
            .par_iter()
            .map(|c| AlnsRunner::run(&self.index, c))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let results = configs
            .iter()
            .map(|c| AlnsRunner::run(&self.index, c))
            .collect();
        results
    }

    /// No rule is broken by `solution` under this planner's settings.
    pub fn is_feasible(&self, solution: &Solution) -> bool {
        self.feasibility_report(solution).is_feasible()
    }

    pub fn feasibility_report(&self, solution: &Solution) -> FeasibilityReport {
        validate_solution(&self.index, solution, self.config.temporal_validation)
    }

    pub fn best_solution(&self) -> Option<&Solution> {
        self.result.as_ref().map(|r| &r.best)
    }

    pub fn best_routes(&self) -> Option<&BTreeMap<ShipmentId, Route>> {
        self.best_solution().map(Solution::routes)
    }

    pub fn best_objective(&self) -> Option<f64> {
        self.result.as_ref().map(|r| r.best_objective.score)
    }

    /// Current objective per iteration of the latest solve.
    pub fn objective_history(&self) -> &[f64] {
        self.result
            .as_ref()
            .map_or(&[], |r| r.current_history.as_slice())
    }

    /// Best objective per iteration of the latest solve.
    pub fn best_history(&self) -> &[f64] {
        self.result
            .as_ref()
            .map_or(&[], |r| r.best_history.as_slice())
    }

    /// Shipments the best solution leaves without a route.
    pub fn unassigned(&self) -> Vec<ShipmentId> {
        self.best_solution()
            .map(|s| s.unassigned().iter().copied().collect())
            .unwrap_or_default()
    }
}
