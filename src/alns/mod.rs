//! Adaptive Large Neighborhood Search (ALNS) controller.
//!
//! Each iteration draws a destroy/repair pair by roulette over a weight
//! matrix, evicts part of the current solution, reinserts what fits and
//! accepts or rejects the result with a simulated-annealing test. Pair
//! weights adapt at the end of every segment from the scores the pair
//! earned.
//!
//! # References
//!
//! Ropke & Pisinger (2006), "An Adaptive Large Neighborhood Search Heuristic
//! for the Pickup and Delivery Problem with Time Windows"

mod config;
mod objective;
mod planner;
mod runner;
mod stats;

pub use config::{AlnsConfig, InitialSolution, ObjectiveWeights};
pub use objective::{evaluate, is_on_time, Objective};
pub use planner::{CargoPlanner, PlannerHooks};
pub use runner::{AlnsResult, AlnsRunner};
pub use stats::OperatorMatrix;
