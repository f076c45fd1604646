//! Multi-depot air cargo routing with Adaptive Large Neighborhood Search.
//!
//! Assigns shipment units to itineraries through a time-tabled flight
//! network under flight capacity, warehouse capacity and delivery
//! deadlines, choosing per shipment which depot to ship from.
//!
//! - **Model** ([`model`]): airports, flights, shipment units, routes.
//! - **Index** ([`index`]): read-only lookups, adjacency, shortest paths
//!   and flight scheduling.
//! - **Solution** ([`solution`]): route map plus the [`ResourceLedger`]
//!   of flight reservations and warehouse occupancy.
//! - **Feasibility** ([`feasibility`]): the insertion oracle and the
//!   whole-solution report.
//! - **Ranking** ([`ranking`]): rule composition used by operators that
//!   order shipments or routes on several criteria.
//! - **Destroy / Repair** ([`destroy`], [`repair`]): the operator
//!   portfolio.
//! - **ALNS** ([`alns`]): adaptive controller, objective and the
//!   [`CargoPlanner`] facade.
//!
//! # Examples
//!
//! ```
//! use u_airfreight::{AlnsConfig, CargoPlanner};
//! use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
//!
//! let airports = vec![
//!     Airport::new("SPIM", Continent::SouthAmerica, 50).as_depot(),
//!     Airport::new("EBCI", Continent::Europe, 50).as_depot(),
//!     Airport::new("LEMD", Continent::Europe, 50),
//! ];
//! let flights = vec![
//!     Flight::new("LIM-MAD", AirportId(0), AirportId(2), 600, 1380, 4),
//!     Flight::new("BRU-MAD", AirportId(1), AirportId(2), 900, 1040, 4),
//! ];
//! let shipments = (0..6)
//!     .map(|i| ShipmentUnit::new(ShipmentId(i), AirportId(2)).with_window(0, 3 * 1440))
//!     .collect();
//!
//! let config = AlnsConfig::default().with_max_iterations(100).with_seed(42);
//! let mut planner = CargoPlanner::new(airports, flights, shipments, config).unwrap();
//! let result = planner.solve().unwrap();
//! assert_eq!(result.best.assigned_len(), 6);
//! assert!(planner.is_feasible(planner.best_solution().unwrap()));
//! ```

pub mod alns;
pub mod destroy;
pub mod error;
pub mod feasibility;
pub mod index;
pub mod model;
pub mod random;
pub mod ranking;
pub mod repair;
pub mod solution;

pub use alns::{AlnsConfig, AlnsResult, AlnsRunner, CargoPlanner, PlannerHooks};
pub use error::{ConfigError, ModelError, SolveError};
pub use feasibility::{FeasibilityChecker, FeasibilityReport, Infeasible};
pub use index::ProblemIndex;
pub use solution::{ResourceLedger, Solution};
