//! Problem entities: airports, flights, shipment units and routes.
//!
//! Entities are created once from external input and never mutated by the
//! search. Mutable resource counters live in
//! [`ResourceLedger`](crate::solution::ResourceLedger).

mod airport;
mod flight;
mod ids;
mod route;
mod shipment;
pub mod time;

pub use airport::{Airport, Continent};
pub use flight::{Flight, FlightStatus};
pub use ids::{AirportId, FlightId, ShipmentId};
pub use route::{Route, Segment, CROSS_CONTINENT_LEG_COST, SAME_CONTINENT_LEG_COST};
pub use shipment::{unitize_orders, Order, Origin, Priority, ShipmentUnit};
pub use time::Minute;

/// Remaining time budget after the route's transit time, in hours.
///
/// Uses one formula everywhere: `budget − (Σ block time + 2h × layovers)`,
/// clamped at zero.
pub fn slack_hours(shipment: &ShipmentUnit, route: &Route) -> f64 {
    (shipment.budget_hours() - route.transit_hours()).max(0.0)
}
