//! Whole-solution feasibility report.

use std::fmt;

use super::{FeasibilityChecker, Infeasible};
use crate::index::ProblemIndex;
use crate::model::{AirportId, FlightId, ShipmentId};
use crate::solution::{ResourceLedger, Solution};

/// One broken rule in a committed solution.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// A route breaks continuity, destination or promise rules.
    Route {
        shipment: ShipmentId,
        reason: Infeasible,
    },
    FlightOverbooked {
        flight: FlightId,
        reserved: u32,
        capacity: u32,
    },
    WarehouseOverloaded {
        airport: AirportId,
        load: u32,
        capacity: u32,
    },
    /// The per-minute timeline exceeds capacity somewhere in the horizon.
    TimelineOverloaded {
        airport: AirportId,
        peak: u32,
        capacity: u32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Route { shipment, reason } => write!(f, "{shipment}: {reason}"),
            Violation::FlightOverbooked {
                flight,
                reserved,
                capacity,
            } => write!(f, "{flight} carries {reserved} units, capacity {capacity}"),
            Violation::WarehouseOverloaded {
                airport,
                load,
                capacity,
            } => write!(f, "{airport} receives {load} units, capacity {capacity}"),
            Violation::TimelineOverloaded {
                airport,
                peak,
                capacity,
            } => write!(f, "{airport} holds up to {peak} units at once, capacity {capacity}"),
        }
    }
}

/// Structured outcome of [`validate_solution`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeasibilityReport {
    pub violations: Vec<Violation>,
    /// Shipments without a route.
    pub unassigned: Vec<ShipmentId>,
}

impl FeasibilityReport {
    /// True when no rule is broken. Unassigned shipments do not make a
    /// solution infeasible.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Replays `solution` into a fresh ledger and lists every violated rule.
///
/// Never panics on caller-built routes: unknown shipments, flights and
/// airports become [`Violation::Route`] entries.
///
/// # Examples
///
/// ```
/// use u_airfreight::feasibility::validate_solution;
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, FlightId, ShipmentId, ShipmentUnit};
/// use u_airfreight::solution::Solution;
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 10).as_depot(),
///         Airport::new("B", Continent::Europe, 10),
///     ],
///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 1)],
///     vec![
///         ShipmentUnit::new(ShipmentId(1), AirportId(1)).with_window(0, 2880),
///         ShipmentUnit::new(ShipmentId(2), AirportId(1)).with_window(0, 2880),
///     ],
/// ).unwrap();
///
/// let route = index.schedule(&[FlightId(0)], 0).unwrap();
/// let mut sol = Solution::unassigned_from(&index);
/// sol.assign(ShipmentId(1), route.clone());
/// assert!(validate_solution(&index, &sol, true).is_feasible());
///
/// sol.assign(ShipmentId(2), route);
/// assert!(!validate_solution(&index, &sol, true).is_feasible());
/// ```
pub fn validate_solution(
    index: &ProblemIndex,
    solution: &Solution,
    temporal: bool,
) -> FeasibilityReport {
    let checker = FeasibilityChecker::new(index, temporal);
    let mut report = FeasibilityReport {
        violations: Vec::new(),
        unassigned: solution.unassigned().iter().copied().collect(),
    };

    // Routes with dangling references are reported but never booked.
    let mut ledger = ResourceLedger::new(index, temporal);
    for (&id, route) in solution.routes() {
        let Some(shipment) = index.shipment(id) else {
            report.violations.push(Violation::Route {
                shipment: id,
                reason: Infeasible::UnknownShipment(id),
            });
            continue;
        };
        match checker.check_route_rules(shipment, route) {
            Err(reason @ (Infeasible::UnknownFlight { .. } | Infeasible::UnknownAirport { .. })) => {
                report.violations.push(Violation::Route {
                    shipment: id,
                    reason,
                });
                continue;
            }
            Err(reason) => report.violations.push(Violation::Route {
                shipment: id,
                reason,
            }),
            Ok(()) => {}
        }
        ledger.reserve(shipment, route);
    }

    for (i, flight) in index.flights().iter().enumerate() {
        let reserved = ledger.flight_reserved(FlightId(i));
        if reserved > flight.capacity {
            report.violations.push(Violation::FlightOverbooked {
                flight: FlightId(i),
                reserved,
                capacity: flight.capacity,
            });
        }
    }
    for (i, airport) in index.airports().iter().enumerate() {
        let id = AirportId(i);
        let load = ledger.airport_load(id);
        if load > airport.warehouse_capacity {
            report.violations.push(Violation::WarehouseOverloaded {
                airport: id,
                load,
                capacity: airport.warehouse_capacity,
            });
        }
        if let Some(timeline) = ledger.timeline() {
            let peak = timeline.horizon_peak(id);
            if peak > airport.warehouse_capacity {
                report.violations.push(Violation::TimelineOverloaded {
                    airport: id,
                    peak,
                    capacity: airport.warehouse_capacity,
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::model::Route;

    #[test]
    fn test_empty_solution_is_feasible() {
        let index = index(5, 3);
        let report = validate_solution(&index, &Solution::unassigned_from(&index), true);
        assert!(report.is_feasible());
        assert_eq!(report.unassigned.len(), 3);
    }

    #[test]
    fn test_reports_route_rule_violation() {
        let index = index(5, 2);
        let mut sol = Solution::new();
        // shipment 0 goes to MAD, not BOG
        sol.assign(ShipmentId(0), index.schedule(&[FlightId(0)], 0).unwrap());
        let report = validate_solution(&index, &sol, false);
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            Violation::Route {
                reason: Infeasible::WrongDestination { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_reports_overbooking() {
        let index = index(1, 4);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let mut sol = Solution::new();
        sol.assign(ShipmentId(0), route.clone());
        sol.assign(ShipmentId(2), route);
        let report = validate_solution(&index, &sol, false);
        assert_eq!(
            report.violations,
            vec![Violation::FlightOverbooked {
                flight: FlightId(2),
                reserved: 2,
                capacity: 1,
            }]
        );
        assert!(report.violations[0].to_string().contains("capacity 1"));
    }

    #[test]
    fn test_unknown_flight_is_reported_not_booked() {
        let index = index(5, 2);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let mut segs = route.segments().to_vec();
        segs[0].flight = FlightId(999);
        let mut sol = Solution::new();
        sol.assign(ShipmentId(0), Route::new(segs));

        let report = validate_solution(&index, &sol, true);
        assert_eq!(
            report.violations,
            vec![Violation::Route {
                shipment: ShipmentId(0),
                reason: Infeasible::UnknownFlight {
                    position: 0,
                    flight: FlightId(999),
                },
            }]
        );
    }

    #[test]
    fn test_unknown_airport_is_reported() {
        let index = index(5, 2);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let mut segs = route.segments().to_vec();
        segs[0].destination = AirportId(42);
        let mut sol = Solution::new();
        sol.assign(ShipmentId(0), Route::new(segs));
        sol.assign(ShipmentId(1), index.schedule(&[FlightId(7)], 0).unwrap());

        let report = validate_solution(&index, &sol, false);
        assert_eq!(report.violations.len(), 1);
        assert!(matches!(
            report.violations[0],
            Violation::Route {
                reason: Infeasible::UnknownAirport { airport: AirportId(42), .. },
                ..
            }
        ));
    }

    #[test]
    fn test_empty_route_away_from_destination() {
        let index = index(5, 1);
        let mut sol = Solution::new();
        sol.assign(ShipmentId(0), Route::empty());
        let report = validate_solution(&index, &sol, false);
        // empty route for a unit that is not at its destination
        assert!(!report.is_feasible());
    }
}
