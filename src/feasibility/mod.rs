//! Feasibility validation.
//!
//! [`FeasibilityChecker`] decides whether a candidate route may be added
//! for a shipment given the current [`ResourceLedger`]. The checks are
//! pure: nothing is reserved or mutated. Checks run in a fixed order and
//! the first failure is reported:
//!
//! 0. every flight and airport of the route exists in the index
//! 1. flight and warehouse capacity (and that every flight still operates)
//! 2. airport continuity from the shipment's start
//! 3. arrival at the shipment's destination
//! 4. delivery promise and deadline budget
//! 5. optionally, per-minute warehouse occupancy over the horizon
//!
//! [`validate_solution`] applies the same rules to a whole solution.

mod reason;
mod report;

use crate::index::ProblemIndex;
use crate::model::time::CONNECTION_MINUTES;
use crate::model::{AirportId, Route, ShipmentId, ShipmentUnit};
use crate::solution::{warehouse_stays, ResourceLedger};

pub use reason::Infeasible;
pub use report::{validate_solution, FeasibilityReport, Violation};

/// Route oracle used by repair operators before every commit.
///
/// # Examples
///
/// ```
/// use u_airfreight::feasibility::{FeasibilityChecker, Infeasible};
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, FlightId, ShipmentId, ShipmentUnit};
/// use u_airfreight::solution::ResourceLedger;
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
/// let checker = FeasibilityChecker::new(&index, false);
/// let mut ledger = ResourceLedger::new(&index, false);
/// let route = index.schedule(&[FlightId(0)], 0).unwrap();
///
/// assert!(checker.check(ShipmentId(1), &route, &ledger).is_ok());
/// ledger.reserve(index.shipment(ShipmentId(1)).unwrap(), &route);
/// assert!(matches!(
///     checker.check(ShipmentId(2), &route, &ledger),
///     Err(Infeasible::FlightFull { .. })
/// ));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FeasibilityChecker<'a> {
    index: &'a ProblemIndex,
    temporal: bool,
}

impl<'a> FeasibilityChecker<'a> {
    /// Creates a checker; `temporal` enables the per-minute warehouse check
    /// whenever the ledger carries a timeline.
    pub fn new(index: &'a ProblemIndex, temporal: bool) -> Self {
        Self { index, temporal }
    }

    pub fn index(&self) -> &'a ProblemIndex {
        self.index
    }

    pub fn is_temporal(&self) -> bool {
        self.temporal
    }

    /// Checks whether `route` may be added for shipment `id`.
    pub fn check(
        &self,
        id: ShipmentId,
        route: &Route,
        ledger: &ResourceLedger,
    ) -> Result<(), Infeasible> {
        let shipment = self
            .index
            .shipment(id)
            .ok_or(Infeasible::UnknownShipment(id))?;
        self.check_unit(shipment, route, ledger)
    }

    /// Same as [`check`](Self::check) for an already resolved shipment.
    pub fn check_unit(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
        ledger: &ResourceLedger,
    ) -> Result<(), Infeasible> {
        self.check_references(route)?;
        self.check_capacity(shipment, route, ledger)?;
        self.check_route_rules(shipment, route)?;
        if self.temporal {
            self.check_timeline(shipment, route, ledger)?;
        }
        Ok(())
    }

    pub fn is_feasible(&self, id: ShipmentId, route: &Route, ledger: &ResourceLedger) -> bool {
        self.check(id, route, ledger).is_ok()
    }

    /// Capacity-independent rules: references, continuity, destination,
    /// promise.
    pub fn check_route_rules(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
    ) -> Result<(), Infeasible> {
        self.check_references(route)?;
        self.check_continuity(shipment, route)?;
        self.check_destination(shipment, route)?;
        self.check_promise(shipment, route)
    }

    /// Every segment names a flight and airports known to the index.
    ///
    /// Routes built by the planner always pass; caller-supplied routes are
    /// checked here before any other rule looks them up.
    pub fn check_references(&self, route: &Route) -> Result<(), Infeasible> {
        let flights = self.index.flights().len();
        let airports = self.index.airports().len();
        for (position, seg) in route.segments().iter().enumerate() {
            if seg.flight.0 >= flights {
                return Err(Infeasible::UnknownFlight {
                    position,
                    flight: seg.flight,
                });
            }
            if let Some(&airport) = [seg.origin, seg.destination]
                .iter()
                .find(|a| a.0 >= airports)
            {
                return Err(Infeasible::UnknownAirport { position, airport });
            }
        }
        Ok(())
    }

    /// Every flight operates and has room; every receiving warehouse has room.
    pub fn check_capacity(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
        ledger: &ResourceLedger,
    ) -> Result<(), Infeasible> {
        let needed = shipment.items;
        for seg in route.segments() {
            if !self.index.flight(seg.flight).is_operational() {
                return Err(Infeasible::FlightCancelled { flight: seg.flight });
            }
            let spare = ledger.flight_spare(self.index, seg.flight);
            if spare < needed {
                return Err(Infeasible::FlightFull {
                    flight: seg.flight,
                    spare,
                    needed,
                });
            }
            let spare = ledger.airport_spare(self.index, seg.destination);
            if spare < needed {
                return Err(Infeasible::WarehouseFull {
                    airport: seg.destination,
                    spare,
                    needed,
                });
            }
        }
        Ok(())
    }

    /// Segments chain from the shipment's start, match their flights, and
    /// respect the connection buffer.
    pub fn check_continuity(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
    ) -> Result<(), Infeasible> {
        let mut expected: Option<AirportId> = shipment.start();
        let mut previous_arrival = None;
        for (position, seg) in route.segments().iter().enumerate() {
            let flight = self.index.flight(seg.flight);
            if flight.origin != seg.origin || flight.destination != seg.destination {
                return Err(Infeasible::SegmentMismatch {
                    position,
                    flight: seg.flight,
                });
            }
            match expected {
                Some(at) if at != seg.origin => {
                    return Err(Infeasible::Discontinuous {
                        position,
                        expected: at,
                        found: seg.origin,
                    });
                }
                None if !self.index.is_depot(seg.origin) => {
                    return Err(Infeasible::NotADepot(seg.origin));
                }
                _ => {}
            }
            if let Some(arrival) = previous_arrival {
                if seg.departure < arrival + CONNECTION_MINUTES {
                    return Err(Infeasible::ConnectionTooShort { position });
                }
            }
            expected = Some(seg.destination);
            previous_arrival = Some(seg.arrival);
        }
        Ok(())
    }

    /// The route ends at the destination, or is empty with the unit
    /// already there.
    pub fn check_destination(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
    ) -> Result<(), Infeasible> {
        let end = match route.destination() {
            Some(end) => Some(end),
            None => match shipment.start() {
                Some(start) => Some(start),
                // an unconstrained unit can be fulfilled at a depot that is
                // also its destination
                None if self.index.is_depot(shipment.destination) => Some(shipment.destination),
                None => None,
            },
        };
        if end == Some(shipment.destination) {
            Ok(())
        } else {
            Err(Infeasible::WrongDestination {
                expected: shipment.destination,
                found: end,
            })
        }
    }

    /// Transit fits the continent promise and the deadline budget.
    ///
    /// Both bounds compare transit time (block times plus one connection
    /// per layover) with the allowance. Waiting for the first departure, or
    /// beyond the connection buffer at a layover, is not counted. A route can therefore pass while its scheduled arrival
    /// is after the deadline. The objective scores such a route as late
    /// through [`is_on_time`](crate::alns::is_on_time).
    ///
    /// Empty routes always pass. Missing timestamps fail closed.
    pub fn check_promise(&self, shipment: &ShipmentUnit, route: &Route) -> Result<(), Infeasible> {
        let Some(origin) = route.origin() else {
            return Ok(());
        };
        let transit_hours = route.transit_hours();
        let promise_hours = self.index.promise_hours(origin, shipment.destination);
        if transit_hours > promise_hours {
            return Err(Infeasible::PromiseExceeded {
                transit_hours,
                promise_hours,
            });
        }
        let budget_hours = match shipment.budget_minutes() {
            Some(_) => shipment.budget_hours(),
            None => return Err(Infeasible::MissingTimestamps),
        };
        if transit_hours > budget_hours {
            return Err(Infeasible::DeadlineExceeded {
                transit_hours,
                budget_hours,
            });
        }
        Ok(())
    }

    /// Per-minute warehouse occupancy stays within capacity for every
    /// minute the unit would be held. Skipped when the ledger has no
    /// timeline.
    pub fn check_timeline(
        &self,
        shipment: &ShipmentUnit,
        route: &Route,
        ledger: &ResourceLedger,
    ) -> Result<(), Infeasible> {
        let Some(timeline) = ledger.timeline() else {
            return Ok(());
        };
        for stay in warehouse_stays(shipment, route) {
            let capacity = self.index.airport(stay.airport).warehouse_capacity;
            if timeline.peak(stay.airport, stay.from, stay.to) + shipment.items <= capacity {
                continue;
            }
            let minute = (stay.from..stay.to)
                .find(|&m| timeline.at(stay.airport, m) + shipment.items > capacity)
                .unwrap_or(stay.from);
            return Err(Infeasible::WarehouseOverflow {
                airport: stay.airport,
                minute,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::model::time::MINUTES_PER_DAY;
    use crate::model::{Airport, Continent, Flight, FlightId, FlightStatus, Segment};

    fn checker(index: &ProblemIndex) -> FeasibilityChecker<'_> {
        FeasibilityChecker::new(index, true)
    }

    #[test]
    fn test_direct_route_feasible() {
        let index = index(5, 2);
        let ledger = ResourceLedger::new(&index, true);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        assert!(checker(&index).is_feasible(ShipmentId(0), &route, &ledger));
    }

    #[test]
    fn test_unknown_shipment() {
        let index = index(5, 0);
        let ledger = ResourceLedger::new(&index, false);
        assert_eq!(
            checker(&index).check(ShipmentId(9), &Route::empty(), &ledger),
            Err(Infeasible::UnknownShipment(ShipmentId(9)))
        );
    }

    #[test]
    fn test_full_flight() {
        let index = index(1, 2);
        let mut ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        ledger.reserve(index.shipment(ShipmentId(0)).unwrap(), &route);
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::FlightFull { spare: 0, .. }));
    }

    #[test]
    fn test_full_warehouse() {
        let mut airports = airports();
        airports[MAD.0].warehouse_capacity = 0;
        let index = ProblemIndex::new(airports, flights(5), shipments(1)).unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::WarehouseFull { airport, .. } if airport == MAD));
    }

    #[test]
    fn test_cancelled_flight_rejected() {
        let mut flights = flights(5);
        flights[2].status = FlightStatus::Cancelled;
        let index = ProblemIndex::new(airports(), flights, shipments(1)).unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let seg = Segment {
            flight: FlightId(2),
            origin: LIM,
            destination: MAD,
            duration: 780,
            same_continent: false,
            departure: 600,
            arrival: 1380,
        };
        let err = checker(&index)
            .check(ShipmentId(0), &Route::new(vec![seg]), &ledger)
            .unwrap_err();
        assert_eq!(err, Infeasible::FlightCancelled { flight: FlightId(2) });
    }

    #[test]
    fn test_fixed_origin_mismatch() {
        let index = ProblemIndex::new(
            airports(),
            flights(5),
            vec![ShipmentUnit::new(ShipmentId(0), MAD)
                .with_origin(BOG)
                .with_window(0, 4000)],
        )
        .unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::Discontinuous { expected, .. } if expected == BOG));
    }

    #[test]
    fn test_any_depot_requires_depot_start() {
        let index = index(5, 2);
        let ledger = ResourceLedger::new(&index, false);
        // UIO is not a depot
        let route = index.schedule(&[FlightId(6)], 0).unwrap();
        let unit = ShipmentUnit::new(ShipmentId(5), LIM).with_window(0, 4000);
        assert_eq!(
            checker(&index).check_unit(&unit, &route, &ledger),
            Err(Infeasible::NotADepot(UIO))
        );
    }

    #[test]
    fn test_wrong_destination() {
        let index = index(5, 2);
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(0)], 0).unwrap();
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::WrongDestination { found: Some(f), .. } if f == BOG));
    }

    #[test]
    fn test_empty_route_at_destination() {
        let index = index(5, 0);
        let ledger = ResourceLedger::new(&index, true);
        let c = checker(&index);
        let at_home = ShipmentUnit::new(ShipmentId(1), LIM).with_origin(LIM);
        assert!(c.check_unit(&at_home, &Route::empty(), &ledger).is_ok());
        let depot_dest = ShipmentUnit::new(ShipmentId(2), BRU);
        assert!(c.check_unit(&depot_dest, &Route::empty(), &ledger).is_ok());
        let away = ShipmentUnit::new(ShipmentId(3), MAD);
        assert!(c.check_unit(&away, &Route::empty(), &ledger).is_err());
    }

    #[test]
    fn test_deadline_exceeded() {
        let index = ProblemIndex::new(
            airports(),
            flights(5),
            vec![ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 600)],
        )
        .unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::DeadlineExceeded { .. }));
    }

    #[test]
    fn test_missing_timestamps_fail_closed() {
        let index = ProblemIndex::new(
            airports(),
            flights(5),
            vec![ShipmentUnit::new(ShipmentId(0), MAD)],
        )
        .unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        assert_eq!(
            checker(&index).check(ShipmentId(0), &route, &ledger),
            Err(Infeasible::MissingTimestamps)
        );
    }

    #[test]
    fn test_promise_exceeded_same_continent() {
        // two 23h20 same-continent hops plus a layover break the 48h promise
        let airports = vec![
            Airport::new("A", Continent::Asia, 10).as_depot(),
            Airport::new("B", Continent::Asia, 10),
            Airport::new("C", Continent::Asia, 10),
            Airport::new("D", Continent::Asia, 10),
        ];
        let flights = vec![
            Flight::new("AB", AirportId(0), AirportId(1), 0, 1400, 5),
            Flight::new("BC", AirportId(1), AirportId(2), 0, 1400, 5),
        ];
        let unit = ShipmentUnit::new(ShipmentId(0), AirportId(2)).with_window(0, 10 * MINUTES_PER_DAY);
        let index = ProblemIndex::new(airports, flights, vec![unit]).unwrap();
        let ledger = ResourceLedger::new(&index, false);
        let route = index.schedule(&[FlightId(0), FlightId(1)], 0).unwrap();
        assert!(route.transit_hours() > 48.0);
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::PromiseExceeded { .. }));
    }

    /// A → B → C → D across two continents, every leg `block` minutes.
    fn three_leg_route(block: i64) -> (ProblemIndex, Route) {
        let airports = vec![
            Airport::new("A", Continent::SouthAmerica, 10).as_depot(),
            Airport::new("B", Continent::SouthAmerica, 10),
            Airport::new("C", Continent::Europe, 10),
            Airport::new("D", Continent::Europe, 10),
        ];
        let arrival = block as u32;
        let flights = vec![
            Flight::new("AB", AirportId(0), AirportId(1), 0, arrival, 5),
            Flight::new("BC", AirportId(1), AirportId(2), 0, arrival, 5),
            Flight::new("CD", AirportId(2), AirportId(3), 0, arrival, 5),
        ];
        let unit = ShipmentUnit::new(ShipmentId(0), AirportId(3)).with_window(0, 10 * MINUTES_PER_DAY);
        let index = ProblemIndex::new(airports, flights, vec![unit]).unwrap();
        let route = index
            .schedule(&[FlightId(0), FlightId(1), FlightId(2)], 0)
            .unwrap();
        (index, route)
    }

    #[test]
    fn test_cross_continent_promise_bound() {
        // 3 × 22h20 + 2 × 2h = 71h
        let (index, route) = three_leg_route(1340);
        assert!((route.transit_hours() - 71.0).abs() < 1e-9);
        let ledger = ResourceLedger::new(&index, false);
        assert!(checker(&index).check(ShipmentId(0), &route, &ledger).is_ok());

        // 3 × 23h20 + 2 × 2h = 74h
        let (index, route) = three_leg_route(1400);
        assert!((route.transit_hours() - 74.0).abs() < 1e-9);
        let ledger = ResourceLedger::new(&index, false);
        assert!(matches!(
            checker(&index).check(ShipmentId(0), &route, &ledger),
            Err(Infeasible::PromiseExceeded { promise_hours, .. }) if promise_hours == 72.0
        ));
    }

    #[test]
    fn test_budget_counts_transit_not_waiting() {
        // BRU-MAD leaves at 15:00: 2h20 in the air fits a 10h budget even
        // though the unit lands after its deadline
        let index = index(5, 0);
        let ledger = ResourceLedger::new(&index, true);
        let unit = ShipmentUnit::new(ShipmentId(7), MAD)
            .with_origin(BRU)
            .with_window(0, 600);
        let route = index.schedule(&[FlightId(4)], 0).unwrap();
        assert!(route.arrival().unwrap() > 600);
        assert!(checker(&index).check_unit(&unit, &route, &ledger).is_ok());
        assert!(!crate::alns::is_on_time(&unit, &route));
    }

    #[test]
    fn test_unknown_flight_rejected_before_lookup() {
        let index = index(5, 2);
        let ledger = ResourceLedger::new(&index, true);
        let mut segs = index.schedule(&[FlightId(2)], 0).unwrap().segments().to_vec();
        segs[0].flight = FlightId(999);
        assert_eq!(
            checker(&index).check(ShipmentId(0), &Route::new(segs.clone()), &ledger),
            Err(Infeasible::UnknownFlight {
                position: 0,
                flight: FlightId(999),
            })
        );

        segs[0].flight = FlightId(2);
        segs[0].origin = AirportId(77);
        assert_eq!(
            checker(&index).check_route_rules(index.shipment(ShipmentId(0)).unwrap(), &Route::new(segs)),
            Err(Infeasible::UnknownAirport {
                position: 0,
                airport: AirportId(77),
            })
        );
    }

    #[test]
    fn test_connection_too_short() {
        let index = index(5, 2);
        let ledger = ResourceLedger::new(&index, false);
        let mut route = index.schedule(&[FlightId(0), FlightId(1)], 0).unwrap();
        let mut segs = route.segments().to_vec();
        segs[1].departure = segs[0].arrival + 30;
        segs[1].arrival = segs[1].departure + segs[1].duration;
        route = Route::new(segs);
        let err = checker(&index)
            .check(ShipmentId(0), &route, &ledger)
            .unwrap_err();
        assert_eq!(err, Infeasible::ConnectionTooShort { position: 1 });
    }

    #[test]
    fn test_timeline_overflow() {
        let mut airports = airports();
        airports[LIM.0].warehouse_capacity = 1;
        let index = ProblemIndex::new(airports, flights(5), shipments(4)).unwrap();
        let mut ledger = ResourceLedger::new(&index, true);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        ledger.reserve(index.shipment(ShipmentId(0)).unwrap(), &route);
        let err = checker(&index)
            .check(ShipmentId(2), &route, &ledger)
            .unwrap_err();
        assert!(matches!(err, Infeasible::WarehouseOverflow { airport, minute: 480 } if airport == LIM));

        // the aggregate check alone does not see origin stays
        let plain = FeasibilityChecker::new(&index, false);
        assert!(plain.check(ShipmentId(2), &route, &ledger).is_ok());
    }
}
