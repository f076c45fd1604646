//! Read-only problem index.
//!
//! Built once from the raw entity lists, the index gives O(1) entity
//! lookup, adjacency queries over operational flights, connection
//! discovery by breadth-first search and flight scheduling. It is never
//! mutated by the search; rebuild it when the flight or airport set
//! changes (for example after cancellations are injected).

mod paths;

use std::collections::HashMap;

use crate::error::ModelError;
use crate::model::time::{CROSS_CONTINENT_PROMISE_HOURS, SAME_CONTINENT_PROMISE_HOURS};
use crate::model::{
    Airport, AirportId, Continent, Flight, FlightId, Origin, ShipmentId, ShipmentUnit,
};

pub use paths::PathEstimate;

/// Lookup structure over airports, flights and shipments.
///
/// # Examples
///
/// ```
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, ShipmentId, ShipmentUnit};
///
/// let airports = vec![
///     Airport::new("SPIM", Continent::SouthAmerica, 100).as_depot(),
///     Airport::new("SKBO", Continent::SouthAmerica, 100),
/// ];
/// let flights = vec![Flight::new("F1", AirportId(0), AirportId(1), 480, 660, 50)];
/// let shipments = vec![ShipmentUnit::new(ShipmentId(1), AirportId(1))];
///
/// let index = ProblemIndex::new(airports, flights, shipments).unwrap();
/// assert_eq!(index.airport_id("SKBO"), Some(AirportId(1)));
/// assert_eq!(index.depots(), &[AirportId(0)]);
/// assert!(index.has_direct(AirportId(0), AirportId(1)));
/// ```
#[derive(Debug, Clone)]
pub struct ProblemIndex {
    airports: Vec<Airport>,
    flights: Vec<Flight>,
    shipments: Vec<ShipmentUnit>,
    airport_by_code: HashMap<String, AirportId>,
    flight_by_code: HashMap<String, FlightId>,
    shipment_pos: HashMap<ShipmentId, usize>,
    outgoing: Vec<Vec<FlightId>>,
    same_continent: Vec<bool>,
    depots: Vec<AirportId>,
}

impl ProblemIndex {
    /// Builds the index, validating every cross reference.
    pub fn new(
        airports: Vec<Airport>,
        flights: Vec<Flight>,
        shipments: Vec<ShipmentUnit>,
    ) -> Result<Self, ModelError> {
        let mut airport_by_code = HashMap::with_capacity(airports.len());
        for (i, a) in airports.iter().enumerate() {
            if airport_by_code.insert(a.code.clone(), AirportId(i)).is_some() {
                return Err(ModelError::DuplicateAirport(a.code.clone()));
            }
        }

        let known = |id: AirportId| id.0 < airports.len();

        let mut flight_by_code = HashMap::with_capacity(flights.len());
        let mut outgoing = vec![Vec::new(); airports.len()];
        let mut same_continent = Vec::with_capacity(flights.len());
        for (i, f) in flights.iter().enumerate() {
            for end in [f.origin, f.destination] {
                if !known(end) {
                    return Err(ModelError::UnknownFlightAirport {
                        flight: f.code.clone(),
                        airport: end,
                    });
                }
            }
            if f.origin == f.destination {
                return Err(ModelError::SelfLoopFlight(f.code.clone()));
            }
            if f.capacity == 0 {
                return Err(ModelError::ZeroCapacityFlight(f.code.clone()));
            }
            for minute in [f.departure, f.arrival] {
                if minute >= 1440 {
                    return Err(ModelError::InvalidTimeOfDay {
                        flight: f.code.clone(),
                        minute,
                    });
                }
            }
            if flight_by_code.insert(f.code.clone(), FlightId(i)).is_some() {
                return Err(ModelError::DuplicateFlight(f.code.clone()));
            }
            same_continent
                .push(airports[f.origin.0].continent == airports[f.destination.0].continent);
            if f.is_operational() {
                outgoing[f.origin.0].push(FlightId(i));
            }
        }
        for list in &mut outgoing {
            list.sort_by_key(|&fid| {
                let f = &flights[fid.0];
                (f.departure as i64 + f.delay_minutes(), fid.0)
            });
        }

        let mut shipment_pos = HashMap::with_capacity(shipments.len());
        for (i, s) in shipments.iter().enumerate() {
            if shipment_pos.insert(s.id, i).is_some() {
                return Err(ModelError::DuplicateShipment(s.id));
            }
            if s.items == 0 {
                return Err(ModelError::EmptyShipment(s.id));
            }
            let mut refs = vec![s.destination];
            if let Origin::Fixed(o) = s.origin {
                refs.push(o);
            }
            refs.extend(s.location);
            if let Some(&bad) = refs.iter().find(|&&a| !known(a)) {
                return Err(ModelError::UnknownShipmentAirport {
                    shipment: s.id,
                    airport: bad,
                });
            }
        }

        let depots = airports
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_depot)
            .map(|(i, _)| AirportId(i))
            .collect();

        Ok(Self {
            airports,
            flights,
            shipments,
            airport_by_code,
            flight_by_code,
            shipment_pos,
            outgoing,
            same_continent,
            depots,
        })
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn airport(&self, id: AirportId) -> &Airport {
        &self.airports[id.0]
    }

    pub fn airport_id(&self, code: &str) -> Option<AirportId> {
        self.airport_by_code.get(code).copied()
    }

    pub fn continent(&self, id: AirportId) -> Continent {
        self.airports[id.0].continent
    }

    pub fn depots(&self) -> &[AirportId] {
        &self.depots
    }

    pub fn is_depot(&self, id: AirportId) -> bool {
        self.airports[id.0].is_depot
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn flight(&self, id: FlightId) -> &Flight {
        &self.flights[id.0]
    }

    pub fn flight_id(&self, code: &str) -> Option<FlightId> {
        self.flight_by_code.get(code).copied()
    }

    pub fn is_same_continent(&self, id: FlightId) -> bool {
        self.same_continent[id.0]
    }

    pub fn shipments(&self) -> &[ShipmentUnit] {
        &self.shipments
    }

    pub fn shipment(&self, id: ShipmentId) -> Option<&ShipmentUnit> {
        self.shipment_pos.get(&id).map(|&i| &self.shipments[i])
    }

    /// Operational flights leaving `airport`, by departure minute of day.
    pub fn outgoing(&self, airport: AirportId) -> &[FlightId] {
        &self.outgoing[airport.0]
    }

    /// Operational flights from `from` straight to `to`.
    pub fn direct_flights(
        &self,
        from: AirportId,
        to: AirportId,
    ) -> impl Iterator<Item = FlightId> + '_ {
        self.outgoing[from.0]
            .iter()
            .copied()
            .filter(move |&f| self.flights[f.0].destination == to)
    }

    pub fn has_direct(&self, from: AirportId, to: AirportId) -> bool {
        self.direct_flights(from, to).next().is_some()
    }

    pub fn distance_km(&self, a: AirportId, b: AirportId) -> f64 {
        self.airports[a.0].distance_km(&self.airports[b.0])
    }

    /// Airports a shipment may start from.
    ///
    /// A fixed origin or current location yields one airport; otherwise
    /// every depot is eligible.
    pub fn eligible_origins(&self, shipment: &ShipmentUnit) -> Vec<AirportId> {
        match shipment.start() {
            Some(a) => vec![a],
            None => self.depots.clone(),
        }
    }

    /// Transit promise between two airports, in hours.
    pub fn promise_hours(&self, from: AirportId, to: AirportId) -> f64 {
        if self.continent(from) == self.continent(to) {
            SAME_CONTINENT_PROMISE_HOURS
        } else {
            CROSS_CONTINENT_PROMISE_HOURS
        }
    }
}
