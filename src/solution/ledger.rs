//! Flight and warehouse occupancy counters with checkpoint/restore.

use crate::index::ProblemIndex;
use crate::model::time::{
    Minute, CONNECTION_MINUTES, HORIZON_MINUTES, ORIGIN_HANDLING_MINUTES, PICKUP_BUFFER_MINUTES,
};
use crate::model::{AirportId, FlightId, Route, ShipmentUnit};

use super::Solution;

/// Interval `[from, to)` during which a unit occupies a warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stay {
    pub airport: AirportId,
    pub from: Minute,
    pub to: Minute,
}

/// Warehouse stays implied by a route.
///
/// The unit waits up to two hours at the origin before departure, sits at
/// every layover from arrival until the next departure (at least one
/// connection), and is held two hours at the destination for pickup.
pub fn warehouse_stays(shipment: &ShipmentUnit, route: &Route) -> Vec<Stay> {
    let segments = route.segments();
    let Some(first) = segments.first() else {
        return Vec::new();
    };
    let mut stays = Vec::with_capacity(segments.len() + 1);
    stays.push(Stay {
        airport: first.origin,
        from: (first.departure - ORIGIN_HANDLING_MINUTES).max(shipment.ready_at()),
        to: first.departure,
    });
    for pair in segments.windows(2) {
        stays.push(Stay {
            airport: pair[0].destination,
            from: pair[0].arrival,
            to: pair[1].departure.max(pair[0].arrival + CONNECTION_MINUTES),
        });
    }
    if let Some(last) = segments.last() {
        stays.push(Stay {
            airport: last.destination,
            from: last.arrival,
            to: last.arrival + PICKUP_BUFFER_MINUTES,
        });
    }
    stays
}

/// Per-airport, per-minute warehouse occupancy over the horizon.
#[derive(Debug, PartialEq, Eq)]
pub struct WarehouseTimeline {
    minutes: Vec<Vec<u32>>,
}

impl Clone for WarehouseTimeline {
    fn clone(&self) -> Self {
        Self {
            minutes: self.minutes.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.minutes.clone_from(&source.minutes);
    }
}

impl WarehouseTimeline {
    pub fn new(airports: usize) -> Self {
        Self {
            minutes: vec![vec![0; HORIZON_MINUTES as usize]; airports],
        }
    }

    fn clamp(from: Minute, to: Minute) -> (usize, usize) {
        let lo = from.clamp(0, HORIZON_MINUTES) as usize;
        let hi = to.clamp(0, HORIZON_MINUTES) as usize;
        (lo, hi.max(lo))
    }

    /// Units held at `airport` at minute `at`; zero outside the horizon.
    pub fn at(&self, airport: AirportId, at: Minute) -> u32 {
        if !(0..HORIZON_MINUTES).contains(&at) {
            return 0;
        }
        self.minutes.get(airport.0).map_or(0, |row| row[at as usize])
    }

    /// Highest occupancy at `airport` over `[from, to)`.
    pub fn peak(&self, airport: AirportId, from: Minute, to: Minute) -> u32 {
        let (lo, hi) = Self::clamp(from, to);
        self.minutes
            .get(airport.0)
            .and_then(|row| row[lo..hi].iter().copied().max())
            .unwrap_or(0)
    }

    /// Highest occupancy at `airport` across the whole horizon.
    pub fn horizon_peak(&self, airport: AirportId) -> u32 {
        self.peak(airport, 0, HORIZON_MINUTES)
    }

    fn slots_mut(&mut self, stay: &Stay) -> &mut [u32] {
        let (lo, hi) = Self::clamp(stay.from, stay.to);
        match self.minutes.get_mut(stay.airport.0) {
            Some(row) => &mut row[lo..hi],
            None => &mut [],
        }
    }

    fn add(&mut self, stay: &Stay, units: u32) {
        for slot in self.slots_mut(stay) {
            *slot += units;
        }
    }

    fn remove(&mut self, stay: &Stay, units: u32) {
        for slot in self.slots_mut(stay) {
            *slot = slot.saturating_sub(units);
        }
    }

    /// Zeroes every counter, keeping the buffers.
    fn clear(&mut self) {
        for row in &mut self.minutes {
            row.fill(0);
        }
    }
}

/// Opaque snapshot of a [`ResourceLedger`].
#[derive(Debug, Clone)]
pub struct LedgerCheckpoint(ResourceLedger);

/// Mutable resource counters shared by every shipment in a solution.
///
/// Holds reserved units per flight, aggregate units received per airport
/// (layovers and final destinations) and, when temporal validation is on,
/// the per-minute warehouse timeline. The ledger is owned by the search
/// controller and passed by reference to the validator and operators.
///
/// # Examples
///
/// ```
/// use u_airfreight::index::ProblemIndex;
/// use u_airfreight::model::{Airport, AirportId, Continent, Flight, FlightId, ShipmentId, ShipmentUnit};
/// use u_airfreight::solution::ResourceLedger;
///
/// let index = ProblemIndex::new(
///     vec![
///         Airport::new("A", Continent::Europe, 10).as_depot(),
///         Airport::new("B", Continent::Europe, 10),
///     ],
///     vec![Flight::new("AB", AirportId(0), AirportId(1), 60, 180, 5)],
///     vec![ShipmentUnit::new(ShipmentId(1), AirportId(1)).with_window(0, 2880)],
/// ).unwrap();
///
/// let mut ledger = ResourceLedger::new(&index, true);
/// let route = index.schedule(&[FlightId(0)], 0).unwrap();
/// let unit = index.shipment(ShipmentId(1)).unwrap();
///
/// let checkpoint = ledger.checkpoint();
/// ledger.reserve(unit, &route);
/// assert_eq!(ledger.flight_reserved(FlightId(0)), 1);
/// ledger.restore(checkpoint);
/// assert_eq!(ledger.flight_reserved(FlightId(0)), 0);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceLedger {
    flight_reserved: Vec<u32>,
    airport_load: Vec<u32>,
    timeline: Option<WarehouseTimeline>,
}

impl Clone for ResourceLedger {
    fn clone(&self) -> Self {
        Self {
            flight_reserved: self.flight_reserved.clone(),
            airport_load: self.airport_load.clone(),
            timeline: self.timeline.clone(),
        }
    }

    /// Copies into the existing buffers; the timeline is not reallocated.
    fn clone_from(&mut self, source: &Self) {
        self.flight_reserved.clone_from(&source.flight_reserved);
        self.airport_load.clone_from(&source.airport_load);
        self.timeline.clone_from(&source.timeline);
    }
}

impl ResourceLedger {
    /// An empty ledger sized for `index`.
    pub fn new(index: &ProblemIndex, temporal: bool) -> Self {
        Self {
            flight_reserved: vec![0; index.flights().len()],
            airport_load: vec![0; index.airports().len()],
            timeline: temporal.then(|| WarehouseTimeline::new(index.airports().len())),
        }
    }

    /// Replays every route of `solution` into a fresh ledger.
    pub fn from_solution(index: &ProblemIndex, solution: &Solution, temporal: bool) -> Self {
        let mut ledger = Self::new(index, temporal);
        ledger.rebuild(index, solution);
        ledger
    }

    /// Clears all counters and replays `solution`.
    ///
    /// Shipments unknown to the index are skipped.
    pub fn rebuild(&mut self, index: &ProblemIndex, solution: &Solution) {
        self.flight_reserved.fill(0);
        self.airport_load.fill(0);
        if let Some(timeline) = self.timeline.as_mut() {
            timeline.clear();
        }
        for (&id, route) in solution.routes() {
            if let Some(shipment) = index.shipment(id) {
                self.reserve(shipment, route);
            }
        }
    }

    /// Books the shipment's units on every flight and warehouse of `route`.
    ///
    /// Flights and airports unknown to the ledger are skipped.
    pub fn reserve(&mut self, shipment: &ShipmentUnit, route: &Route) {
        let units = shipment.items;
        for seg in route.segments() {
            if let Some(f) = self.flight_reserved.get_mut(seg.flight.0) {
                *f += units;
            }
            if let Some(a) = self.airport_load.get_mut(seg.destination.0) {
                *a += units;
            }
        }
        if let Some(timeline) = self.timeline.as_mut() {
            for stay in warehouse_stays(shipment, route) {
                timeline.add(&stay, units);
            }
        }
    }

    /// Returns the shipment's units booked by [`reserve`](Self::reserve).
    pub fn release(&mut self, shipment: &ShipmentUnit, route: &Route) {
        let units = shipment.items;
        for seg in route.segments() {
            if let Some(f) = self.flight_reserved.get_mut(seg.flight.0) {
                *f = f.saturating_sub(units);
            }
            if let Some(a) = self.airport_load.get_mut(seg.destination.0) {
                *a = a.saturating_sub(units);
            }
        }
        if let Some(timeline) = self.timeline.as_mut() {
            for stay in warehouse_stays(shipment, route) {
                timeline.remove(&stay, units);
            }
        }
    }

    pub fn flight_reserved(&self, flight: FlightId) -> u32 {
        self.flight_reserved.get(flight.0).copied().unwrap_or(0)
    }

    /// Units still free on `flight`.
    pub fn flight_spare(&self, index: &ProblemIndex, flight: FlightId) -> u32 {
        index
            .flight(flight)
            .capacity
            .saturating_sub(self.flight_reserved[flight.0])
    }

    /// Reserved fraction of `flight`'s capacity.
    pub fn utilization(&self, index: &ProblemIndex, flight: FlightId) -> f64 {
        self.flight_reserved[flight.0] as f64 / index.flight(flight).capacity as f64
    }

    pub fn airport_load(&self, airport: AirportId) -> u32 {
        self.airport_load.get(airport.0).copied().unwrap_or(0)
    }

    pub fn airport_spare(&self, index: &ProblemIndex, airport: AirportId) -> u32 {
        index
            .airport(airport)
            .warehouse_capacity
            .saturating_sub(self.airport_load[airport.0])
    }

    pub fn timeline(&self) -> Option<&WarehouseTimeline> {
        self.timeline.as_ref()
    }

    pub fn is_temporal(&self) -> bool {
        self.timeline.is_some()
    }

    /// Flights with at least one reserved unit.
    pub fn used_flights(&self) -> impl Iterator<Item = FlightId> + '_ {
        self.flight_reserved
            .iter()
            .enumerate()
            .filter(|(_, &c)| c > 0)
            .map(|(i, _)| FlightId(i))
    }

    pub fn checkpoint(&self) -> LedgerCheckpoint {
        LedgerCheckpoint(self.clone())
    }

    /// Overwrites `checkpoint` with the current counters, reusing its
    /// buffers.
    pub fn checkpoint_into(&self, checkpoint: &mut LedgerCheckpoint) {
        checkpoint.0.clone_from(self);
    }

    /// Restores the exact counters captured by `checkpoint`.
    pub fn restore(&mut self, checkpoint: LedgerCheckpoint) {
        *self = checkpoint.0;
    }

    /// Same as [`restore`](Self::restore), keeping `checkpoint` for reuse.
    pub fn restore_from(&mut self, checkpoint: &LedgerCheckpoint) {
        self.clone_from(&checkpoint.0);
    }
}
