//! Reasons a route cannot be added to a solution.

use thiserror::Error;

use crate::model::{AirportId, FlightId, Minute, ShipmentId};

/// Why a candidate route was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Infeasible {
    #[error("{0} is not part of the problem")]
    UnknownShipment(ShipmentId),

    #[error("segment {position} uses {flight}, which is not part of the network")]
    UnknownFlight { position: usize, flight: FlightId },

    #[error("segment {position} touches {airport}, which is not part of the network")]
    UnknownAirport { position: usize, airport: AirportId },

    #[error("{flight} is cancelled")]
    FlightCancelled { flight: FlightId },

    #[error("{flight} has {spare} spare units, {needed} needed")]
    FlightFull {
        flight: FlightId,
        spare: u32,
        needed: u32,
    },

    #[error("warehouse at {airport} has {spare} spare units, {needed} needed")]
    WarehouseFull {
        airport: AirportId,
        spare: u32,
        needed: u32,
    },

    #[error("segment {position} does not match the endpoints of {flight}")]
    SegmentMismatch { position: usize, flight: FlightId },

    #[error("segment {position} leaves from {found}, expected {expected}")]
    Discontinuous {
        position: usize,
        expected: AirportId,
        found: AirportId,
    },

    #[error("segment {position} departs before the connection buffer elapses")]
    ConnectionTooShort { position: usize },

    #[error("route starts at {0}, which is not a depot")]
    NotADepot(AirportId),

    #[error("route ends at {found:?}, destination is {expected}")]
    WrongDestination {
        expected: AirportId,
        found: Option<AirportId>,
    },

    #[error("transit of {transit_hours:.1}h exceeds the {promise_hours:.0}h delivery promise")]
    PromiseExceeded {
        transit_hours: f64,
        promise_hours: f64,
    },

    #[error("transit of {transit_hours:.1}h exceeds the {budget_hours:.1}h deadline budget")]
    DeadlineExceeded {
        transit_hours: f64,
        budget_hours: f64,
    },

    #[error("creation time or deadline missing")]
    MissingTimestamps,

    #[error("warehouse at {airport} would overflow at minute {minute}")]
    WarehouseOverflow { airport: AirportId, minute: Minute },
}
