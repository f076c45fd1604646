//! Error types for problem construction and configuration.
//!
//! Business conditions during the search (full flights, missing routes,
//! blown deadlines) are never errors: they surface as unassigned shipments
//! or a lower objective. Only malformed input is reported here.

use thiserror::Error;

use crate::model::{AirportId, ShipmentId};

/// Malformed problem data detected while building the index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("airport code `{0}` appears more than once")]
    DuplicateAirport(String),

    #[error("flight code `{0}` appears more than once")]
    DuplicateFlight(String),

    #[error("shipment {0} appears more than once")]
    DuplicateShipment(ShipmentId),

    #[error("flight `{flight}` references unknown airport {airport}")]
    UnknownFlightAirport { flight: String, airport: AirportId },

    #[error("flight `{0}` departs and arrives at the same airport")]
    SelfLoopFlight(String),

    #[error("flight `{0}` has zero capacity")]
    ZeroCapacityFlight(String),

    #[error("shipment {shipment} references unknown airport {airport}")]
    UnknownShipmentAirport {
        shipment: ShipmentId,
        airport: AirportId,
    },

    #[error("shipment {0} carries no items")]
    EmptyShipment(ShipmentId),

    #[error("minute-of-day {minute} of flight `{flight}` is outside 0..1440")]
    InvalidTimeOfDay { flight: String, minute: u32 },
}

/// Invalid search parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Anything that prevents a solve from starting.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
