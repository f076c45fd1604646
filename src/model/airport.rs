//! Airports and their cargo warehouses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Continent an airport belongs to.
///
/// Drives the delivery promise (48h within a continent, 72h across) and
/// the geographic destroy operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Continent {
    Africa,
    Asia,
    Europe,
    NorthAmerica,
    SouthAmerica,
    Oceania,
}

impl Continent {
    /// All continents, in declaration order.
    pub const ALL: [Continent; 6] = [
        Continent::Africa,
        Continent::Asia,
        Continent::Europe,
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Oceania,
    ];

    /// Dense index, usable for per-continent tallies.
    pub fn index(self) -> usize {
        self as usize
    }
}

/// An airport with a cargo warehouse.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::{Airport, Continent};
///
/// let lima = Airport::new("SPIM", Continent::SouthAmerica, 400)
///     .with_coordinates(-12.02, -77.11)
///     .as_depot();
/// assert!(lima.is_depot);
/// assert_eq!(lima.warehouse_capacity, 400);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Airport {
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub continent: Continent,
    /// Maximum units the warehouse can hold at once.
    pub warehouse_capacity: u32,
    /// Whether shipments without a fixed origin may leave from here.
    pub is_depot: bool,
}

impl Airport {
    pub fn new(code: impl Into<String>, continent: Continent, warehouse_capacity: u32) -> Self {
        Self {
            code: code.into(),
            latitude: 0.0,
            longitude: 0.0,
            continent,
            warehouse_capacity,
            is_depot: false,
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    pub fn as_depot(mut self) -> Self {
        self.is_depot = true;
        self
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Airport) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_zero_for_same_point() {
        let a = Airport::new("A", Continent::Europe, 10).with_coordinates(52.3, 4.7);
        assert!(a.distance_km(&a).abs() < 1e-9);
    }

    #[test]
    fn test_distance_lima_madrid() {
        let lima = Airport::new("SPIM", Continent::SouthAmerica, 10).with_coordinates(-12.02, -77.11);
        let madrid = Airport::new("LEMD", Continent::Europe, 10).with_coordinates(40.47, -3.56);
        let d = lima.distance_km(&madrid);
        assert!((9400.0..9700.0).contains(&d), "got {d}");
        assert!((d - madrid.distance_km(&lima)).abs() < 1e-6);
    }

    #[test]
    fn test_continent_index_is_dense() {
        for (i, c) in Continent::ALL.iter().enumerate() {
            assert_eq!(c.index(), i);
        }
    }
}
