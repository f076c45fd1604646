//! Customer orders and the shipment units they expand into.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ids::{AirportId, ShipmentId};
use super::time::{hours, Minute};

/// Service class of a shipment. Higher classes are more urgent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Normalized weight in (0, 1].
    pub fn weight(self) -> f64 {
        match self {
            Priority::Low => 0.25,
            Priority::Normal => 0.5,
            Priority::High => 0.75,
            Priority::Urgent => 1.0,
        }
    }
}

/// Where a shipment may start its journey.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Origin {
    /// Must leave from this airport.
    Fixed(AirportId),
    /// May leave from any depot; resolved during construction.
    #[default]
    AnyDepot,
}

/// One independently routable unit of an order.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::{AirportId, Origin, Priority, ShipmentId, ShipmentUnit};
///
/// let unit = ShipmentUnit::new(ShipmentId(7), AirportId(3))
///     .with_origin(AirportId(0))
///     .with_window(0, 24 * 60)
///     .with_priority(Priority::High);
/// assert_eq!(unit.origin, Origin::Fixed(AirportId(0)));
/// assert_eq!(unit.budget_minutes(), Some(1440));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ShipmentUnit {
    pub id: ShipmentId,
    pub order_id: u64,
    pub destination: AirportId,
    pub origin: Origin,
    /// Airport the unit currently sits at, overriding `origin`.
    pub location: Option<AirportId>,
    pub created_at: Option<Minute>,
    pub deadline: Option<Minute>,
    pub priority: Priority,
    /// Items carried; one after unitization.
    pub items: u32,
}

impl ShipmentUnit {
    pub fn new(id: ShipmentId, destination: AirportId) -> Self {
        Self {
            id,
            order_id: id.0,
            destination,
            origin: Origin::AnyDepot,
            location: None,
            created_at: None,
            deadline: None,
            priority: Priority::Normal,
            items: 1,
        }
    }

    pub fn with_origin(mut self, origin: AirportId) -> Self {
        self.origin = Origin::Fixed(origin);
        self
    }

    pub fn with_location(mut self, location: AirportId) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_window(mut self, created_at: Minute, deadline: Minute) -> Self {
        self.created_at = Some(created_at);
        self.deadline = Some(deadline);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_items(mut self, items: u32) -> Self {
        self.items = items;
        self
    }

    /// Fixed starting airport, if any. `None` means any depot.
    pub fn start(&self) -> Option<AirportId> {
        match (self.location, self.origin) {
            (Some(loc), _) => Some(loc),
            (None, Origin::Fixed(o)) => Some(o),
            (None, Origin::AnyDepot) => None,
        }
    }

    /// Minutes between creation and deadline, clamped at zero.
    ///
    /// `None` when either timestamp is missing.
    pub fn budget_minutes(&self) -> Option<i64> {
        match (self.created_at, self.deadline) {
            (Some(c), Some(d)) => Some((d - c).max(0)),
            _ => None,
        }
    }

    /// Deadline budget in hours; zero when timestamps are missing.
    pub fn budget_hours(&self) -> f64 {
        self.budget_minutes().map(hours).unwrap_or(0.0)
    }

    /// Earliest instant the unit can leave its start airport.
    pub fn ready_at(&self) -> Minute {
        self.created_at.unwrap_or(0)
    }
}

/// A customer order before unitization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: u64,
    pub destination: AirportId,
    pub origin: Origin,
    pub created_at: Option<Minute>,
    pub deadline: Option<Minute>,
    pub priority: Priority,
    pub items: u32,
}

impl Order {
    /// Expands the order into `items` single-item units with consecutive
    /// ids starting at `first_id`.
    pub fn unitize(&self, first_id: u64) -> Vec<ShipmentUnit> {
        (0..self.items as u64)
            .map(|k| ShipmentUnit {
                id: ShipmentId(first_id + k),
                order_id: self.id,
                destination: self.destination,
                origin: self.origin,
                location: None,
                created_at: self.created_at,
                deadline: self.deadline,
                priority: self.priority,
                items: 1,
            })
            .collect()
    }
}

/// Unitizes a batch of orders with globally unique, consecutive unit ids.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::{unitize_orders, AirportId, Order, Origin, Priority};
///
/// let orders = vec![
///     Order { id: 1, destination: AirportId(1), origin: Origin::AnyDepot,
///             created_at: Some(0), deadline: Some(2880), priority: Priority::Normal, items: 3 },
///     Order { id: 2, destination: AirportId(2), origin: Origin::AnyDepot,
///             created_at: Some(0), deadline: Some(2880), priority: Priority::High, items: 2 },
/// ];
/// let units = unitize_orders(&orders);
/// assert_eq!(units.len(), 5);
/// assert_eq!(units[3].order_id, 2);
/// ```
pub fn unitize_orders(orders: &[Order]) -> Vec<ShipmentUnit> {
    let mut next_id = 0u64;
    let mut units = Vec::with_capacity(orders.iter().map(|o| o.items as usize).sum());
    for order in orders {
        units.extend(order.unitize(next_id));
        next_id += order.items as u64;
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_clamps_inverted_window() {
        let unit = ShipmentUnit::new(ShipmentId(1), AirportId(0)).with_window(500, 100);
        assert_eq!(unit.budget_minutes(), Some(0));
        assert_eq!(unit.budget_hours(), 0.0);
    }

    #[test]
    fn test_budget_missing_timestamps() {
        let unit = ShipmentUnit::new(ShipmentId(1), AirportId(0));
        assert_eq!(unit.budget_minutes(), None);
        assert_eq!(unit.ready_at(), 0);
    }

    #[test]
    fn test_start_prefers_location() {
        let unit = ShipmentUnit::new(ShipmentId(1), AirportId(0))
            .with_origin(AirportId(1))
            .with_location(AirportId(2));
        assert_eq!(unit.start(), Some(AirportId(2)));
        assert_eq!(ShipmentUnit::new(ShipmentId(2), AirportId(0)).start(), None);
    }

    #[test]
    fn test_unitize_single_order() {
        let order = Order {
            id: 9,
            destination: AirportId(4),
            origin: Origin::Fixed(AirportId(1)),
            created_at: Some(10),
            deadline: Some(100),
            priority: Priority::Urgent,
            items: 4,
        };
        let units = order.unitize(100);
        assert_eq!(units.len(), 4);
        assert!(units.iter().all(|u| u.items == 1 && u.order_id == 9));
        assert_eq!(units[0].id, ShipmentId(100));
        assert_eq!(units[3].id, ShipmentId(103));
    }

    #[test]
    fn test_priority_weight_ordering() {
        assert!(Priority::Low.weight() < Priority::Normal.weight());
        assert!(Priority::High.weight() < Priority::Urgent.weight());
    }
}
