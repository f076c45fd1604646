//! Solution representation and resource accounting.
//!
//! A [`Solution`] is the source of truth: a map from shipment to route plus
//! the set of shipments that could not be placed. The
//! [`ResourceLedger`] holds the derived occupancy counters and can always
//! be rebuilt from the map.

mod ledger;

use std::collections::{BTreeMap, BTreeSet};

use crate::index::ProblemIndex;
use crate::model::{Route, ShipmentId};

pub use ledger::{warehouse_stays, LedgerCheckpoint, ResourceLedger, Stay, WarehouseTimeline};

/// Assignment of shipment units to routes.
///
/// Keys are unique; iteration order is by shipment id so that seeded runs
/// are reproducible.
///
/// # Examples
///
/// ```
/// use u_airfreight::model::{Route, ShipmentId};
/// use u_airfreight::solution::Solution;
///
/// let mut sol = Solution::with_unassigned([ShipmentId(1), ShipmentId(2)]);
/// sol.assign(ShipmentId(1), Route::empty());
/// assert_eq!(sol.assigned_len(), 1);
/// assert_eq!(sol.unassigned_len(), 1);
///
/// let evicted = sol.unassign(ShipmentId(1));
/// assert!(evicted.is_some());
/// assert_eq!(sol.unassigned_len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Solution {
    routes: BTreeMap<ShipmentId, Route>,
    unassigned: BTreeSet<ShipmentId>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// A solution in which every given shipment still awaits a route.
    pub fn with_unassigned(ids: impl IntoIterator<Item = ShipmentId>) -> Self {
        Self {
            routes: BTreeMap::new(),
            unassigned: ids.into_iter().collect(),
        }
    }

    /// Every shipment of the problem, unassigned.
    pub fn unassigned_from(index: &ProblemIndex) -> Self {
        Self::with_unassigned(index.shipments().iter().map(|s| s.id))
    }

    pub fn routes(&self) -> &BTreeMap<ShipmentId, Route> {
        &self.routes
    }

    pub fn route(&self, id: ShipmentId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn is_assigned(&self, id: ShipmentId) -> bool {
        self.routes.contains_key(&id)
    }

    pub fn assigned_len(&self) -> usize {
        self.routes.len()
    }

    pub fn unassigned(&self) -> &BTreeSet<ShipmentId> {
        &self.unassigned
    }

    pub fn unassigned_len(&self) -> usize {
        self.unassigned.len()
    }

    /// Total shipments tracked, placed or not.
    pub fn len(&self) -> usize {
        self.routes.len() + self.unassigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Places a shipment, returning the route it replaced.
    pub fn assign(&mut self, id: ShipmentId, route: Route) -> Option<Route> {
        self.unassigned.remove(&id);
        self.routes.insert(id, route)
    }

    /// Removes a shipment's route and marks it unassigned.
    pub fn unassign(&mut self, id: ShipmentId) -> Option<Route> {
        let route = self.routes.remove(&id)?;
        self.unassigned.insert(id);
        Some(route)
    }

    /// Registers a shipment that has no route yet.
    pub fn mark_unassigned(&mut self, id: ShipmentId) {
        if !self.routes.contains_key(&id) {
            self.unassigned.insert(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_replaces() {
        let mut sol = Solution::new();
        assert!(sol.assign(ShipmentId(1), Route::empty()).is_none());
        assert!(sol.assign(ShipmentId(1), Route::empty()).is_some());
        assert_eq!(sol.len(), 1);
    }

    #[test]
    fn test_unassign_missing_is_noop() {
        let mut sol = Solution::new();
        assert!(sol.unassign(ShipmentId(3)).is_none());
        assert!(sol.unassigned().is_empty());
    }

    #[test]
    fn test_mark_unassigned_ignores_placed() {
        let mut sol = Solution::new();
        sol.assign(ShipmentId(1), Route::empty());
        sol.mark_unassigned(ShipmentId(1));
        assert_eq!(sol.unassigned_len(), 0);
    }
}
