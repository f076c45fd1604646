//! Candidate route generation.
//!
//! Everything here is read-only against the index: routes are scheduled
//! from the unit's ready time but never checked against capacity. Routes
//! that already break the continent promise or the deadline budget are
//! pruned early.

use crate::index::ProblemIndex;
use crate::model::time::CONNECTION_MINUTES;
use crate::model::{AirportId, FlightId, Route, ShipmentUnit};

/// Most flights a generated route may take.
pub const MAX_LEGS: usize = 3;

fn within_limits(index: &ProblemIndex, unit: &ShipmentUnit, route: &Route) -> bool {
    let Some(origin) = route.origin() else {
        return true;
    };
    let transit = route.transit_hours();
    if transit > index.promise_hours(origin, unit.destination) {
        return false;
    }
    match unit.budget_minutes() {
        Some(_) => transit <= unit.budget_hours(),
        None => false,
    }
}

fn push_scheduled(
    index: &ProblemIndex,
    unit: &ShipmentUnit,
    chain: &[FlightId],
    out: &mut Vec<Route>,
) {
    if let Some(route) = index.schedule(chain, unit.ready_at()) {
        if within_limits(index, unit, &route) {
            out.push(route);
        }
    }
}

/// Routes from `origin` to the unit's destination taking exactly `legs`
/// flights, without revisiting an airport.
pub fn routes_from(
    index: &ProblemIndex,
    unit: &ShipmentUnit,
    origin: AirportId,
    legs: usize,
) -> Vec<Route> {
    let dest = unit.destination;
    let mut out = Vec::new();
    match legs {
        0 => {
            if origin == dest {
                out.push(Route::empty());
            }
        }
        1 => {
            for f in index.direct_flights(origin, dest) {
                push_scheduled(index, unit, &[f], &mut out);
            }
        }
        2 => {
            for &f1 in index.outgoing(origin) {
                let mid = index.flight(f1).destination;
                if mid == dest || mid == origin {
                    continue;
                }
                for f2 in index.direct_flights(mid, dest) {
                    push_scheduled(index, unit, &[f1, f2], &mut out);
                }
            }
        }
        3 => {
            for &f1 in index.outgoing(origin) {
                let a = index.flight(f1).destination;
                if a == dest || a == origin {
                    continue;
                }
                for &f2 in index.outgoing(a) {
                    let b = index.flight(f2).destination;
                    if b == dest || b == origin || b == a {
                        continue;
                    }
                    for f3 in index.direct_flights(b, dest) {
                        push_scheduled(index, unit, &[f1, f2, f3], &mut out);
                    }
                }
            }
        }
        _ => {}
    }
    out
}

/// Routes with exactly `legs` flights from every eligible origin, fastest
/// first.
pub fn routes_with_legs(index: &ProblemIndex, unit: &ShipmentUnit, legs: usize) -> Vec<Route> {
    let mut out: Vec<Route> = index
        .eligible_origins(unit)
        .into_iter()
        .flat_map(|o| routes_from(index, unit, o, legs))
        .collect();
    sort_by_transit(&mut out);
    out
}

/// Routes with up to `max_legs` flights from every eligible origin,
/// fastest first.
pub fn candidate_routes(index: &ProblemIndex, unit: &ShipmentUnit, max_legs: usize) -> Vec<Route> {
    let mut out: Vec<Route> = (0..=max_legs.min(MAX_LEGS))
        .flat_map(|legs| routes_with_legs(index, unit, legs))
        .collect();
    sort_by_transit(&mut out);
    out
}

/// Stable sort by transit time, then arrival.
pub fn sort_by_transit(routes: &mut [Route]) {
    routes.sort_by(|a, b| {
        a.transit_minutes()
            .cmp(&b.transit_minutes())
            .then(a.arrival().cmp(&b.arrival()))
    });
}

/// Schedules an airport path, taking on each leg the flight that arrives
/// first after the previous connection.
pub fn earliest_chain(
    index: &ProblemIndex,
    unit: &ShipmentUnit,
    path: &[AirportId],
) -> Option<Route> {
    let mut chain = Vec::with_capacity(path.len().saturating_sub(1));
    let mut not_before = unit.ready_at();
    for pair in path.windows(2) {
        let (flight, arrival) = index
            .direct_flights(pair[0], pair[1])
            .map(|f| {
                let flight = index.flight(f);
                (f, flight.next_departure(not_before) + flight.duration_minutes())
            })
            .min_by_key(|&(f, arrival)| (arrival, f))?;
        chain.push(flight);
        not_before = arrival + CONNECTION_MINUTES;
    }
    let route = index.schedule(&chain, unit.ready_at())?;
    within_limits(index, unit, &route).then_some(route)
}

/// Great-circle length of a route in kilometres.
pub fn route_km(index: &ProblemIndex, route: &Route) -> f64 {
    route
        .segments()
        .iter()
        .map(|s| index.distance_km(s.origin, s.destination))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::fixtures::*;
    use crate::model::ShipmentId;

    fn to_mad() -> ShipmentUnit {
        ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 4320)
    }

    #[test]
    fn test_direct_from_lim() {
        let index = index(10, 0);
        let routes = routes_from(&index, &to_mad(), LIM, 1);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].flights().collect::<Vec<_>>(), vec![FlightId(2)]);
    }

    #[test]
    fn test_one_stop_from_lim() {
        let index = index(10, 0);
        let routes = routes_from(&index, &to_mad(), LIM, 2);
        // LIM-BOG-MAD only
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].airports(), vec![LIM, BOG, MAD]);
    }

    #[test]
    fn test_two_stop_from_bog() {
        let index = index(10, 0);
        let routes = routes_from(&index, &to_mad(), BOG, 3);
        // BOG-UIO-LIM-MAD
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].hops(), 3);
    }

    #[test]
    fn test_zero_legs_only_at_destination() {
        let index = index(10, 0);
        assert!(routes_from(&index, &to_mad(), LIM, 0).is_empty());
        assert_eq!(routes_from(&index, &to_mad(), MAD, 0), vec![Route::empty()]);
    }

    #[test]
    fn test_candidates_cover_all_depots_sorted() {
        let index = index(10, 0);
        let routes = candidate_routes(&index, &to_mad(), 2);
        // LIM direct, LIM-BOG-MAD, BOG direct, BRU-MAD direct
        assert_eq!(routes.len(), 4);
        for w in routes.windows(2) {
            assert!(w[0].transit_minutes() <= w[1].transit_minutes());
        }
        assert_eq!(routes[0].origin(), Some(BRU));
    }

    #[test]
    fn test_deadline_prunes() {
        let index = index(10, 0);
        let tight = ShipmentUnit::new(ShipmentId(0), MAD).with_window(0, 5 * 60);
        let routes = candidate_routes(&index, &tight, 3);
        // only BRU-MAD (2h20) fits five hours
        assert_eq!(routes.len(), 1);
        let untimed = ShipmentUnit::new(ShipmentId(0), MAD);
        assert!(candidate_routes(&index, &untimed, 3).is_empty());
    }

    #[test]
    fn test_earliest_chain_follows_path() {
        let index = index(10, 0);
        let route = earliest_chain(&index, &to_mad(), &[LIM, BOG, MAD]).unwrap();
        assert_eq!(route.flights().collect::<Vec<_>>(), vec![FlightId(0), FlightId(1)]);
        assert!(earliest_chain(&index, &to_mad(), &[LIM, BRU]).is_none());
    }

    #[test]
    fn test_route_km() {
        let index = index(10, 0);
        let route = index.schedule(&[FlightId(2)], 0).unwrap();
        assert!((route_km(&index, &route) - index.distance_km(LIM, MAD)).abs() < 1e-9);
    }
}
