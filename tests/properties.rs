//! Property tests over random problem sizes, seeds and operator picks.

use proptest::prelude::*;
use u_airfreight::destroy::DestroyOperator;
use u_airfreight::feasibility::validate_solution;
use u_airfreight::index::ProblemIndex;
use u_airfreight::model::{Airport, AirportId, Continent, Flight, FlightId, ShipmentId, ShipmentUnit};
use u_airfreight::random::create_rng;
use u_airfreight::repair::{construct, RepairContext, RepairOperator};
use u_airfreight::solution::ResourceLedger;

fn index(capacity: u32, shipments: u64, tight: bool) -> ProblemIndex {
    let airports = vec![
        Airport::new("A", Continent::Europe, 30).as_depot(),
        Airport::new("B", Continent::Europe, 30).as_depot(),
        Airport::new("C", Continent::Europe, 30),
        Airport::new("D", Continent::Asia, 30).as_depot(),
        Airport::new("E", Continent::Asia, 30),
    ];
    let flights = vec![
        Flight::new("AC", AirportId(0), AirportId(2), 300, 420, capacity),
        Flight::new("BC", AirportId(1), AirportId(2), 360, 500, capacity),
        Flight::new("AB", AirportId(0), AirportId(1), 60, 150, capacity),
        Flight::new("CE", AirportId(2), AirportId(4), 700, 1300, capacity),
        Flight::new("DE", AirportId(3), AirportId(4), 480, 600, capacity),
        Flight::new("DC", AirportId(3), AirportId(2), 200, 900, capacity),
    ];
    let budget = if tight { 600 } else { 2880 };
    let units = (0..shipments)
        .map(|i| {
            let dest = if i % 2 == 0 { AirportId(2) } else { AirportId(4) };
            ShipmentUnit::new(ShipmentId(i), dest).with_window(0, budget)
        })
        .collect();
    ProblemIndex::new(airports, flights, units).unwrap()
}

proptest! {
    #[test]
    fn destroy_conserves_shipments(
        capacity in 1u32..6,
        n in 0u64..25,
        op in 0usize..DestroyOperator::ALL.len(),
        count in 0usize..30,
        seed in any::<u64>(),
    ) {
        let index = index(capacity, n, false);
        let ctx = RepairContext::new(&index, true, 3);
        let mut rng = create_rng(seed);
        let (mut solution, mut ledger) = construct(&ctx, &mut rng);
        let placed = solution.assigned_len();

        let evicted = DestroyOperator::ALL[op].destroy(&index, &mut solution, &mut ledger, count, &mut rng);

        prop_assert_eq!(solution.assigned_len() + evicted.len(), placed);
        prop_assert_eq!(evicted.len(), count.min(placed));
        prop_assert_eq!(solution.len(), n as usize);
        for e in &evicted {
            prop_assert!(solution.unassigned().contains(&e.shipment));
        }
        prop_assert_eq!(&ledger, &ResourceLedger::from_solution(&index, &solution, true));
    }

    #[test]
    fn repair_keeps_capacity_invariant(
        capacity in 1u32..4,
        n in 0u64..25,
        op in 0usize..RepairOperator::ALL.len(),
        tight in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let index = index(capacity, n, tight);
        let ctx = RepairContext::new(&index, true, 3);
        let mut rng = create_rng(seed);
        let (mut solution, mut ledger) = construct(&ctx, &mut rng);
        DestroyOperator::RandomBiased.destroy(&index, &mut solution, &mut ledger, 5, &mut rng);
        RepairOperator::ALL[op].repair(&ctx, &mut solution, &mut ledger, &mut rng);

        prop_assert!(validate_solution(&index, &solution, true).is_feasible());
        for (i, flight) in index.flights().iter().enumerate() {
            prop_assert!(ledger.flight_reserved(FlightId(i)) <= flight.capacity);
        }
    }

    #[test]
    fn ledger_rebuild_is_idempotent(
        capacity in 1u32..6,
        n in 0u64..25,
        seed in any::<u64>(),
    ) {
        let index = index(capacity, n, false);
        let ctx = RepairContext::new(&index, true, 3);
        let (solution, ledger) = construct(&ctx, &mut create_rng(seed));

        let mut rebuilt = ledger.clone();
        rebuilt.rebuild(&index, &solution);
        prop_assert_eq!(&rebuilt, &ledger);
        rebuilt.rebuild(&index, &solution);
        prop_assert_eq!(&rebuilt, &ledger);
    }
}
