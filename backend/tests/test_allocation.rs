//! Tests for the greedy allocation engine
//!
//! Critical invariants tested:
//! - No driver is planned past the hour budget
//! - Least committed time wins; ties go to the earlier driver
//! - Orders nobody has room for are left unassigned and excluded from KPIs

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fleet_dispatch_core::allocation::{allocate, PendingDelivery};
use fleet_dispatch_core::{Driver, Order, Route, TrafficLevel};

// ============================================================================
// Test Helpers
// ============================================================================

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn driver(id: &str) -> Driver {
    Driver::new(id.to_string(), format!("Driver {}", id))
}

fn route(id: &str, base_minutes: u32) -> Route {
    Route::new(id.to_string(), 5.0, TrafficLevel::Low, base_minutes)
}

/// Orders all due at the run start on the given route
fn orders(ids: &[&str], route_id: &str) -> Vec<Order> {
    ids.iter()
        .map(|id| Order::new(id.to_string(), 20_000, route_id.to_string(), start()))
        .collect()
}

fn pending<'a>(orders: &'a [Order], route: &'a Route) -> Vec<PendingDelivery<'a>> {
    orders.iter().map(|order| PendingDelivery { order, route }).collect()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_two_hour_order_goes_to_first_listed_driver() {
    // Available drivers arrive sorted by shift hours: 0h before 3h
    let drivers = vec![driver("D0"), driver("D3").with_shift_hours(3.0)];
    let long_route = route("R1", 120);
    let orders = orders(&["O1"], "R1");

    let outcome = allocate(&drivers, &pending(&orders, &long_route), start(), 8 * 60);

    assert_eq!(outcome.assignments[0].driver_id, "D0");
    assert_eq!(outcome.assignments[0].order_ids, vec!["O1".to_string()]);
    assert_eq!(outcome.assignments[0].total_hours, 2.0);
    assert!(outcome.assignments[1].is_empty());
    assert_eq!(outcome.assignments[1].total_hours, 0.0);
}

#[test]
fn test_order_longer_than_budget_is_unassigned() {
    let drivers = vec![driver("D1"), driver("D2")];
    let long_route = route("R1", 120);
    let orders = orders(&["O1"], "R1");

    let outcome = allocate(&drivers, &pending(&orders, &long_route), start(), 60);

    assert_eq!(outcome.unassigned, vec!["O1".to_string()]);
    assert!(outcome.deliveries.is_empty());
    assert_eq!(outcome.kpis.total_deliveries, 0);
    assert_eq!(outcome.kpis.total_profit, 0);
    assert_eq!(outcome.kpis.efficiency_score, 0.0);
    assert!(outcome.assignments.iter().all(|a| a.is_empty()));
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_orders_spread_to_least_loaded_driver() {
    let drivers = vec![driver("D1"), driver("D2")];
    let hour_route = route("R1", 60);
    let orders = orders(&["O1", "O2", "O3"], "R1");

    let outcome = allocate(&drivers, &pending(&orders, &hour_route), start(), 8 * 60);

    assert_eq!(outcome.assignments[0].order_ids, vec!["O1".to_string(), "O3".to_string()]);
    assert_eq!(outcome.assignments[1].order_ids, vec!["O2".to_string()]);
}

#[test]
fn test_budget_is_inclusive_and_skipped_orders_do_not_block_later_ones() {
    let drivers = vec![driver("D1")];
    let long = route("LONG", 180);
    let short = route("SHORT", 120);
    let all = vec![
        Order::new("O1".to_string(), 10_000, "LONG".to_string(), start()),
        Order::new("O2".to_string(), 10_000, "LONG".to_string(), start()),
        Order::new("O3".to_string(), 10_000, "LONG".to_string(), start()),
        Order::new("O4".to_string(), 10_000, "SHORT".to_string(), start()),
    ];
    let deliveries = vec![
        PendingDelivery { order: &all[0], route: &long },
        PendingDelivery { order: &all[1], route: &long },
        PendingDelivery { order: &all[2], route: &long },
        PendingDelivery { order: &all[3], route: &short },
    ];

    let outcome = allocate(&drivers, &deliveries, start(), 8 * 60);

    // 180 + 180 = 360; a third 180 would reach 540; 360 + 120 = 480 fits exactly
    assert_eq!(
        outcome.assignments[0].order_ids,
        vec!["O1".to_string(), "O2".to_string(), "O4".to_string()]
    );
    assert_eq!(outcome.unassigned, vec!["O3".to_string()]);
    assert_eq!(outcome.assignments[0].total_hours, 8.0);
}

#[test]
fn test_fatigue_stretch_can_make_driver_infeasible() {
    let drivers = vec![driver("TIRED").with_fatigue_flag(true), driver("RESTED")];
    let route = route("R1", 50);
    let orders = orders(&["O1"], "R1");

    // 50 min stretches to 65, over the 60 min budget
    let outcome = allocate(&drivers, &pending(&orders, &route), start(), 60);

    assert!(outcome.assignments[0].is_empty());
    assert_eq!(outcome.assignments[1].order_ids, vec!["O1".to_string()]);
    assert_eq!(outcome.deliveries[0].duration_minutes, 50);
}

#[test]
fn test_arrivals_accumulate_per_driver() {
    let drivers = vec![driver("D1")];
    let route = route("R1", 45);
    let orders = orders(&["O1", "O2"], "R1");

    let outcome = allocate(&drivers, &pending(&orders, &route), start(), 8 * 60);

    assert_eq!(outcome.deliveries[0].arrives_at, start() + Duration::minutes(45));
    assert_eq!(outcome.deliveries[1].arrives_at, start() + Duration::minutes(90));
    // second order: due at start, cutoff 55 min, arrives at 90
    assert!(outcome.deliveries[0].settlement.on_time);
    assert!(!outcome.deliveries[1].settlement.on_time);
    assert_eq!(outcome.kpis.on_time_deliveries, 1);
    assert_eq!(outcome.kpis.late_deliveries, 1);
    assert_eq!(outcome.kpis.efficiency_score, 50.0);
}

#[test]
fn test_assignment_totals_and_fuel_breakdown() {
    let drivers = vec![driver("D1")];
    let low = Route::new("LOW".to_string(), 8.0, TrafficLevel::Low, 30);
    let high = Route::new("HIGH".to_string(), 3.0, TrafficLevel::High, 30);
    let all = vec![
        Order::new("O1".to_string(), 10_000, "LOW".to_string(), start()),
        Order::new("O2".to_string(), 10_000, "HIGH".to_string(), start()),
    ];
    let deliveries = vec![
        PendingDelivery { order: &all[0], route: &low },
        PendingDelivery { order: &all[1], route: &high },
    ];

    let outcome = allocate(&drivers, &deliveries, start(), 8 * 60);

    assert_eq!(outcome.assignments[0].total_distance_km, 11.0);
    assert_eq!(outcome.assignments[0].total_hours, 1.0);
    assert_eq!(outcome.fuel_cost_breakdown.low_traffic, 4_000);
    assert_eq!(outcome.fuel_cost_breakdown.high_traffic, 2_100);
    assert_eq!(outcome.kpis.fuel_costs, 6_100);
}

#[test]
fn test_no_drivers_leaves_everything_unassigned() {
    let route = route("R1", 30);
    let orders = orders(&["O1", "O2"], "R1");

    let outcome = allocate(&[], &pending(&orders, &route), start(), 8 * 60);

    assert!(outcome.assignments.is_empty());
    assert_eq!(outcome.unassigned.len(), 2);
}
