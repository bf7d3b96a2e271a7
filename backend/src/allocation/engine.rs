//! Greedy allocation of pending orders to drivers
//!
//! One forward pass over orders (earliest requested first). For each order
//! every driver is checked:
//!
//! ```text
//! duration  = base time, x1.3 rounded if the driver is flagged fatigued
//! feasible  = committed + duration <= budget
//! pick      = feasible driver with least committed time,
//!             ties to the earliest driver in input order
//! ```
//!
//! An order nobody can take is left unassigned; there is no retry and no
//! backtracking. Cost is O(orders x drivers).
//!
//! The engine works on a borrowed snapshot and never touches the store, so
//! it runs the same against live data and test fixtures.

use crate::core::time::{minutes_to_hours, ShiftClock};
use crate::fatigue::delivery_minutes;
use crate::models::driver::Driver;
use crate::models::order::Order;
use crate::models::route::{Route, TrafficLevel};
use crate::models::simulation::{DriverAssignment, SimulationKpis};
use crate::rules::{self, DeliverySettlement, FuelCostBreakdown};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// An order paired with its route for the run
#[derive(Debug, Clone, Copy)]
pub struct PendingDelivery<'a> {
    pub order: &'a Order,
    pub route: &'a Route,
}

/// One order placed on a driver by the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDelivery {
    pub order_id: String,
    pub driver_id: String,
    pub duration_minutes: u32,
    pub arrives_at: NaiveDateTime,
    pub settlement: DeliverySettlement,
}

/// Everything a run produces
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// One entry per input driver, in input order (possibly empty)
    pub assignments: Vec<DriverAssignment>,
    /// Placed orders in processing order
    pub deliveries: Vec<PlannedDelivery>,
    /// Orders no driver had room for, in processing order
    pub unassigned: Vec<String>,
    pub kpis: SimulationKpis,
    pub fuel_cost_breakdown: FuelCostBreakdown,
}

/// Running fleet totals for a run
#[derive(Debug, Clone, Default)]
pub struct KpiAccumulator {
    total_profit: i64,
    on_time: usize,
    late: usize,
    fuel_costs: i64,
    high_value_bonuses: i64,
    late_penalties: i64,
    fuel_breakdown: FuelCostBreakdown,
}

impl KpiAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one settled delivery
    pub fn add(&mut self, traffic: TrafficLevel, settlement: &DeliverySettlement) {
        self.total_profit += settlement.profit;
        self.fuel_costs += settlement.fuel_cost;
        self.high_value_bonuses += settlement.high_value_bonus;
        self.late_penalties += settlement.late_penalty;
        self.fuel_breakdown.add(traffic, settlement.fuel_cost);
        if settlement.on_time {
            self.on_time += 1;
        } else {
            self.late += 1;
        }
    }

    pub fn total_deliveries(&self) -> usize {
        self.on_time + self.late
    }

    pub fn finish(self) -> (SimulationKpis, FuelCostBreakdown) {
        let total = self.total_deliveries();
        let kpis = SimulationKpis {
            total_profit: self.total_profit,
            efficiency_score: rules::efficiency_score(self.on_time, total),
            on_time_deliveries: self.on_time,
            late_deliveries: self.late,
            total_deliveries: total,
            fuel_costs: self.fuel_costs,
            high_value_bonuses: self.high_value_bonuses,
            late_penalties: self.late_penalties,
        };
        (kpis, self.fuel_breakdown)
    }
}

/// Per-driver working state during a run
struct DriverLane<'a> {
    driver: &'a Driver,
    clock: ShiftClock,
    order_ids: Vec<String>,
    distance_km: f64,
}

impl<'a> DriverLane<'a> {
    fn into_assignment(self) -> DriverAssignment {
        DriverAssignment {
            driver_id: self.driver.id().to_string(),
            order_ids: self.order_ids,
            total_hours: self.clock.committed_hours(),
            total_distance_km: self.distance_km,
        }
    }
}

/// Allocate `deliveries` across `drivers`
///
/// Expects `drivers` sorted by ascending shift hours and `deliveries` by
/// ascending requested time; the order of both slices decides tie-breaks.
/// Every driver starts the run at `dispatch_start` with nothing committed.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_dispatch_core::allocation::{allocate, PendingDelivery};
/// use fleet_dispatch_core::{Driver, Order, Route, TrafficLevel};
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let drivers = vec![Driver::new("D1".to_string(), "Asha".to_string())];
/// let route = Route::new("R1".to_string(), 10.0, TrafficLevel::Medium, 60);
/// let order = Order::new("O1".to_string(), 150_000, "R1".to_string(), start);
///
/// let outcome = allocate(&drivers, &[PendingDelivery { order: &order, route: &route }], start, 8 * 60);
/// assert_eq!(outcome.kpis.total_profit, 160_000);
/// assert_eq!(outcome.assignments[0].order_ids, vec!["O1".to_string()]);
/// ```
pub fn allocate(
    drivers: &[Driver],
    deliveries: &[PendingDelivery<'_>],
    dispatch_start: NaiveDateTime,
    budget_minutes: u32,
) -> AllocationOutcome {
    let mut lanes: Vec<DriverLane<'_>> = drivers
        .iter()
        .map(|driver| DriverLane {
            driver,
            clock: ShiftClock::new(dispatch_start),
            order_ids: Vec::new(),
            distance_km: 0.0,
        })
        .collect();

    let mut totals = KpiAccumulator::new();
    let mut planned = Vec::new();
    let mut unassigned = Vec::new();

    for delivery in deliveries {
        let Some((index, duration)) = select_driver(&lanes, delivery.route, budget_minutes) else {
            debug!(order_id = delivery.order.id(), "no driver has room, leaving order unassigned");
            unassigned.push(delivery.order.id().to_string());
            continue;
        };

        let lane = &mut lanes[index];
        let arrives_at = lane.clock.commit(duration);
        lane.order_ids.push(delivery.order.id().to_string());
        lane.distance_km += delivery.route.distance_km();

        let settlement = rules::settle_delivery(
            delivery.order.value_paise(),
            delivery.route,
            delivery.order.delivery_timestamp(),
            arrives_at,
        );
        totals.add(delivery.route.traffic_level(), &settlement);

        debug!(
            order_id = delivery.order.id(),
            driver_id = lane.driver.id(),
            duration_minutes = duration,
            committed_hours = minutes_to_hours(lane.clock.committed_minutes()),
            on_time = settlement.on_time,
            "order allocated"
        );

        planned.push(PlannedDelivery {
            order_id: delivery.order.id().to_string(),
            driver_id: lane.driver.id().to_string(),
            duration_minutes: duration,
            arrives_at,
            settlement,
        });
    }

    let (kpis, fuel_cost_breakdown) = totals.finish();
    AllocationOutcome {
        assignments: lanes.into_iter().map(DriverLane::into_assignment).collect(),
        deliveries: planned,
        unassigned,
        kpis,
        fuel_cost_breakdown,
    }
}

/// Pick the least-loaded driver with room for the route
///
/// Returns the lane index and the driver-specific duration in minutes.
fn select_driver(lanes: &[DriverLane<'_>], route: &Route, budget_minutes: u32) -> Option<(usize, u32)> {
    let mut best: Option<(usize, u32)> = None;
    let mut best_committed = u32::MAX;

    for (index, lane) in lanes.iter().enumerate() {
        let duration = delivery_minutes(route.base_time_minutes(), lane.driver.is_fatigued());
        if !lane.clock.fits(duration, budget_minutes) {
            continue;
        }
        // strict: equal load keeps the earlier driver
        if lane.clock.committed_minutes() < best_committed {
            best_committed = lane.clock.committed_minutes();
            best = Some((index, duration));
        }
    }

    best
}
