//! Fleet service - the operations exposed to operators
//!
//! Wraps an [`EntityStore`] and drives every state change:
//!
//! - dispatch runs (read snapshot -> allocate -> write one record)
//! - applying a run to live orders and drivers
//! - manual assignment, status changes, deliveries
//! - shift end, day start and fleet-wide rollover
//! - entity management and order statistics
//!
//! # Concurrency
//!
//! The service owns its store and every mutating operation takes
//! `&mut self`, so runs, applies and manual edits never interleave within a
//! process. Apply itself is **not** atomic: it is a sequence of per-driver
//! and per-order writes, and the first failure is returned with earlier
//! writes left in place.

use crate::allocation::{allocate, PendingDelivery};
use crate::config::{SimulationParams, SimulationRequest};
use crate::error::{EntityKind, FleetError, FleetResult};
use crate::events::{Event, EventLog};
use crate::fatigue::FatigueLevel;
use crate::models::{Driver, DriverStatus, Order, OrderStatus, OrderUpdate, Route, SimulationRecord};
use crate::store::{EntityStore, MemoryStore};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// What an apply wrote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    pub simulation_id: String,
    pub drivers_updated: usize,
    pub orders_assigned: usize,
}

/// Result of a fleet-wide day rollover
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloverReport {
    /// Drivers that started the new day
    pub started: Vec<String>,
    /// Drivers left alone, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Order counts and delivered financials
///
/// CRITICAL: All money values are i64 (paise)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub status_counts: BTreeMap<String, usize>,
    pub on_time: usize,
    pub late: usize,
    pub total_value: i64,
    pub total_profit: i64,
    /// Mean profit per delivered order, rounded to the nearest paisa with
    /// halves away from zero; 0 when nothing was delivered
    pub average_profit: i64,
}

/// Operator-facing service over an entity store
pub struct FleetService<S: EntityStore = MemoryStore> {
    store: S,
    event_log: EventLog,
}

impl<S: EntityStore> FleetService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            event_log: EventLog::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn driver(&self, id: &str) -> FleetResult<Driver> {
        self.store
            .driver(id)?
            .ok_or_else(|| FleetError::not_found(EntityKind::Driver, id))
    }

    pub fn route(&self, id: &str) -> FleetResult<Route> {
        self.store
            .route(id)?
            .ok_or_else(|| FleetError::not_found(EntityKind::Route, id))
    }

    pub fn order(&self, id: &str) -> FleetResult<Order> {
        self.store
            .order(id)?
            .ok_or_else(|| FleetError::not_found(EntityKind::Order, id))
    }

    pub fn simulation(&self, id: &str) -> FleetResult<SimulationRecord> {
        self.store
            .simulation(id)?
            .ok_or_else(|| FleetError::not_found(EntityKind::Simulation, id))
    }

    /// All simulations, newest first
    pub fn list_simulations(&self) -> FleetResult<Vec<SimulationRecord>> {
        let mut simulations = self.store.simulations()?;
        simulations.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(simulations)
    }

    // ========================================================================
    // Dispatch runs
    // ========================================================================

    /// Validate a raw request and run a simulation stamped with the local wall clock
    ///
    /// Same clock as the naive local timestamps orders and deliveries carry.
    pub fn run_simulation(&mut self, request: SimulationRequest) -> FleetResult<SimulationRecord> {
        let params = SimulationParams::try_from(request)?;
        self.run_simulation_at(&params, Local::now().naive_local())
    }

    /// Run a simulation with validated parameters
    ///
    /// Reads a snapshot of available drivers and pending orders, allocates,
    /// and stores exactly one record. Nothing is written on failure.
    pub fn run_simulation_at(
        &mut self,
        params: &SimulationParams,
        created_at: NaiveDateTime,
    ) -> FleetResult<SimulationRecord> {
        let drivers = self.store.available_drivers(Some(params.available_drivers()))?;
        if drivers.is_empty() {
            return Err(FleetError::ResourceExhausted("No available drivers found".to_string()));
        }

        let orders = self.store.pending_orders()?;
        let Some(first_order) = orders.first() else {
            return Err(FleetError::ResourceExhausted("No pending orders found".to_string()));
        };

        // one lookup per distinct route
        let mut routes: HashMap<String, Route> = HashMap::new();
        for order in &orders {
            if !routes.contains_key(order.route_id()) {
                routes.insert(order.route_id().to_string(), self.route(order.route_id())?);
            }
        }

        let deliveries = orders
            .iter()
            .map(|order| {
                routes
                    .get(order.route_id())
                    .map(|route| PendingDelivery { order, route })
                    .ok_or_else(|| FleetError::Internal(format!("route {} missing from lookup", order.route_id())))
            })
            .collect::<FleetResult<Vec<_>>>()?;

        let dispatch_date = params
            .dispatch_date()
            .unwrap_or_else(|| first_order.delivery_timestamp().date());
        let dispatch_start = dispatch_date.and_time(params.route_start_time());

        debug!(
            drivers = drivers.len(),
            orders = orders.len(),
            %dispatch_start,
            budget_minutes = params.budget_minutes(),
            "starting dispatch run"
        );

        let outcome = allocate(&drivers, &deliveries, dispatch_start, params.budget_minutes());

        for order_id in &outcome.unassigned {
            warn!(order_id = %order_id, "order left unassigned: no driver within the hour budget");
        }

        let record = SimulationRecord::new(
            created_at,
            params.clone(),
            outcome.kpis,
            outcome.assignments,
            outcome.fuel_cost_breakdown,
            outcome.unassigned,
        );
        self.store.insert_simulation(record.clone())?;

        info!(
            simulation_id = record.id(),
            deliveries = record.kpis().total_deliveries,
            unassigned = record.unassigned_orders().len(),
            total_profit = record.kpis().total_profit,
            efficiency = record.kpis().efficiency_score,
            "simulation completed"
        );
        self.event_log.log(Event::SimulationRun {
            simulation_id: record.id().to_string(),
            total_deliveries: record.kpis().total_deliveries,
            unassigned: record.unassigned_orders().len(),
        });

        Ok(record)
    }

    /// Commit a simulation's assignments to live drivers and orders
    ///
    /// Per driver: every planned order is checked to still be pending, then
    /// the driver takes the planned hours and goes on route, then each order
    /// is assigned. Drivers with no planned orders are left untouched.
    /// Best effort: on failure, drivers processed before it stay applied.
    pub fn apply_simulation(&mut self, simulation_id: &str) -> FleetResult<ApplyReport> {
        let record = self.simulation(simulation_id)?;

        let mut report = ApplyReport {
            simulation_id: simulation_id.to_string(),
            drivers_updated: 0,
            orders_assigned: 0,
        };

        for assignment in record.driver_assignments().iter().filter(|a| !a.is_empty()) {
            let result = self.apply_assignment(
                simulation_id,
                &assignment.driver_id,
                &assignment.order_ids,
                assignment.total_hours,
            );
            match result {
                Ok(assigned) => {
                    report.drivers_updated += 1;
                    report.orders_assigned += assigned;
                }
                Err(err) => {
                    warn!(
                        simulation_id,
                        driver_id = %assignment.driver_id,
                        drivers_applied = report.drivers_updated,
                        error = %err,
                        "apply stopped part way"
                    );
                    return Err(err);
                }
            }
        }

        info!(
            simulation_id,
            drivers = report.drivers_updated,
            orders = report.orders_assigned,
            "simulation applied"
        );
        self.event_log.log(Event::SimulationApplied {
            simulation_id: simulation_id.to_string(),
            orders_assigned: report.orders_assigned,
        });
        Ok(report)
    }

    fn apply_assignment(
        &mut self,
        simulation_id: &str,
        driver_id: &str,
        order_ids: &[String],
        total_hours: f64,
    ) -> FleetResult<usize> {
        let mut driver = self.driver(driver_id)?;

        let mut orders = Vec::with_capacity(order_ids.len());
        for order_id in order_ids {
            let mut order = self.order(order_id)?;
            order.assign(driver_id)?;
            orders.push(order);
        }

        driver.commit_planned_hours(total_hours)?;
        self.store.save_driver(driver)?;

        for order in orders {
            let order_id = order.id().to_string();
            self.store.save_order(order)?;
            self.event_log.log(Event::OrderAssigned {
                order_id,
                driver_id: driver_id.to_string(),
                from_simulation: Some(simulation_id.to_string()),
            });
        }
        Ok(order_ids.len())
    }

    // ========================================================================
    // Manual state changes
    // ========================================================================

    /// Assign a pending order to an available driver by hand
    ///
    /// Rejects drivers that are not available or whose fatigue tier is
    /// `High`. The driver's binary fatigue flag plays no part here.
    pub fn assign_driver(&mut self, order_id: &str, driver_id: &str, now: NaiveDateTime) -> FleetResult<()> {
        let mut order = self.order(order_id)?;
        if order.status() != OrderStatus::Pending {
            return Err(FleetError::StateConflict(format!(
                "Cannot assign driver to order {} with status: {}",
                order_id,
                order.status()
            )));
        }
        let mut driver = self.driver(driver_id)?;

        driver.take_manual_assignment(now)?;
        order.assign(driver_id)?;

        self.store.save_order(order)?;
        self.store.save_driver(driver)?;

        info!(order_id, driver_id, "driver assigned");
        self.event_log.log(Event::OrderAssigned {
            order_id: order_id.to_string(),
            driver_id: driver_id.to_string(),
            from_simulation: None,
        });
        Ok(())
    }

    /// Move an order to `status`
    ///
    /// `Delivered` runs the full delivery flow (see [`Self::deliver_order`]).
    /// `Assigned` needs a driver and must go through [`Self::assign_driver`].
    pub fn update_order_status(
        &mut self,
        order_id: &str,
        status: OrderStatus,
        now: NaiveDateTime,
    ) -> FleetResult<Order> {
        match status {
            OrderStatus::Delivered => return self.deliver_order(order_id, now),
            OrderStatus::Assigned => {
                return Err(FleetError::StateConflict(format!(
                    "Order {} needs a driver to become assigned; use driver assignment",
                    order_id
                )))
            }
            _ => {}
        }

        let mut order = self.order(order_id)?;
        let from = order.status();
        match status {
            OrderStatus::InTransit => order.dispatch()?,
            OrderStatus::Delayed => order.delay()?,
            OrderStatus::Cancelled => order.cancel()?,
            other => {
                return Err(FleetError::StateConflict(format!(
                    "Order {} cannot move from {} to {}",
                    order_id, from, other
                )))
            }
        }
        self.store.save_order(order.clone())?;

        info!(order_id, %from, to = %status, "order status changed");
        self.event_log.log(Event::OrderStatusChanged {
            order_id: order_id.to_string(),
            from,
            to: status,
        });
        Ok(order)
    }

    /// Mark an in-transit order delivered at `delivered_at`
    ///
    /// Stamps the financial outcome, refreshes the driver's fatigue flag and
    /// returns the driver to available if this was its last open order.
    pub fn deliver_order(&mut self, order_id: &str, delivered_at: NaiveDateTime) -> FleetResult<Order> {
        let mut order = self.order(order_id)?;
        let route = self.route(order.route_id())?;
        let settlement = order.complete_delivery(delivered_at, &route)?;
        let driver_id = order
            .driver_id()
            .map(str::to_string)
            .ok_or_else(|| FleetError::Internal(format!("delivered order {} has no driver", order_id)))?;

        self.store.save_order(order.clone())?;
        info!(
            order_id,
            driver_id = %driver_id,
            on_time = settlement.on_time,
            profit = settlement.profit,
            "order delivered"
        );
        self.event_log.log(Event::OrderDelivered {
            order_id: order_id.to_string(),
            driver_id: driver_id.clone(),
            delivered_at,
            on_time: settlement.on_time,
            profit: settlement.profit,
        });

        // driver deletion is unguarded, so the driver may be gone
        let Some(mut driver) = self.store.driver(&driver_id)? else {
            warn!(order_id, driver_id = %driver_id, "delivered order references a deleted driver");
            return Ok(order);
        };

        driver.refresh_fatigue();
        let still_open = self
            .store
            .orders_for_driver(&driver_id)?
            .iter()
            .any(|o| o.id() != order_id && o.is_outstanding_for(&driver_id));
        let released = !still_open && driver.status() == DriverStatus::OnRoute;
        if !still_open {
            driver.release();
        }
        self.store.save_driver(driver)?;

        if released {
            debug!(driver_id = %driver_id, "driver released after last delivery");
            self.event_log.log(Event::DriverReleased { driver_id });
        }
        Ok(order)
    }

    /// End a driver's shift, returning the hours recorded
    pub fn end_shift(&mut self, driver_id: &str) -> FleetResult<f64> {
        let mut driver = self.driver(driver_id)?;
        let hours = driver.end_shift()?;
        self.store.save_driver(driver)?;

        info!(driver_id, hours, "shift ended");
        self.event_log.log(Event::ShiftEnded {
            driver_id: driver_id.to_string(),
            hours,
        });
        Ok(hours)
    }

    /// Start a new day for one driver
    pub fn start_day(&mut self, driver_id: &str) -> FleetResult<Driver> {
        let mut driver = self.driver(driver_id)?;
        driver.start_day()?;
        self.store.save_driver(driver.clone())?;

        info!(driver_id, is_fatigued = driver.is_fatigued(), "new day started");
        self.event_log.log(Event::DayStarted {
            driver_id: driver_id.to_string(),
            is_fatigued: driver.is_fatigued(),
        });
        Ok(driver)
    }

    /// Start a new day for every driver that can
    ///
    /// Drivers still on route or with unrecorded shift hours are skipped and
    /// reported; the rest roll over.
    pub fn start_day_all(&mut self) -> FleetResult<RolloverReport> {
        let mut report = RolloverReport::default();
        for driver in self.store.drivers()? {
            match self.start_day(driver.id()) {
                Ok(_) => report.started.push(driver.id().to_string()),
                Err(FleetError::StateConflict(reason)) => {
                    warn!(driver_id = driver.id(), %reason, "driver skipped in day rollover");
                    report.skipped.push((driver.id().to_string(), reason));
                }
                Err(other) => return Err(other),
            }
        }
        Ok(report)
    }

    pub fn set_fatigue_level(&mut self, driver_id: &str, level: FatigueLevel) -> FleetResult<()> {
        let mut driver = self.driver(driver_id)?;
        driver.set_fatigue_level(level);
        self.store.save_driver(driver)?;
        debug!(driver_id, ?level, "fatigue level updated");
        Ok(())
    }

    // ========================================================================
    // Entity management
    // ========================================================================

    pub fn create_driver(&mut self, driver: Driver) -> FleetResult<()> {
        let driver_id = driver.id().to_string();
        self.store.insert_driver(driver)?;
        self.event_log.log(Event::DriverCreated { driver_id });
        Ok(())
    }

    /// Delete a driver without checking for outstanding orders
    pub fn delete_driver(&mut self, driver_id: &str) -> FleetResult<Driver> {
        let driver = self.store.remove_driver(driver_id)?;
        self.event_log.log(Event::DriverDeleted {
            driver_id: driver_id.to_string(),
        });
        Ok(driver)
    }

    pub fn create_route(&mut self, route: Route) -> FleetResult<()> {
        let route_id = route.id().to_string();
        self.store.insert_route(route)?;
        self.event_log.log(Event::RouteCreated { route_id });
        Ok(())
    }

    /// Create an order; it must start pending and reference an existing route
    pub fn create_order(&mut self, order: Order) -> FleetResult<()> {
        if order.status() != OrderStatus::Pending {
            return Err(FleetError::validation(format!(
                "New order {} must be pending, got {}",
                order.id(),
                order.status()
            )));
        }
        self.route(order.route_id())?;

        let event = Event::OrderCreated {
            order_id: order.id().to_string(),
            route_id: order.route_id().to_string(),
        };
        self.store.insert_order(order)?;
        self.event_log.log(event);
        Ok(())
    }

    /// Edit a non-terminal order
    pub fn update_order(&mut self, order_id: &str, update: &OrderUpdate) -> FleetResult<Order> {
        let mut order = self.order(order_id)?;
        if let Some(route_id) = &update.route_id {
            self.route(route_id)?;
        }
        order.update_details(update)?;
        self.store.save_order(order.clone())?;
        Ok(order)
    }

    /// Delete an order; only pending orders may be deleted
    pub fn delete_order(&mut self, order_id: &str) -> FleetResult<Order> {
        let order = self.order(order_id)?;
        if order.status() != OrderStatus::Pending {
            return Err(FleetError::StateConflict(format!(
                "Cannot delete order {} with status: {}",
                order_id,
                order.status()
            )));
        }
        let removed = self.store.remove_order(order_id)?;
        self.event_log.log(Event::OrderDeleted {
            order_id: order_id.to_string(),
        });
        Ok(removed)
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Status counts, on-time split and financial totals over all orders
    pub fn order_stats(&self) -> FleetResult<OrderStats> {
        let mut stats = OrderStats::default();
        let mut delivered = 0i64;

        for order in self.store.orders()? {
            *stats
                .status_counts
                .entry(order.status().as_str().to_string())
                .or_insert(0) += 1;

            if order.status() != OrderStatus::Delivered {
                continue;
            }
            delivered += 1;
            stats.total_value += order.value_paise();
            stats.total_profit += order.profit();
            match order.is_delivered_on_time() {
                Some(true) => stats.on_time += 1,
                Some(false) => stats.late += 1,
                None => {}
            }
        }

        if delivered > 0 {
            stats.average_profit = rounded_mean(stats.total_profit, delivered);
        }
        Ok(stats)
    }
}

/// `total / count` rounded half away from zero; `count` must be positive
fn rounded_mean(total: i64, count: i64) -> i64 {
    let quotient = total / count;
    let remainder = total % count;
    if remainder.abs() * 2 >= count {
        quotient + remainder.signum()
    } else {
        quotient
    }
}
