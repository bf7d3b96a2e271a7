//! In-memory entity store
//!
//! # Invariants
//!
//! 1. **Id uniqueness**: each id appears at most once per entity kind
//! 2. **Write-once simulations**: a stored simulation is never replaced
//!
//! Maps are ordered so checkpoints serialize deterministically.

use crate::error::{EntityKind, FleetError, FleetResult};
use crate::models::{Driver, Order, OrderStatus, Route, SimulationRecord};
use crate::store::EntityStore;
use std::collections::BTreeMap;

/// Entity store held entirely in memory
///
/// # Example
///
/// ```rust
/// use fleet_dispatch_core::store::{EntityStore, MemoryStore};
/// use fleet_dispatch_core::Driver;
///
/// let mut store = MemoryStore::new();
/// store.insert_driver(Driver::new("DRV-1".to_string(), "Asha".to_string())).unwrap();
///
/// assert!(store.insert_driver(Driver::new("DRV-1".to_string(), "Ravi".to_string())).is_err());
/// assert_eq!(store.available_drivers(None).unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) drivers: BTreeMap<String, Driver>,
    pub(crate) routes: BTreeMap<String, Route>,
    pub(crate) orders: BTreeMap<String, Order>,
    pub(crate) simulations: BTreeMap<String, SimulationRecord>,
}

fn duplicate(entity: EntityKind, id: &str) -> FleetError {
    FleetError::StateConflict(format!("{} with id {} already exists", entity, id))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_drivers(&self) -> usize {
        self.drivers.len()
    }

    pub fn num_orders(&self) -> usize {
        self.orders.len()
    }
}

impl EntityStore for MemoryStore {
    fn available_drivers(&self, limit: Option<usize>) -> FleetResult<Vec<Driver>> {
        let mut drivers: Vec<Driver> = self
            .drivers
            .values()
            .filter(|d| d.is_available())
            .cloned()
            .collect();
        // stable: equal hours keep id order
        drivers.sort_by(|a, b| a.current_shift_hours().total_cmp(&b.current_shift_hours()));
        if let Some(limit) = limit {
            drivers.truncate(limit);
        }
        Ok(drivers)
    }

    fn pending_orders(&self) -> FleetResult<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.status() == OrderStatus::Pending)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.delivery_timestamp());
        Ok(orders)
    }

    fn orders_for_driver(&self, driver_id: &str) -> FleetResult<Vec<Order>> {
        Ok(self
            .orders
            .values()
            .filter(|o| o.driver_id() == Some(driver_id))
            .cloned()
            .collect())
    }

    fn driver(&self, id: &str) -> FleetResult<Option<Driver>> {
        Ok(self.drivers.get(id).cloned())
    }

    fn route(&self, id: &str) -> FleetResult<Option<Route>> {
        Ok(self.routes.get(id).cloned())
    }

    fn order(&self, id: &str) -> FleetResult<Option<Order>> {
        Ok(self.orders.get(id).cloned())
    }

    fn simulation(&self, id: &str) -> FleetResult<Option<SimulationRecord>> {
        Ok(self.simulations.get(id).cloned())
    }

    fn drivers(&self) -> FleetResult<Vec<Driver>> {
        Ok(self.drivers.values().cloned().collect())
    }

    fn routes(&self) -> FleetResult<Vec<Route>> {
        Ok(self.routes.values().cloned().collect())
    }

    fn orders(&self) -> FleetResult<Vec<Order>> {
        Ok(self.orders.values().cloned().collect())
    }

    fn simulations(&self) -> FleetResult<Vec<SimulationRecord>> {
        Ok(self.simulations.values().cloned().collect())
    }

    fn insert_driver(&mut self, driver: Driver) -> FleetResult<()> {
        if self.drivers.contains_key(driver.id()) {
            return Err(duplicate(EntityKind::Driver, driver.id()));
        }
        self.drivers.insert(driver.id().to_string(), driver);
        Ok(())
    }

    fn insert_route(&mut self, route: Route) -> FleetResult<()> {
        if self.routes.contains_key(route.id()) {
            return Err(duplicate(EntityKind::Route, route.id()));
        }
        self.routes.insert(route.id().to_string(), route);
        Ok(())
    }

    fn insert_order(&mut self, order: Order) -> FleetResult<()> {
        if self.orders.contains_key(order.id()) {
            return Err(duplicate(EntityKind::Order, order.id()));
        }
        self.orders.insert(order.id().to_string(), order);
        Ok(())
    }

    fn insert_simulation(&mut self, simulation: SimulationRecord) -> FleetResult<()> {
        if self.simulations.contains_key(simulation.id()) {
            return Err(duplicate(EntityKind::Simulation, simulation.id()));
        }
        self.simulations.insert(simulation.id().to_string(), simulation);
        Ok(())
    }

    fn save_driver(&mut self, driver: Driver) -> FleetResult<()> {
        match self.drivers.get_mut(driver.id()) {
            Some(slot) => {
                *slot = driver;
                Ok(())
            }
            None => Err(FleetError::not_found(EntityKind::Driver, driver.id())),
        }
    }

    fn save_order(&mut self, order: Order) -> FleetResult<()> {
        match self.orders.get_mut(order.id()) {
            Some(slot) => {
                *slot = order;
                Ok(())
            }
            None => Err(FleetError::not_found(EntityKind::Order, order.id())),
        }
    }

    fn remove_driver(&mut self, id: &str) -> FleetResult<Driver> {
        self.drivers
            .remove(id)
            .ok_or_else(|| FleetError::not_found(EntityKind::Driver, id))
    }

    fn remove_order(&mut self, id: &str) -> FleetResult<Order> {
        self.orders
            .remove(id)
            .ok_or_else(|| FleetError::not_found(EntityKind::Order, id))
    }
}
