//! Entity store boundary
//!
//! The dispatch core reads snapshots and writes records by id through
//! [`EntityStore`]. [`MemoryStore`] is the in-process implementation, with
//! JSON checkpoints for persistence between runs.

pub mod checkpoint;
pub mod memory;

pub use checkpoint::StoreCheckpoint;
pub use memory::MemoryStore;

use crate::error::FleetResult;
use crate::models::{Driver, Order, Route, SimulationRecord};

/// Persistence operations the core depends on
///
/// Inserts reject duplicate ids with `StateConflict`; saves of unknown ids
/// fail with `NotFound`.
pub trait EntityStore {
    /// Available drivers, fewest shift hours first, optionally capped
    fn available_drivers(&self, limit: Option<usize>) -> FleetResult<Vec<Driver>>;

    /// Pending orders, earliest requested delivery first
    fn pending_orders(&self) -> FleetResult<Vec<Order>>;

    /// Every order bound to a driver, whatever its status
    fn orders_for_driver(&self, driver_id: &str) -> FleetResult<Vec<Order>>;

    fn driver(&self, id: &str) -> FleetResult<Option<Driver>>;
    fn route(&self, id: &str) -> FleetResult<Option<Route>>;
    fn order(&self, id: &str) -> FleetResult<Option<Order>>;
    fn simulation(&self, id: &str) -> FleetResult<Option<SimulationRecord>>;

    fn drivers(&self) -> FleetResult<Vec<Driver>>;
    fn routes(&self) -> FleetResult<Vec<Route>>;
    fn orders(&self) -> FleetResult<Vec<Order>>;
    fn simulations(&self) -> FleetResult<Vec<SimulationRecord>>;

    fn insert_driver(&mut self, driver: Driver) -> FleetResult<()>;
    fn insert_route(&mut self, route: Route) -> FleetResult<()>;
    fn insert_order(&mut self, order: Order) -> FleetResult<()>;
    fn insert_simulation(&mut self, simulation: SimulationRecord) -> FleetResult<()>;

    fn save_driver(&mut self, driver: Driver) -> FleetResult<()>;
    fn save_order(&mut self, order: Order) -> FleetResult<()>;

    fn remove_driver(&mut self, id: &str) -> FleetResult<Driver>;
    fn remove_order(&mut self, id: &str) -> FleetResult<Order>;
}
