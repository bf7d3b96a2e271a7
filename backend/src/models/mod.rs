//! Domain models for the dispatch core

pub mod driver;
pub mod order;
pub mod route;
pub mod simulation;

// Re-exports
pub use driver::{Driver, DriverError, DriverStatus};
pub use order::{Order, OrderError, OrderStatus, OrderUpdate};
pub use route::{Route, TrafficLevel};
pub use simulation::{DriverAssignment, SimulationKpis, SimulationRecord};
