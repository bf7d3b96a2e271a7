//! Fleet Dispatch Core - Rust Engine
//!
//! Plans which driver delivers which pending order, within a per-driver hour
//! budget, and tracks orders and drivers through their lifecycles.
//!
//! # Architecture
//!
//! - **core**: Clock-time parsing and per-run shift clocks
//! - **models**: Domain types (Driver, Order, Route, SimulationRecord)
//! - **fatigue**: 7-day work history, fatigue flag and duration inflation
//! - **rules**: Fuel cost, lateness, penalty, bonus and profit
//! - **allocation**: Greedy least-loaded dispatch engine
//! - **config**: Run request validation
//! - **store**: Entity store boundary, in-memory store, JSON checkpoints
//! - **service**: Operator-facing operations over a store
//! - **events**: Audit log of state changes
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (paise)
//! 2. No driver is ever planned past the run's hour budget
//! 3. Simulation records are write-once
//! 4. Delivered and cancelled orders never change again
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use fleet_dispatch_core::store::MemoryStore;
//! use fleet_dispatch_core::{Driver, FleetService, Order, Route, SimulationParams, TrafficLevel};
//!
//! let due = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let mut service = FleetService::new(MemoryStore::new());
//! service.create_route(Route::new("R1".to_string(), 12.0, TrafficLevel::Low, 45)).unwrap();
//! service.create_driver(Driver::new("D1".to_string(), "Asha".to_string())).unwrap();
//! service.create_order(Order::new("O1".to_string(), 50_000, "R1".to_string(), due)).unwrap();
//!
//! let params = SimulationParams::new(1, due.time(), 8.0).unwrap();
//! let record = service.run_simulation_at(&params, due).unwrap();
//! assert_eq!(record.kpis().total_deliveries, 1);
//!
//! let report = service.apply_simulation(record.id()).unwrap();
//! assert_eq!(report.orders_assigned, 1);
//! ```

// Module declarations
pub mod allocation;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod fatigue;
pub mod models;
pub mod rules;
pub mod service;
pub mod store;

// Re-exports for convenience
pub use allocation::{allocate, AllocationOutcome, PendingDelivery, PlannedDelivery};
pub use config::{SimulationParams, SimulationRequest};
pub use error::{EntityKind, FleetError, FleetResult};
pub use events::{Event, EventLog};
pub use fatigue::{FatigueLevel, WorkHistory};
pub use models::{
    driver::{Driver, DriverError, DriverStatus},
    order::{Order, OrderError, OrderStatus, OrderUpdate},
    route::{Route, TrafficLevel},
    simulation::{DriverAssignment, SimulationKpis, SimulationRecord},
};
pub use rules::{DeliverySettlement, FuelCostBreakdown};
pub use service::{ApplyReport, FleetService, OrderStats, RolloverReport};
pub use store::{EntityStore, MemoryStore};
