//! Event log for auditing dispatch activity
//!
//! Captures every state change the service makes to live records, in the
//! order it happened. Events are in-process only; they are not part of the
//! store checkpoint.
//!
//! # Example
//!
//! ```rust
//! use fleet_dispatch_core::events::{Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::ShiftEnded { driver_id: "DRV-1".to_string(), hours: 6.5 });
//!
//! assert_eq!(log.len(), 1);
//! assert_eq!(log.events_for_driver("DRV-1").len(), 1);
//! ```

use crate::models::OrderStatus;
use chrono::NaiveDateTime;

/// A state change made to live records
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    DriverCreated {
        driver_id: String,
    },

    /// Deletion does not check for outstanding orders
    DriverDeleted {
        driver_id: String,
    },

    RouteCreated {
        route_id: String,
    },

    OrderCreated {
        order_id: String,
        route_id: String,
    },

    OrderDeleted {
        order_id: String,
    },

    OrderAssigned {
        order_id: String,
        driver_id: String,
        from_simulation: Option<String>,
    },

    OrderStatusChanged {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    OrderDelivered {
        order_id: String,
        driver_id: String,
        delivered_at: NaiveDateTime,
        on_time: bool,
        profit: i64,
    },

    /// Driver returned to available after its last open order
    DriverReleased {
        driver_id: String,
    },

    ShiftEnded {
        driver_id: String,
        hours: f64,
    },

    DayStarted {
        driver_id: String,
        is_fatigued: bool,
    },

    SimulationRun {
        simulation_id: String,
        total_deliveries: usize,
        unassigned: usize,
    },

    SimulationApplied {
        simulation_id: String,
        orders_assigned: usize,
    },
}

impl Event {
    /// Driver the event concerns, if any
    pub fn driver_id(&self) -> Option<&str> {
        match self {
            Event::DriverCreated { driver_id }
            | Event::DriverDeleted { driver_id }
            | Event::OrderAssigned { driver_id, .. }
            | Event::OrderDelivered { driver_id, .. }
            | Event::DriverReleased { driver_id }
            | Event::ShiftEnded { driver_id, .. }
            | Event::DayStarted { driver_id, .. } => Some(driver_id.as_str()),
            _ => None,
        }
    }

    /// Order the event concerns, if any
    pub fn order_id(&self) -> Option<&str> {
        match self {
            Event::OrderCreated { order_id, .. }
            | Event::OrderDeleted { order_id }
            | Event::OrderAssigned { order_id, .. }
            | Event::OrderStatusChanged { order_id, .. }
            | Event::OrderDelivered { order_id, .. } => Some(order_id.as_str()),
            _ => None,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Event::DriverCreated { .. } => "DriverCreated",
            Event::DriverDeleted { .. } => "DriverDeleted",
            Event::RouteCreated { .. } => "RouteCreated",
            Event::OrderCreated { .. } => "OrderCreated",
            Event::OrderDeleted { .. } => "OrderDeleted",
            Event::OrderAssigned { .. } => "OrderAssigned",
            Event::OrderStatusChanged { .. } => "OrderStatusChanged",
            Event::OrderDelivered { .. } => "OrderDelivered",
            Event::DriverReleased { .. } => "DriverReleased",
            Event::ShiftEnded { .. } => "ShiftEnded",
            Event::DayStarted { .. } => "DayStarted",
            Event::SimulationRun { .. } => "SimulationRun",
            Event::SimulationApplied { .. } => "SimulationApplied",
        }
    }
}

/// Append-only list of events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events_for_driver(&self, driver_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.driver_id() == Some(driver_id))
            .collect()
    }

    pub fn events_for_order(&self, order_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.order_id() == Some(order_id))
            .collect()
    }

    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }
}
