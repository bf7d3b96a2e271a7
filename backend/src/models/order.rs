//! Order model
//!
//! Represents a delivery order bound to one route. Each order has:
//! - Value (i64 paise)
//! - Route and (at most one) assigned driver
//! - Requested and actual delivery times
//! - Status and, once delivered, its financial outcome
//!
//! # Status transitions
//!
//! ```text
//! Pending --> Assigned --> InTransit --> Delivered (terminal)
//!    |
//!    +------> Delayed
//!    +------> Cancelled (terminal)
//! ```
//!
//! Nothing about a terminal order may change.
//!
//! CRITICAL: All money values are i64 (paise)

use crate::rules::{self, DeliverySettlement};
use crate::models::route::Route;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    Pending,
    Assigned,
    InTransit,
    Delivered,
    Delayed,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and cancelled orders are frozen
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Whether the state machine has an edge `self -> next`
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned)
                | (Assigned, InTransit)
                | (InTransit, Delivered)
                | (Pending, Delayed)
                | (Pending, Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Assigned => "assigned",
            OrderStatus::InTransit => "in-transit",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Delayed => "delayed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OrderStatus::Pending),
            "assigned" => Ok(OrderStatus::Assigned),
            "in-transit" => Ok(OrderStatus::InTransit),
            "delivered" => Ok(OrderStatus::Delivered),
            "delayed" => Ok(OrderStatus::Delayed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Invalid status '{}'", other)),
        }
    }
}

/// Errors that can occur during order operations
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    #[error("Cannot change order {id} with status: {status}")]
    Terminal { id: String, status: OrderStatus },

    #[error("Order {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Order {id} has no assigned driver")]
    NoDriver { id: String },

    #[error("Order {id} is bound to route {expected}, got {actual}")]
    RouteMismatch {
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Order value must be between 0 and 10^15 paise, got {0}")]
    InvalidValue(i64),
}

/// Whether `value` is an acceptable order value in paise
pub fn is_valid_value(value: i64) -> bool {
    (0..=rules::MAX_ORDER_VALUE).contains(&value)
}

/// A delivery order
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_dispatch_core::{Order, OrderStatus};
///
/// let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut order = Order::new("ORD-1".to_string(), 150_000, "RT-1".to_string(), due);
///
/// order.assign("DRV-1").unwrap();
/// assert_eq!(order.status(), OrderStatus::Assigned);
/// assert_eq!(order.driver_id(), Some("DRV-1"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier (e.g., "ORD-1")
    id: String,

    /// Order value (i64 paise)
    value_paise: i64,

    route_id: String,

    #[serde(default)]
    driver_id: Option<String>,

    /// Requested delivery time
    delivery_timestamp: NaiveDateTime,

    #[serde(default)]
    actual_delivery_time: Option<NaiveDateTime>,

    status: OrderStatus,

    /// Unknown until delivered
    #[serde(default)]
    is_delivered_on_time: Option<bool>,

    #[serde(default)]
    late_penalty: i64,

    #[serde(default)]
    high_value_bonus: i64,

    #[serde(default)]
    fuel_cost: i64,

    #[serde(default)]
    profit: i64,

    #[serde(default)]
    customer_name: Option<String>,

    #[serde(default)]
    delivery_address: Option<String>,

    #[serde(default)]
    notes: Option<String>,
}

impl Order {
    /// Create a new pending order
    ///
    /// # Panics
    /// Panics if `value_paise` is negative or above [`rules::MAX_ORDER_VALUE`]
    pub fn new(id: String, value_paise: i64, route_id: String, delivery_timestamp: NaiveDateTime) -> Self {
        assert!(is_valid_value(value_paise), "order value out of range");
        Self {
            id,
            value_paise,
            route_id,
            driver_id: None,
            delivery_timestamp,
            actual_delivery_time: None,
            status: OrderStatus::Pending,
            is_delivered_on_time: None,
            late_penalty: 0,
            high_value_bonus: 0,
            fuel_cost: 0,
            profit: 0,
            customer_name: None,
            delivery_address: None,
            notes: None,
        }
    }

    /// Set customer details (builder pattern)
    pub fn with_customer(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self.delivery_address = Some(address.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value_paise(&self) -> i64 {
        self.value_paise
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn driver_id(&self) -> Option<&str> {
        self.driver_id.as_deref()
    }

    pub fn delivery_timestamp(&self) -> NaiveDateTime {
        self.delivery_timestamp
    }

    pub fn actual_delivery_time(&self) -> Option<NaiveDateTime> {
        self.actual_delivery_time
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_delivered_on_time(&self) -> Option<bool> {
        self.is_delivered_on_time
    }

    pub fn late_penalty(&self) -> i64 {
        self.late_penalty
    }

    pub fn high_value_bonus(&self) -> i64 {
        self.high_value_bonus
    }

    pub fn fuel_cost(&self) -> i64 {
        self.fuel_cost
    }

    pub fn profit(&self) -> i64 {
        self.profit
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Non-terminal and bound to a driver
    pub fn is_outstanding_for(&self, driver_id: &str) -> bool {
        !self.is_terminal() && self.driver_id.as_deref() == Some(driver_id)
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    fn ensure_mutable(&self) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::Terminal {
                id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Bind a driver: `Pending -> Assigned`
    pub fn assign(&mut self, driver_id: &str) -> Result<(), OrderError> {
        self.transition(OrderStatus::Assigned)?;
        self.driver_id = Some(driver_id.to_string());
        Ok(())
    }

    /// `Assigned -> InTransit`
    pub fn dispatch(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::InTransit)
    }

    /// `Pending -> Delayed`
    pub fn delay(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Delayed)
    }

    /// `Pending -> Cancelled`
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        self.transition(OrderStatus::Cancelled)
    }

    /// `InTransit -> Delivered`, stamping the financial outcome
    ///
    /// `route` must be the order's own route.
    pub fn complete_delivery(
        &mut self,
        actual: NaiveDateTime,
        route: &Route,
    ) -> Result<DeliverySettlement, OrderError> {
        self.ensure_mutable()?;
        if route.id() != self.route_id {
            return Err(OrderError::RouteMismatch {
                id: self.id.clone(),
                expected: self.route_id.clone(),
                actual: route.id().to_string(),
            });
        }
        if self.driver_id.is_none() {
            return Err(OrderError::NoDriver { id: self.id.clone() });
        }
        self.transition(OrderStatus::Delivered)?;

        let settlement = rules::settle_delivery(self.value_paise, route, self.delivery_timestamp, actual);
        self.actual_delivery_time = Some(actual);
        self.is_delivered_on_time = Some(settlement.on_time);
        self.late_penalty = settlement.late_penalty;
        self.high_value_bonus = settlement.high_value_bonus;
        self.fuel_cost = settlement.fuel_cost;
        self.profit = settlement.profit;
        Ok(settlement)
    }

    /// Edit order details; refused once the order is terminal
    pub fn update_details(&mut self, update: &OrderUpdate) -> Result<(), OrderError> {
        self.ensure_mutable()?;
        if let Some(value) = update.value_paise {
            if !is_valid_value(value) {
                return Err(OrderError::InvalidValue(value));
            }
            self.value_paise = value;
        }
        if let Some(route_id) = &update.route_id {
            self.route_id = route_id.clone();
        }
        if let Some(due) = update.delivery_timestamp {
            self.delivery_timestamp = due;
        }
        if let Some(name) = &update.customer_name {
            self.customer_name = Some(name.clone());
        }
        if let Some(address) = &update.delivery_address {
            self.delivery_address = Some(address.clone());
        }
        if let Some(notes) = &update.notes {
            self.notes = Some(notes.clone());
        }
        Ok(())
    }
}

/// Partial update of an order's editable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub value_paise: Option<i64>,
    pub route_id: Option<String>,
    pub delivery_timestamp: Option<NaiveDateTime>,
    pub customer_name: Option<String>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}
