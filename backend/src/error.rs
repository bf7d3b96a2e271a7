//! Error kinds surfaced by the dispatch core
//!
//! Every fallible operation returns [`FleetError`]. Model-level errors
//! (illegal status transitions) are defined next to their models and
//! convert into [`FleetError::StateConflict`].

use crate::models::driver::DriverError;
use crate::models::order::OrderError;
use thiserror::Error;

/// Kind of record referenced by a [`FleetError::NotFound`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Driver,
    Route,
    Order,
    Simulation,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Driver => "Driver",
            EntityKind::Route => "Route",
            EntityKind::Order => "Order",
            EntityKind::Simulation => "Simulation",
        };
        f.write_str(name)
    }
}

/// Top-level error type
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FleetError {
    /// Bad parameters, rejected before any read or write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown driver/order/route/simulation id
    #[error("{entity} not found: {id}")]
    NotFound { entity: EntityKind, id: String },

    /// Illegal status transition or duplicate identifier
    #[error("State conflict: {0}")]
    StateConflict(String),

    /// No available drivers or no pending orders
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Internal computation failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FleetError {
    pub fn not_found(entity: EntityKind, id: impl Into<String>) -> Self {
        FleetError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        FleetError::Validation(msg.into())
    }
}

impl From<OrderError> for FleetError {
    fn from(err: OrderError) -> Self {
        FleetError::StateConflict(err.to_string())
    }
}

impl From<DriverError> for FleetError {
    fn from(err: DriverError) -> Self {
        FleetError::StateConflict(err.to_string())
    }
}

impl From<serde_json::Error> for FleetError {
    fn from(err: serde_json::Error) -> Self {
        FleetError::Internal(format!("serialization failed: {}", err))
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
