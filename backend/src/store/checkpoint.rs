//! Checkpoint - save/load the entity store
//!
//! A checkpoint is a JSON document holding every record plus an optional
//! SHA-256 checksum of the records. Hand-written fleet files may omit the
//! checksum; files written by [`MemoryStore::to_json`] always carry one.
//!
//! # Checks on load
//!
//! - **Checksum**: if present, must match the records
//! - **Id uniqueness**: no id repeats within an entity kind
//! - **Route references**: every order's route exists
//! - **Field ranges**: distances, shift hours and history slots are finite
//!   and non-negative; order values lie in `0..=MAX_ORDER_VALUE`
//!
//! Dangling driver references on orders are accepted: driver deletion is
//! unguarded.

use crate::error::{FleetError, FleetResult};
use crate::models::order::is_valid_value;
use crate::models::{Driver, Order, Route, SimulationRecord};
use crate::store::{EntityStore, MemoryStore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Serialized form of a [`MemoryStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreCheckpoint {
    #[serde(default)]
    pub drivers: Vec<Driver>,

    #[serde(default)]
    pub routes: Vec<Route>,

    #[serde(default)]
    pub orders: Vec<Order>,

    #[serde(default)]
    pub simulations: Vec<SimulationRecord>,

    /// SHA-256 of the records (hex)
    #[serde(default)]
    pub checksum: Option<String>,
}

#[derive(Serialize)]
struct ChecksumInput<'a> {
    drivers: &'a [Driver],
    routes: &'a [Route],
    orders: &'a [Order],
    simulations: &'a [SimulationRecord],
}

impl StoreCheckpoint {
    /// Compute the checksum of the records in this checkpoint
    pub fn compute_checksum(&self) -> FleetResult<String> {
        compute_content_hash(&ChecksumInput {
            drivers: &self.drivers,
            routes: &self.routes,
            orders: &self.orders,
            simulations: &self.simulations,
        })
    }
}

/// Deterministic SHA-256 of any serializable value
///
/// Object keys are sorted before hashing so the digest does not depend on
/// map iteration order.
pub fn compute_content_hash<T: Serialize>(value: &T) -> FleetResult<String> {
    use serde_json::Value;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical = canonicalize(serde_json::to_value(value)?);
    let json = serde_json::to_string(&canonical)?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

impl MemoryStore {
    /// Snapshot every record, with checksum
    pub fn to_checkpoint(&self) -> FleetResult<StoreCheckpoint> {
        let mut checkpoint = StoreCheckpoint {
            drivers: self.drivers.values().cloned().collect(),
            routes: self.routes.values().cloned().collect(),
            orders: self.orders.values().cloned().collect(),
            simulations: self.simulations.values().cloned().collect(),
            checksum: None,
        };
        checkpoint.checksum = Some(checkpoint.compute_checksum()?);
        Ok(checkpoint)
    }

    /// Rebuild a store from a checkpoint, validating it first
    pub fn from_checkpoint(checkpoint: StoreCheckpoint) -> FleetResult<Self> {
        if let Some(expected) = &checkpoint.checksum {
            let actual = checkpoint.compute_checksum()?;
            if &actual != expected {
                return Err(FleetError::validation(format!(
                    "Checkpoint checksum mismatch: expected {}, got {}",
                    expected, actual
                )));
            }
        }

        let mut store = MemoryStore::new();
        for route in checkpoint.routes {
            check_route(&route)?;
            store.insert_route(route).map_err(as_validation)?;
        }
        for driver in checkpoint.drivers {
            check_driver(&driver)?;
            store.insert_driver(driver).map_err(as_validation)?;
        }
        for order in checkpoint.orders {
            if !is_valid_value(order.value_paise()) {
                return Err(FleetError::validation(format!(
                    "Order {} has out-of-range value {}",
                    order.id(),
                    order.value_paise()
                )));
            }
            if !store.routes.contains_key(order.route_id()) {
                return Err(FleetError::validation(format!(
                    "Order {} references unknown route {}",
                    order.id(),
                    order.route_id()
                )));
            }
            store.insert_order(order).map_err(as_validation)?;
        }
        for simulation in checkpoint.simulations {
            store.insert_simulation(simulation).map_err(as_validation)?;
        }
        Ok(store)
    }

    /// Serialize the store to pretty JSON
    pub fn to_json(&self) -> FleetResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_checkpoint()?)?)
    }

    /// Load a store from JSON produced by [`MemoryStore::to_json`] or written by hand
    pub fn from_json(json: &str) -> FleetResult<Self> {
        let checkpoint: StoreCheckpoint = serde_json::from_str(json)
            .map_err(|e| FleetError::validation(format!("Malformed checkpoint: {}", e)))?;
        Self::from_checkpoint(checkpoint)
    }
}

fn is_non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

fn check_route(route: &Route) -> FleetResult<()> {
    if !is_non_negative(route.distance_km()) {
        return Err(FleetError::validation(format!(
            "Route {} has invalid distance {}",
            route.id(),
            route.distance_km()
        )));
    }
    Ok(())
}

fn check_driver(driver: &Driver) -> FleetResult<()> {
    if !is_non_negative(driver.current_shift_hours()) {
        return Err(FleetError::validation(format!(
            "Driver {} has invalid shift hours {}",
            driver.id(),
            driver.current_shift_hours()
        )));
    }
    if let Some(day) = driver
        .past_week_work_hours()
        .hours()
        .iter()
        .find(|h| !is_non_negative(**h))
    {
        return Err(FleetError::validation(format!(
            "Driver {} has invalid work history entry {}",
            driver.id(),
            day
        )));
    }
    Ok(())
}

fn as_validation(err: FleetError) -> FleetError {
    match err {
        FleetError::StateConflict(msg) => FleetError::validation(format!("Invalid checkpoint: {}", msg)),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_ignores_key_order() {
        let a: serde_json::Value = serde_json::from_str(r#"{"x": 1, "y": [1, 2]}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"y": [1, 2], "x": 1}"#).unwrap();
        assert_eq!(compute_content_hash(&a).unwrap(), compute_content_hash(&b).unwrap());
    }

    #[test]
    fn content_hash_differs_for_different_values() {
        let a = serde_json::json!({ "value": 42 });
        let b = serde_json::json!({ "value": 43 });
        assert_ne!(compute_content_hash(&a).unwrap(), compute_content_hash(&b).unwrap());
    }
}
