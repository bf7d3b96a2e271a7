//! Simulation record
//!
//! A simulation is the persisted result of one dispatch run. It is
//! write-once: built from a finished allocation and never mutated after.
//! Applying a simulation mutates live orders and drivers, not this record.

use crate::config::SimulationParams;
use crate::rules::FuelCostBreakdown;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Fleet-wide results of a run
///
/// CRITICAL: All money values are i64 (paise)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationKpis {
    pub total_profit: i64,

    /// Percentage of deliveries on time, 0 when nothing was delivered
    pub efficiency_score: f64,

    pub on_time_deliveries: usize,
    pub late_deliveries: usize,
    pub total_deliveries: usize,
    pub fuel_costs: i64,
    pub high_value_bonuses: i64,
    pub late_penalties: i64,
}

/// Orders planned for one driver, in delivery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverAssignment {
    pub driver_id: String,
    pub order_ids: Vec<String>,
    pub total_hours: f64,
    pub total_distance_km: f64,
}

impl DriverAssignment {
    pub fn new(driver_id: String) -> Self {
        Self {
            driver_id,
            order_ids: Vec::new(),
            total_hours: 0.0,
            total_distance_km: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_ids.is_empty()
    }
}

/// Persisted result of one dispatch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Unique simulation identifier (UUID)
    id: String,

    created_at: NaiveDateTime,

    parameters: SimulationParams,

    kpis: SimulationKpis,

    driver_assignments: Vec<DriverAssignment>,

    fuel_cost_breakdown: FuelCostBreakdown,

    /// Orders no driver had room for
    #[serde(default)]
    unassigned_orders: Vec<String>,
}

impl SimulationRecord {
    pub fn new(
        created_at: NaiveDateTime,
        parameters: SimulationParams,
        kpis: SimulationKpis,
        driver_assignments: Vec<DriverAssignment>,
        fuel_cost_breakdown: FuelCostBreakdown,
        unassigned_orders: Vec<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            parameters,
            kpis,
            driver_assignments,
            fuel_cost_breakdown,
            unassigned_orders,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn parameters(&self) -> &SimulationParams {
        &self.parameters
    }

    pub fn kpis(&self) -> &SimulationKpis {
        &self.kpis
    }

    pub fn driver_assignments(&self) -> &[DriverAssignment] {
        &self.driver_assignments
    }

    pub fn fuel_cost_breakdown(&self) -> &FuelCostBreakdown {
        &self.fuel_cost_breakdown
    }

    pub fn unassigned_orders(&self) -> &[String] {
        &self.unassigned_orders
    }
}
