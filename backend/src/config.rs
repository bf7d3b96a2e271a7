//! Dispatch run configuration
//!
//! [`SimulationRequest`] mirrors raw operator input (every field optional,
//! numbers loosely typed). [`SimulationParams`] is the validated form the
//! engine runs on. Validation happens before any store access.

use crate::core::time::{format_clock_time, parse_clock_time, parse_dispatch_date};
use crate::error::FleetError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Smallest accepted per-driver hour budget
pub const MIN_HOURS_PER_DRIVER: f64 = 1.0;

/// Largest accepted per-driver hour budget
pub const MAX_HOURS_PER_DRIVER: f64 = 12.0;

/// Raw run request as submitted by an operator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub available_drivers: Option<f64>,
    pub route_start_time: Option<String>,
    pub max_hours_per_driver: Option<f64>,
    /// `YYYY-MM-DD`; defaults to the date of the earliest pending order
    pub dispatch_date: Option<String>,
}

/// Validated run parameters
///
/// # Example
/// ```
/// use fleet_dispatch_core::{SimulationParams, SimulationRequest};
///
/// let request = SimulationRequest {
///     available_drivers: Some(3.0),
///     route_start_time: Some("09:00".to_string()),
///     max_hours_per_driver: Some(8.0),
///     dispatch_date: None,
/// };
/// let params = SimulationParams::try_from(request).unwrap();
/// assert_eq!(params.available_drivers(), 3);
/// assert_eq!(params.budget_minutes(), 480);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Cap on how many available drivers the run considers
    available_drivers: usize,

    /// Clock time at which every driver sets off
    route_start_time: NaiveTime,

    max_hours_per_driver: f64,

    #[serde(default)]
    dispatch_date: Option<NaiveDate>,
}

impl SimulationParams {
    /// Build validated parameters
    pub fn new(
        available_drivers: usize,
        route_start_time: NaiveTime,
        max_hours_per_driver: f64,
    ) -> Result<Self, FleetError> {
        if available_drivers == 0 {
            return Err(FleetError::validation("availableDrivers must be a positive integer"));
        }
        if !(MIN_HOURS_PER_DRIVER..=MAX_HOURS_PER_DRIVER).contains(&max_hours_per_driver) {
            return Err(FleetError::validation(format!(
                "maxHoursPerDriver must be between {} and {}, got {}",
                MIN_HOURS_PER_DRIVER, MAX_HOURS_PER_DRIVER, max_hours_per_driver
            )));
        }

        Ok(Self {
            available_drivers,
            route_start_time,
            max_hours_per_driver,
            dispatch_date: None,
        })
    }

    /// Pin the run to a specific dispatch date (builder pattern)
    pub fn with_dispatch_date(mut self, date: NaiveDate) -> Self {
        self.dispatch_date = Some(date);
        self
    }

    pub fn available_drivers(&self) -> usize {
        self.available_drivers
    }

    pub fn route_start_time(&self) -> NaiveTime {
        self.route_start_time
    }

    /// Start time as `HH:MM`
    pub fn route_start_label(&self) -> String {
        format_clock_time(self.route_start_time)
    }

    pub fn max_hours_per_driver(&self) -> f64 {
        self.max_hours_per_driver
    }

    pub fn dispatch_date(&self) -> Option<NaiveDate> {
        self.dispatch_date
    }

    /// Hour budget in whole minutes
    ///
    /// Committed time is always whole minutes, so flooring the budget keeps
    /// `committed <= max_hours * 60` exact.
    pub fn budget_minutes(&self) -> u32 {
        (self.max_hours_per_driver * 60.0).floor() as u32
    }
}

impl TryFrom<SimulationRequest> for SimulationParams {
    type Error = FleetError;

    fn try_from(request: SimulationRequest) -> Result<Self, Self::Error> {
        let mut missing = Vec::new();
        if request.available_drivers.is_none() {
            missing.push("availableDrivers");
        }
        if request.route_start_time.as_deref().map_or(true, str::is_empty) {
            missing.push("routeStartTime");
        }
        if request.max_hours_per_driver.is_none() {
            missing.push("maxHoursPerDriver");
        }
        if !missing.is_empty() {
            return Err(FleetError::validation(format!(
                "Missing required parameters: {}",
                missing.join(", ")
            )));
        }

        let drivers = request.available_drivers.unwrap_or_default();
        if !drivers.is_finite() || drivers < 1.0 || drivers.fract() != 0.0 {
            return Err(FleetError::validation(format!(
                "availableDrivers must be a positive integer, got {}",
                drivers
            )));
        }

        let max_hours = request.max_hours_per_driver.unwrap_or_default();
        if !max_hours.is_finite() {
            return Err(FleetError::validation("maxHoursPerDriver must be a finite number"));
        }

        let start = parse_clock_time(request.route_start_time.as_deref().unwrap_or_default())?;
        let params = SimulationParams::new(drivers as usize, start, max_hours)?;

        match request.dispatch_date.as_deref() {
            Some(raw) => Ok(params.with_dispatch_date(parse_dispatch_date(raw)?)),
            None => Ok(params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(drivers: Option<f64>, start: Option<&str>, hours: Option<f64>) -> SimulationRequest {
        SimulationRequest {
            available_drivers: drivers,
            route_start_time: start.map(str::to_string),
            max_hours_per_driver: hours,
            dispatch_date: None,
        }
    }

    #[test]
    fn reports_every_missing_parameter() {
        let err = SimulationParams::try_from(request(None, None, Some(8.0))).unwrap_err();
        assert_eq!(
            err,
            FleetError::validation("Missing required parameters: availableDrivers, routeStartTime")
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        for req in [
            request(Some(0.0), Some("09:00"), Some(8.0)),
            request(Some(-2.0), Some("09:00"), Some(8.0)),
            request(Some(1.5), Some("09:00"), Some(8.0)),
            request(Some(2.0), Some("09:00"), Some(0.5)),
            request(Some(2.0), Some("09:00"), Some(12.5)),
            request(Some(2.0), Some("9am"), Some(8.0)),
        ] {
            assert!(matches!(SimulationParams::try_from(req), Err(FleetError::Validation(_))));
        }
    }

    #[test]
    fn fractional_budget_floors_to_whole_minutes() {
        let params = SimulationParams::try_from(request(Some(1.0), Some("09:00"), Some(7.51))).unwrap();
        assert_eq!(params.budget_minutes(), 450);
    }

    #[test]
    fn parses_camel_case_json() {
        let req: SimulationRequest = serde_json::from_str(
            r#"{"availableDrivers": 2, "routeStartTime": "08:15", "maxHoursPerDriver": 10, "dispatchDate": "2024-06-01"}"#,
        )
        .unwrap();
        let params = SimulationParams::try_from(req).unwrap();
        assert_eq!(params.route_start_label(), "08:15");
        assert_eq!(params.dispatch_date(), NaiveDate::from_ymd_opt(2024, 6, 1));
    }
}
