//! Driver model
//!
//! Represents a delivery driver. Each driver has:
//! - Hours committed in the current shift
//! - A 7-day rolling work history and the cached fatigue flag derived from it
//! - An operator-set fatigue tier (independent of the flag)
//! - Status (Available, OnRoute, OffDuty)
//!
//! # Status transitions
//!
//! ```text
//! Available --assign--> OnRoute --end shift--> OffDuty --start day--> Available
//!     |                    |
//!     +----end shift-------+--(last order delivered)--> Available
//! ```

use crate::fatigue::{FatigueLevel, WorkHistory};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Driver status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverStatus {
    Available,
    OnRoute,
    OffDuty,
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DriverStatus::Available => "available",
            DriverStatus::OnRoute => "on-route",
            DriverStatus::OffDuty => "off-duty",
        };
        f.write_str(s)
    }
}

/// Errors that can occur during driver status changes
#[derive(Debug, Error, PartialEq)]
pub enum DriverError {
    #[error("Driver {id} is not available (current status: {status})")]
    NotAvailable { id: String, status: DriverStatus },

    #[error("Driver {id} fatigue level is too high for new assignments")]
    FatigueTooHigh { id: String },

    #[error("Driver {id} is already off duty")]
    AlreadyOffDuty { id: String },

    #[error("Driver {id} is still on route; end the shift before starting a new day")]
    StillOnRoute { id: String },

    #[error("Driver {id} has {hours} unrecorded shift hours; end the shift before starting a new day")]
    ShiftStillOpen { id: String, hours: f64 },

    #[error("Shift hours must be a non-negative number, got {0}")]
    InvalidHours(f64),
}

/// A delivery driver
///
/// # Example
/// ```
/// use fleet_dispatch_core::{Driver, DriverStatus};
///
/// let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
/// assert_eq!(driver.status(), DriverStatus::Available);
///
/// driver.commit_planned_hours(9.0).unwrap();
/// driver.end_shift().unwrap();
/// driver.start_day().unwrap();
///
/// assert!(driver.is_fatigued());
/// assert_eq!(driver.status(), DriverStatus::Available);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    /// Unique driver identifier (e.g., "DRV-1")
    id: String,

    name: String,

    /// Hours committed in the shift currently open
    current_shift_hours: f64,

    /// Daily hours over the last 7 days (index 0 = current day)
    past_week_work_hours: WorkHistory,

    /// Cached fatigue flag, refreshed from the history on rollover/delivery
    is_fatigued: bool,

    /// Operator-set tier gating manual assignment
    #[serde(default)]
    fatigue_level: FatigueLevel,

    status: DriverStatus,

    /// Set by the first manual assignment of a shift
    #[serde(default)]
    shift_started_at: Option<NaiveDateTime>,

    #[serde(default)]
    phone_number: Option<String>,
}

impl Driver {
    /// Create a rested, available driver with an empty history
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            current_shift_hours: 0.0,
            past_week_work_hours: WorkHistory::new(),
            is_fatigued: false,
            fatigue_level: FatigueLevel::Normal,
            status: DriverStatus::Available,
            shift_started_at: None,
            phone_number: None,
        }
    }

    /// Set the work history and derive the fatigue flag from it (builder pattern)
    pub fn with_history(mut self, history: WorkHistory) -> Self {
        self.is_fatigued = history.is_fatiguing();
        self.past_week_work_hours = history;
        self
    }

    /// Set hours already committed in the open shift (builder pattern)
    ///
    /// # Panics
    /// Panics if `hours` is negative or not finite
    pub fn with_shift_hours(mut self, hours: f64) -> Self {
        assert!(hours.is_finite() && hours >= 0.0, "shift hours must be non-negative");
        self.current_shift_hours = hours;
        self
    }

    /// Override the cached fatigue flag (builder pattern)
    pub fn with_fatigue_flag(mut self, is_fatigued: bool) -> Self {
        self.is_fatigued = is_fatigued;
        self
    }

    /// Set the operator fatigue tier (builder pattern)
    pub fn with_fatigue_level(mut self, level: FatigueLevel) -> Self {
        self.fatigue_level = level;
        self
    }

    pub fn with_phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_shift_hours(&self) -> f64 {
        self.current_shift_hours
    }

    pub fn past_week_work_hours(&self) -> &WorkHistory {
        &self.past_week_work_hours
    }

    pub fn is_fatigued(&self) -> bool {
        self.is_fatigued
    }

    pub fn fatigue_level(&self) -> FatigueLevel {
        self.fatigue_level
    }

    pub fn status(&self) -> DriverStatus {
        self.status
    }

    pub fn shift_started_at(&self) -> Option<NaiveDateTime> {
        self.shift_started_at
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.status == DriverStatus::Available
    }

    // ========================================================================
    // Status transitions
    // ========================================================================

    /// Take a manual assignment
    ///
    /// Requires an available driver below the `High` fatigue tier. Opens the
    /// shift clock at `now` if no shift is open yet.
    pub fn take_manual_assignment(&mut self, now: NaiveDateTime) -> Result<(), DriverError> {
        if self.status != DriverStatus::Available {
            return Err(DriverError::NotAvailable {
                id: self.id.clone(),
                status: self.status,
            });
        }
        if !self.fatigue_level.allows_assignment() {
            return Err(DriverError::FatigueTooHigh { id: self.id.clone() });
        }

        self.status = DriverStatus::OnRoute;
        if self.shift_started_at.is_none() {
            self.shift_started_at = Some(now);
        }
        Ok(())
    }

    /// Commit hours planned by a dispatch run and put the driver on route
    ///
    /// Allowed from `Available` and `OnRoute`; an off-duty driver must start
    /// a new day first.
    pub fn commit_planned_hours(&mut self, hours: f64) -> Result<(), DriverError> {
        if !(hours.is_finite() && hours >= 0.0) {
            return Err(DriverError::InvalidHours(hours));
        }
        if self.status == DriverStatus::OffDuty {
            return Err(DriverError::NotAvailable {
                id: self.id.clone(),
                status: self.status,
            });
        }

        self.current_shift_hours += hours;
        self.status = DriverStatus::OnRoute;
        Ok(())
    }

    /// Return an on-route driver to `Available` once all orders are done
    pub fn release(&mut self) {
        if self.status == DriverStatus::OnRoute {
            self.status = DriverStatus::Available;
        }
    }

    /// End the open shift
    ///
    /// Adds the shift hours to the current day of the history, resets the
    /// shift and marks the driver off duty.
    pub fn end_shift(&mut self) -> Result<f64, DriverError> {
        if self.status == DriverStatus::OffDuty {
            return Err(DriverError::AlreadyOffDuty { id: self.id.clone() });
        }

        let worked = self.current_shift_hours;
        self.past_week_work_hours.record_shift(worked);
        self.current_shift_hours = 0.0;
        self.shift_started_at = None;
        self.status = DriverStatus::OffDuty;
        Ok(worked)
    }

    /// Close the current day in the history and refresh the fatigue flag
    pub fn rollover_day(&mut self) -> f64 {
        let closed = self.past_week_work_hours.rollover();
        self.refresh_fatigue();
        closed
    }

    /// Start a new working day
    ///
    /// Rolls the history over, resets shift hours and the fatigue tier, and
    /// makes the driver available. Refused while the driver is on route or
    /// while shift hours are still unrecorded, so the day being closed always
    /// includes them.
    pub fn start_day(&mut self) -> Result<(), DriverError> {
        if self.status == DriverStatus::OnRoute {
            return Err(DriverError::StillOnRoute { id: self.id.clone() });
        }
        if self.current_shift_hours > 0.0 {
            return Err(DriverError::ShiftStillOpen {
                id: self.id.clone(),
                hours: self.current_shift_hours,
            });
        }

        self.rollover_day();
        self.current_shift_hours = 0.0;
        self.shift_started_at = None;
        self.fatigue_level = FatigueLevel::Normal;
        self.status = DriverStatus::Available;
        Ok(())
    }

    /// Recompute the cached fatigue flag from the history
    pub fn refresh_fatigue(&mut self) {
        self.is_fatigued = self.past_week_work_hours.is_fatiguing();
    }

    /// Set the operator fatigue tier
    pub fn set_fatigue_level(&mut self, level: FatigueLevel) {
        self.fatigue_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn manual_assignment_opens_shift_once() {
        let mut driver = Driver::new("D1".to_string(), "A".to_string());
        driver.take_manual_assignment(at(9)).unwrap();
        assert_eq!(driver.shift_started_at(), Some(at(9)));
        assert_eq!(driver.status(), DriverStatus::OnRoute);

        driver.release();
        driver.take_manual_assignment(at(11)).unwrap();
        assert_eq!(driver.shift_started_at(), Some(at(9)));
    }

    #[test]
    fn start_day_refuses_open_shift() {
        let mut driver = Driver::new("D1".to_string(), "A".to_string()).with_shift_hours(3.0);
        assert_eq!(
            driver.start_day(),
            Err(DriverError::ShiftStillOpen {
                id: "D1".to_string(),
                hours: 3.0
            })
        );
    }

    #[test]
    fn end_shift_twice_fails() {
        let mut driver = Driver::new("D1".to_string(), "A".to_string());
        driver.end_shift().unwrap();
        assert!(matches!(driver.end_shift(), Err(DriverError::AlreadyOffDuty { .. })));
    }
}
