//! Clock handling for dispatch runs
//!
//! A run starts at a single dispatch instant (dispatch date + route start
//! time). Each driver then carries its own [`ShiftClock`] that advances by
//! whole minutes as deliveries are committed to it.

use crate::error::FleetError;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Parse an `HH:MM` clock time
///
/// Accepts a one- or two-digit hour (0-23) and a two-digit minute (00-59),
/// e.g. `"9:30"` or `"09:30"`.
///
/// # Example
/// ```
/// use fleet_dispatch_core::core::time::parse_clock_time;
///
/// let t = parse_clock_time("09:30").unwrap();
/// assert_eq!(t.to_string(), "09:30:00");
/// assert!(parse_clock_time("24:00").is_err());
/// ```
pub fn parse_clock_time(raw: &str) -> Result<NaiveTime, FleetError> {
    let invalid =
        || FleetError::validation(format!("Invalid route start time '{}', use HH:MM (e.g. 09:30)", raw));

    let (hours, minutes) = raw.split_once(':').ok_or_else(invalid)?;
    if hours.is_empty()
        || hours.len() > 2
        || minutes.len() != 2
        || !hours.bytes().all(|b| b.is_ascii_digit())
        || !minutes.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

/// Parse a `YYYY-MM-DD` dispatch date
pub fn parse_dispatch_date(raw: &str) -> Result<NaiveDate, FleetError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| FleetError::validation(format!("Invalid dispatch date '{}', use YYYY-MM-DD", raw)))
}

/// Format a clock time back into `HH:MM`
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Convert whole minutes to fractional hours
pub fn minutes_to_hours(minutes: u32) -> f64 {
    f64::from(minutes) / 60.0
}

/// Per-driver clock for a single dispatch run
///
/// Tracks the minutes committed to a driver since the dispatch instant.
/// Committed time is kept in whole minutes so budget checks are exact.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use fleet_dispatch_core::core::time::ShiftClock;
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let mut clock = ShiftClock::new(start);
/// assert!(clock.fits(60, 8 * 60));
///
/// let arrival = clock.commit(60);
/// assert_eq!(arrival, start + chrono::Duration::minutes(60));
/// assert_eq!(clock.committed_minutes(), 60);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftClock {
    /// Dispatch instant the clock counts from
    start: NaiveDateTime,
    /// Minutes committed so far this run
    committed_minutes: u32,
}

impl ShiftClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            committed_minutes: 0,
        }
    }

    /// Check whether `minutes` more fit within `budget_minutes`
    pub fn fits(&self, minutes: u32, budget_minutes: u32) -> bool {
        self.committed_minutes
            .checked_add(minutes)
            .map_or(false, |total| total <= budget_minutes)
    }

    /// Commit a delivery and return the clock time at which it completes
    pub fn commit(&mut self, minutes: u32) -> NaiveDateTime {
        self.committed_minutes += minutes;
        self.now()
    }

    /// Clock time after all committed deliveries
    pub fn now(&self) -> NaiveDateTime {
        self.start + Duration::minutes(i64::from(self.committed_minutes))
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn committed_minutes(&self) -> u32 {
        self.committed_minutes
    }

    pub fn committed_hours(&self) -> f64 {
        minutes_to_hours(self.committed_minutes)
    }
}
