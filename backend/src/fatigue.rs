//! Driver fatigue model
//!
//! Two independent notions of fatigue live here:
//!
//! - The **binary flag** derived from a 7-slot rolling history of daily work
//!   hours. Used by dispatch runs to stretch delivery durations.
//! - The **tiered level** (normal/moderate/high) set by an operator. Used
//!   only to gate manual assignments.
//!
//! The two are never merged: a driver may be flagged fatigued at tier
//! `Normal`, or at tier `High` without the flag.
//!
//! # History layout
//!
//! Slot 0 is the current working day (closed shifts accumulate into it);
//! slot 1 is the most recently completed day. A day rollover closes slot 0
//! by shifting it to slot 1 and opening a fresh zero slot.
//!
//! Shift hours must be recorded (end of shift) *before* the rollover that
//! closes the day, otherwise the closed day reads as zero and the driver
//! is never flagged.

use serde::{Deserialize, Serialize};

/// Number of days kept in the rolling history
pub const HISTORY_DAYS: usize = 7;

/// A day strictly above this many hours fatigues the driver
pub const FATIGUE_THRESHOLD_HOURS: f64 = 8.0;

/// Fatigued drivers take 30% longer (expressed in tenths)
const FATIGUE_SLOWDOWN_TENTHS: u64 = 13;

/// Rolling 7-day record of hours worked
///
/// # Example
/// ```
/// use fleet_dispatch_core::fatigue::WorkHistory;
///
/// let mut history = WorkHistory::new();
/// history.record_shift(9.0);
/// history.rollover();
///
/// assert_eq!(history.hours(), &[0.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// assert!(history.is_fatiguing());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkHistory {
    days: [f64; HISTORY_DAYS],
}

impl Default for WorkHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkHistory {
    /// Create an empty history (all zeros)
    pub fn new() -> Self {
        Self {
            days: [0.0; HISTORY_DAYS],
        }
    }

    /// Create a history from explicit daily hours (index 0 = current day)
    pub fn from_hours(days: [f64; HISTORY_DAYS]) -> Self {
        Self { days }
    }

    pub fn hours(&self) -> &[f64; HISTORY_DAYS] {
        &self.days
    }

    /// Hours recorded so far for the current day
    pub fn current_day(&self) -> f64 {
        self.days[0]
    }

    /// Hours of the most recently completed day
    pub fn previous_day(&self) -> f64 {
        self.days[1]
    }

    /// Add a finished shift to the current day
    pub fn record_shift(&mut self, hours: f64) {
        self.days[0] += hours;
    }

    /// Close the current day: drop the oldest slot, open a fresh one
    ///
    /// Returns the hours of the day that was just closed.
    pub fn rollover(&mut self) -> f64 {
        let closed = self.days[0];
        self.days.rotate_right(1);
        self.days[0] = 0.0;
        closed
    }

    /// Total hours across the whole window
    pub fn weekly_total(&self) -> f64 {
        self.days.iter().sum()
    }

    /// Whether the history currently implies fatigue
    ///
    /// True if the current day or the last completed day went over the
    /// threshold. Right after a rollover the current day is zero, so this
    /// reduces to "the day just closed went over 8 hours".
    pub fn is_fatiguing(&self) -> bool {
        self.current_day() > FATIGUE_THRESHOLD_HOURS || self.previous_day() > FATIGUE_THRESHOLD_HOURS
    }
}

/// Delivery duration for a route, adjusted for the driver's fatigue flag
///
/// A fatigued driver takes 1.3x the base time, rounded half-up to the
/// nearest whole minute. Durations past `u32::MAX` saturate, which no
/// hour budget can fit.
///
/// # Example
/// ```
/// use fleet_dispatch_core::fatigue::delivery_minutes;
///
/// assert_eq!(delivery_minutes(60, false), 60);
/// assert_eq!(delivery_minutes(60, true), 78);
/// assert_eq!(delivery_minutes(5, true), 7); // 6.5 rounds up
/// ```
pub fn delivery_minutes(base_time_minutes: u32, is_fatigued: bool) -> u32 {
    if is_fatigued {
        let stretched = (u64::from(base_time_minutes) * FATIGUE_SLOWDOWN_TENTHS + 5) / 10;
        u32::try_from(stretched).unwrap_or(u32::MAX)
    } else {
        base_time_minutes
    }
}

/// Operator-assigned fatigue tier for manual assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FatigueLevel {
    Normal,
    Moderate,
    High,
}

impl Default for FatigueLevel {
    fn default() -> Self {
        FatigueLevel::Normal
    }
}

impl FatigueLevel {
    /// Whether a driver at this tier may take a manual assignment
    pub fn allows_assignment(&self) -> bool {
        !matches!(self, FatigueLevel::High)
    }
}

impl std::str::FromStr for FatigueLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(FatigueLevel::Normal),
            "moderate" => Ok(FatigueLevel::Moderate),
            "high" => Ok(FatigueLevel::High),
            other => Err(format!("Invalid fatigue level '{}'", other)),
        }
    }
}
