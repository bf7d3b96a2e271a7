//! Tests for the driver fatigue model across working days
//!
//! The binary flag comes from the rolling history and only affects dispatch
//! durations; the operator tier only gates manual assignment.

use chrono::{NaiveDate, NaiveDateTime};
use fleet_dispatch_core::fatigue::{delivery_minutes, WorkHistory, HISTORY_DAYS};
use fleet_dispatch_core::{Driver, DriverError, DriverStatus, FatigueLevel};

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 2)
        .unwrap()
        .and_hms_opt(7, 30, 0)
        .unwrap()
}

/// Work `hours` and end the shift
fn work_day(driver: &mut Driver, hours: f64) {
    driver.commit_planned_hours(hours).unwrap();
    driver.end_shift().unwrap();
}

#[test]
fn test_long_day_fatigues_driver_on_next_start() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    work_day(&mut driver, 9.0);

    // flag is only refreshed when the day closes
    assert!(!driver.is_fatigued());
    assert_eq!(driver.past_week_work_hours().current_day(), 9.0);

    driver.start_day().unwrap();
    assert!(driver.is_fatigued());
    assert_eq!(driver.past_week_work_hours().hours()[1], 9.0);
    assert_eq!(driver.past_week_work_hours().current_day(), 0.0);
}

#[test]
fn test_rested_day_clears_fatigue() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    work_day(&mut driver, 10.0);
    driver.start_day().unwrap();
    assert!(driver.is_fatigued());

    work_day(&mut driver, 5.0);
    driver.start_day().unwrap();
    assert!(!driver.is_fatigued());
}

#[test]
fn test_split_shifts_add_up_within_one_day() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.commit_planned_hours(5.0).unwrap();
    driver.release();
    driver.commit_planned_hours(4.0).unwrap();
    driver.end_shift().unwrap();
    assert_eq!(driver.past_week_work_hours().current_day(), 9.0);

    driver.start_day().unwrap();
    assert!(driver.is_fatigued());
}

#[test]
fn test_start_day_refused_while_on_route() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.commit_planned_hours(3.0).unwrap();

    assert_eq!(
        driver.start_day(),
        Err(DriverError::StillOnRoute { id: "DRV-1".to_string() })
    );
}

#[test]
fn test_start_day_refused_with_unrecorded_hours() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.commit_planned_hours(9.5).unwrap();
    driver.release();

    assert_eq!(
        driver.start_day(),
        Err(DriverError::ShiftStillOpen {
            id: "DRV-1".to_string(),
            hours: 9.5
        })
    );
    assert_eq!(driver.status(), DriverStatus::Available);
}

#[test]
fn test_start_day_resets_tier_and_status() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string())
        .with_fatigue_level(FatigueLevel::High);
    work_day(&mut driver, 2.0);
    assert_eq!(driver.status(), DriverStatus::OffDuty);

    driver.start_day().unwrap();
    assert_eq!(driver.fatigue_level(), FatigueLevel::Normal);
    assert_eq!(driver.status(), DriverStatus::Available);
    assert_eq!(driver.current_shift_hours(), 0.0);
}

#[test]
fn test_flag_and_tier_are_independent() {
    // flagged by history, but tier is normal: manual assignment allowed
    let history = WorkHistory::from_hours([0.0, 11.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let mut flagged = Driver::new("DRV-1".to_string(), "Asha".to_string()).with_history(history);
    assert!(flagged.is_fatigued());
    assert!(flagged.take_manual_assignment(now()).is_ok());

    // not flagged, but tier high: manual assignment refused
    let mut high_tier = Driver::new("DRV-2".to_string(), "Ravi".to_string())
        .with_fatigue_level(FatigueLevel::High);
    assert!(!high_tier.is_fatigued());
    assert_eq!(
        high_tier.take_manual_assignment(now()),
        Err(DriverError::FatigueTooHigh { id: "DRV-2".to_string() })
    );
    assert_eq!(high_tier.status(), DriverStatus::Available);
}

#[test]
fn test_rollover_drops_oldest_day() {
    let mut history = WorkHistory::from_hours([2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    history.rollover();

    assert_eq!(history.hours().len(), HISTORY_DAYS);
    assert_eq!(history.hours(), &[0.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    assert_eq!(history.weekly_total(), 27.0);
}

#[test]
fn test_history_serializes_as_plain_array() {
    let history = WorkHistory::from_hours([0.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    let json = serde_json::to_string(&history).unwrap();
    assert_eq!(json, "[0.0,9.0,0.0,0.0,0.0,0.0,0.0]");

    let back: WorkHistory = serde_json::from_str(&json).unwrap();
    assert!(back.is_fatiguing());
}

#[test]
fn test_fatigued_duration() {
    assert_eq!(delivery_minutes(60, true), 78);
    assert_eq!(delivery_minutes(60, false), 60);
    assert_eq!(delivery_minutes(120, true), 156);
}
