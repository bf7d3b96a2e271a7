//! Tests for order and driver status transitions
//!
//! Orders: Pending -> Assigned -> InTransit -> Delivered, plus
//! Pending -> Delayed and Pending -> Cancelled. Delivered and Cancelled are
//! terminal.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fleet_dispatch_core::{
    Driver, DriverError, DriverStatus, Order, OrderError, OrderStatus, OrderUpdate, Route, TrafficLevel,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn due() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 11, 12)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

fn route() -> Route {
    Route::new("RT-1".to_string(), 10.0, TrafficLevel::Medium, 60)
}

fn order(value: i64) -> Order {
    Order::new("ORD-1".to_string(), value, "RT-1".to_string(), due())
}

fn in_transit(value: i64) -> Order {
    let mut order = order(value);
    order.assign("DRV-1").unwrap();
    order.dispatch().unwrap();
    order
}

// ============================================================================
// Orders
// ============================================================================

#[test]
fn test_new_order_is_pending_and_unsettled() {
    let order = order(150_000);
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.driver_id(), None);
    assert_eq!(order.is_delivered_on_time(), None);
    assert_eq!(order.profit(), 0);
}

#[test]
fn test_happy_path_stamps_financials() {
    let mut order = in_transit(150_000);
    let settlement = order
        .complete_delivery(due() + Duration::minutes(55), &route())
        .unwrap();

    assert!(settlement.on_time);
    assert_eq!(order.status(), OrderStatus::Delivered);
    assert_eq!(order.actual_delivery_time(), Some(due() + Duration::minutes(55)));
    assert_eq!(order.is_delivered_on_time(), Some(true));
    assert_eq!(order.fuel_cost(), 5_000);
    assert_eq!(order.high_value_bonus(), 15_000);
    assert_eq!(order.late_penalty(), 0);
    assert_eq!(order.profit(), 160_000);
}

#[test]
fn test_late_delivery_stamps_penalty() {
    let mut order = in_transit(150_000);
    order
        .complete_delivery(due() + Duration::minutes(71), &route())
        .unwrap();

    assert_eq!(order.is_delivered_on_time(), Some(false));
    assert_eq!(order.late_penalty(), 5_000);
    assert_eq!(order.high_value_bonus(), 0);
    assert_eq!(order.profit(), 140_000);
}

#[test]
fn test_cannot_skip_in_transit() {
    let mut order = order(10_000);
    order.assign("DRV-1").unwrap();

    let err = order.complete_delivery(due(), &route()).unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            id: "ORD-1".to_string(),
            from: OrderStatus::Assigned,
            to: OrderStatus::Delivered,
        }
    );
    assert_eq!(order.actual_delivery_time(), None);
}

#[test]
fn test_cannot_dispatch_pending_order() {
    let mut order = order(10_000);
    assert!(matches!(order.dispatch(), Err(OrderError::InvalidTransition { .. })));
    assert_eq!(order.status(), OrderStatus::Pending);
}

#[test]
fn test_delivered_order_is_frozen() {
    let mut order = in_transit(10_000);
    order.complete_delivery(due(), &route()).unwrap();

    assert!(matches!(order.cancel(), Err(OrderError::Terminal { .. })));
    assert!(matches!(
        order.complete_delivery(due(), &route()),
        Err(OrderError::Terminal { .. })
    ));
    let update = OrderUpdate {
        value_paise: Some(1),
        ..Default::default()
    };
    assert!(matches!(order.update_details(&update), Err(OrderError::Terminal { .. })));
    assert_eq!(order.value_paise(), 10_000);
}

#[test]
fn test_delayed_order_has_no_way_forward() {
    let mut order = order(10_000);
    order.delay().unwrap();
    assert!(!order.is_terminal());

    assert!(order.assign("DRV-1").is_err());
    assert!(order.cancel().is_err());
    assert!(order.dispatch().is_err());
    assert_eq!(order.status(), OrderStatus::Delayed);
}

#[test]
fn test_assigned_order_cannot_be_cancelled() {
    let mut order = order(10_000);
    order.assign("DRV-1").unwrap();
    assert!(matches!(order.cancel(), Err(OrderError::InvalidTransition { .. })));
}

#[test]
fn test_update_pending_order_details() {
    let mut order = order(10_000);
    let update = OrderUpdate {
        value_paise: Some(25_000),
        customer_name: Some("Meera".to_string()),
        notes: Some("ring twice".to_string()),
        ..Default::default()
    };
    order.update_details(&update).unwrap();

    assert_eq!(order.value_paise(), 25_000);
    assert_eq!(order.customer_name(), Some("Meera"));
    assert_eq!(order.notes(), Some("ring twice"));
    assert_eq!(order.route_id(), "RT-1");
}

#[test]
fn test_negative_value_update_rejected() {
    let mut order = order(10_000);
    let update = OrderUpdate {
        value_paise: Some(-5),
        ..Default::default()
    };
    assert_eq!(order.update_details(&update), Err(OrderError::InvalidValue(-5)));
    assert_eq!(order.value_paise(), 10_000);
}

#[test]
fn test_status_strings() {
    assert_eq!(OrderStatus::InTransit.to_string(), "in-transit");
    assert_eq!("cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
    assert!("shipped".parse::<OrderStatus>().is_err());
}

// ============================================================================
// Drivers
// ============================================================================

#[test]
fn test_driver_cannot_take_second_manual_assignment_while_on_route() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.take_manual_assignment(due()).unwrap();

    assert_eq!(
        driver.take_manual_assignment(due()),
        Err(DriverError::NotAvailable {
            id: "DRV-1".to_string(),
            status: DriverStatus::OnRoute,
        })
    );
}

#[test]
fn test_off_duty_driver_cannot_take_planned_hours() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.end_shift().unwrap();

    assert!(matches!(
        driver.commit_planned_hours(2.0),
        Err(DriverError::NotAvailable { .. })
    ));
    assert_eq!(driver.current_shift_hours(), 0.0);
}

#[test]
fn test_end_shift_twice_is_refused() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.commit_planned_hours(4.0).unwrap();
    assert_eq!(driver.end_shift(), Ok(4.0));
    assert_eq!(
        driver.end_shift(),
        Err(DriverError::AlreadyOffDuty { id: "DRV-1".to_string() })
    );
}

#[test]
fn test_end_shift_clears_shift_start() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    driver.take_manual_assignment(due()).unwrap();
    assert_eq!(driver.shift_started_at(), Some(due()));

    driver.end_shift().unwrap();
    assert_eq!(driver.shift_started_at(), None);
    assert_eq!(driver.status(), DriverStatus::OffDuty);
}

#[test]
fn test_planned_hours_reject_negative() {
    let mut driver = Driver::new("DRV-1".to_string(), "Asha".to_string());
    assert_eq!(driver.commit_planned_hours(-1.0), Err(DriverError::InvalidHours(-1.0)));
    assert_eq!(driver.status(), DriverStatus::Available);
}
