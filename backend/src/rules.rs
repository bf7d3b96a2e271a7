//! Financial rules for a single delivery
//!
//! Pure, stateless functions. The rates are fixed business rules.
//!
//! CRITICAL: All money values are i64 paise (1 Rs = 100 paise)

use crate::models::route::{Route, TrafficLevel};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Base fuel cost per km (Rs 5)
pub const FUEL_COST_PER_KM: i64 = 500;

/// Extra fuel cost per km on high-traffic routes (Rs 2)
pub const HIGH_TRAFFIC_SURCHARGE_PER_KM: i64 = 200;

/// Minutes of slack past the expected arrival before a delivery is late
pub const LATE_GRACE_MINUTES: i64 = 10;

/// Flat penalty for a late delivery (Rs 50)
pub const LATE_PENALTY: i64 = 5_000;

/// Orders worth strictly more than this earn the bonus when on time (Rs 1000)
pub const HIGH_VALUE_THRESHOLD: i64 = 100_000;

/// Bonus share of the order value, in percent
pub const HIGH_VALUE_BONUS_PERCENT: i64 = 10;

/// Largest accepted order value (Rs 10 lakh crore); keeps fleet totals in i64
pub const MAX_ORDER_VALUE: i64 = 1_000_000_000_000_000;

/// Fuel cost of driving a route
///
/// `distance × 5 Rs`, plus `distance × 2 Rs` on high-traffic routes,
/// rounded to the nearest paisa.
///
/// # Example
/// ```
/// use fleet_dispatch_core::{rules, Route, TrafficLevel};
///
/// let medium = Route::new("R1".to_string(), 10.0, TrafficLevel::Medium, 60);
/// let high = Route::new("R2".to_string(), 10.0, TrafficLevel::High, 60);
/// assert_eq!(rules::fuel_cost(&medium), 5_000);
/// assert_eq!(rules::fuel_cost(&high), 7_000);
/// ```
pub fn fuel_cost(route: &Route) -> i64 {
    fuel_cost_for(route.distance_km(), route.traffic_level())
}

/// Fuel cost from raw distance and traffic tier
pub fn fuel_cost_for(distance_km: f64, traffic: TrafficLevel) -> i64 {
    let rate = match traffic {
        TrafficLevel::High => FUEL_COST_PER_KM + HIGH_TRAFFIC_SURCHARGE_PER_KM,
        TrafficLevel::Low | TrafficLevel::Medium => FUEL_COST_PER_KM,
    };
    (distance_km * rate as f64).round() as i64
}

/// Whether a delivery missed its window
///
/// Late means arriving after `requested + base_time + 10 min`. The base
/// time is the route's unadjusted time, even for fatigued drivers.
pub fn is_late(actual: NaiveDateTime, requested: NaiveDateTime, base_time_minutes: u32) -> bool {
    let cutoff = requested + Duration::minutes(i64::from(base_time_minutes) + LATE_GRACE_MINUTES);
    actual > cutoff
}

pub fn late_penalty(late: bool) -> i64 {
    if late {
        LATE_PENALTY
    } else {
        0
    }
}

/// 10% of the order value for high-value orders delivered on time
///
/// Rounded half-up to whole paise. Computed in i128 so no i64 value
/// overflows; the result is at most a tenth of `value`.
pub fn high_value_bonus(value: i64, late: bool) -> i64 {
    if value > HIGH_VALUE_THRESHOLD && !late {
        let bonus = (i128::from(value) * i128::from(HIGH_VALUE_BONUS_PERCENT) + 50) / 100;
        i64::try_from(bonus).unwrap_or(i64::MAX)
    } else {
        0
    }
}

pub fn profit(value: i64, bonus: i64, penalty: i64, fuel_cost: i64) -> i64 {
    value + bonus - penalty - fuel_cost
}

/// On-time percentage; 0 when nothing was delivered
pub fn efficiency_score(on_time: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        on_time as f64 / total as f64 * 100.0
    }
}

/// Financial outcome of one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySettlement {
    pub on_time: bool,
    pub late_penalty: i64,
    pub high_value_bonus: i64,
    pub fuel_cost: i64,
    pub profit: i64,
}

/// Apply every rule to one order/route/arrival combination
///
/// # Example
/// ```
/// use chrono::{Duration, NaiveDate};
/// use fleet_dispatch_core::{rules, Route, TrafficLevel};
///
/// let route = Route::new("R1".to_string(), 10.0, TrafficLevel::Medium, 60);
/// let requested = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
///
/// let on_time = rules::settle_delivery(150_000, &route, requested, requested + Duration::minutes(60));
/// assert_eq!(on_time.profit, 160_000);
///
/// let late = rules::settle_delivery(150_000, &route, requested, requested + Duration::minutes(78));
/// assert_eq!(late.profit, 140_000);
/// ```
pub fn settle_delivery(
    value: i64,
    route: &Route,
    requested: NaiveDateTime,
    actual: NaiveDateTime,
) -> DeliverySettlement {
    let late = is_late(actual, requested, route.base_time_minutes());
    let fuel_cost = fuel_cost(route);
    let late_penalty = late_penalty(late);
    let high_value_bonus = high_value_bonus(value, late);

    DeliverySettlement {
        on_time: !late,
        late_penalty,
        high_value_bonus,
        fuel_cost,
        profit: profit(value, high_value_bonus, late_penalty, fuel_cost),
    }
}

/// Fuel spend bucketed by route traffic tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuelCostBreakdown {
    pub low_traffic: i64,
    pub medium_traffic: i64,
    pub high_traffic: i64,
}

impl FuelCostBreakdown {
    pub fn add(&mut self, traffic: TrafficLevel, cost: i64) {
        match traffic {
            TrafficLevel::Low => self.low_traffic += cost,
            TrafficLevel::Medium => self.medium_traffic += cost,
            TrafficLevel::High => self.high_traffic += cost,
        }
    }

    pub fn total(&self) -> i64 {
        self.low_traffic + self.medium_traffic + self.high_traffic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn nine_am() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn lateness_cutoff_is_exclusive() {
        let requested = nine_am();
        assert!(!is_late(requested + Duration::minutes(70), requested, 60));
        assert!(is_late(requested + Duration::minutes(71), requested, 60));
    }

    #[test]
    fn bonus_requires_strictly_more_than_threshold() {
        assert_eq!(high_value_bonus(HIGH_VALUE_THRESHOLD, false), 0);
        assert_eq!(high_value_bonus(HIGH_VALUE_THRESHOLD + 1, false), 10_000);
        assert_eq!(high_value_bonus(200_000, true), 0);
    }

    #[test]
    fn bonus_on_extreme_value_does_not_overflow() {
        assert_eq!(high_value_bonus(i64::MAX, false), 922_337_203_685_477_581);
        assert_eq!(high_value_bonus(MAX_ORDER_VALUE, false), MAX_ORDER_VALUE / 10);
    }

    #[test]
    fn low_and_medium_traffic_cost_the_same() {
        assert_eq!(fuel_cost_for(3.5, TrafficLevel::Low), 1_750);
        assert_eq!(fuel_cost_for(3.5, TrafficLevel::Medium), 1_750);
        assert_eq!(fuel_cost_for(3.5, TrafficLevel::High), 2_450);
    }

    #[test]
    fn breakdown_buckets_by_tier() {
        let mut breakdown = FuelCostBreakdown::default();
        breakdown.add(TrafficLevel::Low, 100);
        breakdown.add(TrafficLevel::High, 300);
        breakdown.add(TrafficLevel::High, 50);
        assert_eq!(breakdown.high_traffic, 350);
        assert_eq!(breakdown.total(), 450);
    }
}
