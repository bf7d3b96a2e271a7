//! Route model
//!
//! Routes are flat records with a fixed distance and base travel time.
//! They are read-only for the duration of a dispatch run.

use serde::{Deserialize, Serialize};

/// Traffic classification of a route
///
/// Written lowercase; the capitalized `Low`/`Medium`/`High` spellings are
/// also read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLevel {
    #[serde(alias = "Low")]
    Low,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "High")]
    High,
}

impl Default for TrafficLevel {
    fn default() -> Self {
        TrafficLevel::Medium
    }
}

impl std::str::FromStr for TrafficLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(TrafficLevel::Low),
            "medium" => Ok(TrafficLevel::Medium),
            "high" => Ok(TrafficLevel::High),
            other => Err(format!("unknown traffic level '{}'", other)),
        }
    }
}

/// A delivery route
///
/// # Example
/// ```
/// use fleet_dispatch_core::{Route, TrafficLevel};
///
/// let route = Route::new("RT-1".to_string(), 12.5, TrafficLevel::High, 45);
/// assert_eq!(route.base_time_minutes(), 45);
/// assert!(route.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Unique route identifier (e.g., "RT-1")
    id: String,

    /// Route length in kilometres
    distance_km: f64,

    traffic_level: TrafficLevel,

    /// Travel time for a rested driver
    base_time_minutes: u32,

    is_active: bool,

    #[serde(default)]
    start_location: Option<String>,

    #[serde(default)]
    end_location: Option<String>,
}

impl Route {
    /// Create a new active route
    ///
    /// # Panics
    /// Panics if `distance_km` is negative or not finite
    pub fn new(id: String, distance_km: f64, traffic_level: TrafficLevel, base_time_minutes: u32) -> Self {
        assert!(
            distance_km.is_finite() && distance_km >= 0.0,
            "distance_km must be a non-negative number"
        );
        Self {
            id,
            distance_km,
            traffic_level,
            base_time_minutes,
            is_active: true,
            start_location: None,
            end_location: None,
        }
    }

    /// Set start and end locations (builder pattern)
    pub fn with_locations(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_location = Some(start.into());
        self.end_location = Some(end.into());
        self
    }

    /// Mark the route inactive (builder pattern)
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn traffic_level(&self) -> TrafficLevel {
        self.traffic_level
    }

    pub fn base_time_minutes(&self) -> u32 {
        self.base_time_minutes
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn start_location(&self) -> Option<&str> {
        self.start_location.as_deref()
    }

    pub fn end_location(&self) -> Option<&str> {
        self.end_location.as_deref()
    }
}
