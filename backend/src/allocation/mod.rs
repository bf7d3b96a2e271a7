//! Allocation engine - greedy order-to-driver matching
//!
//! See `engine.rs` for the algorithm.

pub mod engine;

// Re-export main types for convenience
pub use engine::{allocate, AllocationOutcome, KpiAccumulator, PendingDelivery, PlannedDelivery};
