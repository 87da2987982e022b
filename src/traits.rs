//! Seams between the planner stages.
//!
//! The planner only needs two capabilities from the outside world: a way to
//! measure distance between two coordinates and a way to price an arrival at
//! a venue. Both are traits so tests (and callers with better data) can swap
//! them out.

use crate::penalty::Penalty;
use crate::place::{GeoPoint, Place};
use crate::zones::VenueKinds;

/// Measures the distance between two coordinates in kilometers.
pub trait GeoMetric: Send + Sync {
    fn distance_km(&self, from: GeoPoint, to: GeoPoint) -> f64;
}

/// Prices an arrival at a venue.
///
/// Implementations must be pure: the optimizer calls this `O(n²)` times per
/// 2-opt pass and assumes identical inputs always produce identical output.
pub trait ArrivalPenalty: Send + Sync {
    /// `arrival_minutes` counts from midnight of the planning day.
    fn penalty(&self, place: &Place, kinds: VenueKinds, arrival_minutes: f64) -> Penalty;
}
