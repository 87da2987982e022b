//! daytrip-planner core
//!
//! Plans a single-day, multi-stop visitor itinerary: builds walk/taxi travel
//! matrices, prices arrivals against venue time windows, locks morning anchors
//! in place, refines the rest with 2-opt, and simulates the final schedule.

pub mod config;
pub mod construct;
pub mod error;
pub mod haversine;
pub mod matrix;
pub mod penalty;
pub mod place;
pub mod schedule;
pub mod solver;
pub mod traits;
pub mod zones;

pub use config::{BreakPolicy, RouteConfig};
pub use error::PlannerError;
pub use place::{GeoPoint, OpeningHours, Place};
pub use schedule::Itinerary;
pub use solver::{Planner, SearchStatus, optimize};
pub use zones::{VenueKind, VenueRules};
