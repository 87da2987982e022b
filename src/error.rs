//! Planner error type.

use thiserror::Error;

/// Errors returned before any planning work starts.
///
/// Infeasible schedules are not errors: they come back as an
/// [`Itinerary`](crate::schedule::Itinerary) with `dropped` entries and
/// `within_daylight == false`.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A place failed validation (missing coordinates, bad hours, ...).
    #[error("invalid place `{place}`: {reason}")]
    InvalidInput { place: String, reason: &'static str },

    /// A route configuration value is out of range or non-finite.
    #[error("invalid route config: {0}")]
    InvalidConfig(&'static str),

    /// The request contained no places at all (not even a start).
    #[error("at least one place (the start) is required")]
    NoPlaces,

    /// Request exceeds the configured place bound.
    #[error("{count} places requested, at most {max} are supported")]
    TooManyPlaces { count: usize, max: usize },

    /// A venue rule or config document could not be parsed.
    #[error("failed to parse planner document: {0}")]
    Parse(#[from] serde_json::Error),
}
