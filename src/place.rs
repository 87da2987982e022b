//! Points of interest handed to the planner.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;
use crate::zones::VenueKind;

/// Visit length used when a place does not specify one.
pub const DEFAULT_VISIT_MINUTES: f64 = 60.0;

/// A coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Daily opening window in 24h decimal hours (e.g. `9.5` is 09:30).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpeningHours {
    pub open_hour: f64,
    pub close_hour: f64,
}

/// A point of interest.
///
/// The place at index 0 of a request is where the day starts (usually the
/// visitor's hotel). It is never reordered or dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    /// Free-form category tag such as `"restaurant"` or `"adventure"`.
    pub category: String,
    /// Missing coordinates are rejected, never defaulted.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub visit_duration_minutes: Option<f64>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    /// Free-text markers matched by the venue rule table.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-text hints such as "lunch only".
    #[serde(default)]
    pub notes: Option<String>,
    /// Structured venue kinds, merged with whatever the rule table matches.
    #[serde(default)]
    pub kinds: Vec<VenueKind>,
}

impl Place {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            location: None,
            visit_duration_minutes: None,
            opening_hours: None,
            tags: Vec::new(),
            notes: None,
            kinds: Vec::new(),
        }
    }

    pub fn at(mut self, lat: f64, lng: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lng));
        self
    }

    pub fn duration(mut self, minutes: f64) -> Self {
        self.visit_duration_minutes = Some(minutes);
        self
    }

    pub fn hours(mut self, open_hour: f64, close_hour: f64) -> Self {
        self.opening_hours = Some(OpeningHours { open_hour, close_hour });
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes = Some(note.into());
        self
    }

    pub fn kind(mut self, kind: VenueKind) -> Self {
        self.kinds.push(kind);
        self
    }

    /// Visit length in minutes, falling back to [`DEFAULT_VISIT_MINUTES`].
    pub fn visit_minutes(&self) -> f64 {
        self.visit_duration_minutes.unwrap_or(DEFAULT_VISIT_MINUTES)
    }

    /// Location of the place; missing coordinates are an error.
    pub fn point(&self) -> Result<GeoPoint, PlannerError> {
        self.location.ok_or_else(|| PlannerError::InvalidInput {
            place: self.id.clone(),
            reason: "missing coordinates",
        })
    }

    /// Rejects places the planner cannot reason about.
    pub fn validate(&self) -> Result<(), PlannerError> {
        let fail = |reason| PlannerError::InvalidInput {
            place: self.id.clone(),
            reason,
        };

        if !self.point()?.is_valid() {
            return Err(fail("coordinates out of range"));
        }

        if let Some(minutes) = self.visit_duration_minutes
            && (!minutes.is_finite() || minutes < 0.0)
        {
            return Err(fail("visit duration must be finite and non-negative"));
        }

        if let Some(hours) = self.opening_hours {
            if !hours.open_hour.is_finite() || !hours.close_hour.is_finite() {
                return Err(fail("opening hours must be finite"));
            }
            if hours.open_hour >= hours.close_hour {
                return Err(fail("opening hour must precede closing hour"));
            }
        }

        Ok(())
    }
}

/// Validates every place in request order, stopping at the first failure.
pub fn validate_places(places: &[Place]) -> Result<(), PlannerError> {
    places.iter().try_for_each(Place::validate)
}
