//! Venue classification.
//!
//! Places arrive with free-text names, categories and notes. The planner turns
//! them into a small set of [`VenueKind`]s once per request using a rule table,
//! so the penalty model and the matrix builder never do string matching in
//! their hot loops.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::PlannerError;
use crate::penalty::DayWindows;
use crate::place::Place;

/// Stable venue tags the planner reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueKind {
    /// Remote activity reachable only by taxi (desert camps, quad biking, ballooning).
    TransportZone,
    /// Hotel, riad or other terminus.
    Hotel,
    /// Serves lunch and nothing else.
    LunchOnly,
    /// Any food venue; subject to meal-window friction.
    Restaurant,
    /// Best experienced around sunset.
    SunsetVenue,
    /// Landmark that only works late in the day.
    FlagshipLandmark,
    CookingClass,
    Hammam,
    /// Best visited before the crowds arrive.
    EarlyVisit,
    /// Little shade; uncomfortable at midday.
    SunExposed,
    /// Must happen in the fixed early block of the day; never reordered.
    MorningAnchor,
}

impl VenueKind {
    pub const ALL: [VenueKind; 11] = [
        VenueKind::TransportZone,
        VenueKind::Hotel,
        VenueKind::LunchOnly,
        VenueKind::Restaurant,
        VenueKind::SunsetVenue,
        VenueKind::FlagshipLandmark,
        VenueKind::CookingClass,
        VenueKind::Hammam,
        VenueKind::EarlyVisit,
        VenueKind::SunExposed,
        VenueKind::MorningAnchor,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// Compact set of [`VenueKind`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VenueKinds(u16);

impl VenueKinds {
    pub const EMPTY: VenueKinds = VenueKinds(0);

    pub fn contains(self, kind: VenueKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn insert(&mut self, kind: VenueKind) {
        self.0 |= kind.bit();
    }

    pub fn with(mut self, kind: VenueKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = VenueKind> {
        VenueKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }

    pub fn is_transport_zone(self) -> bool {
        self.contains(VenueKind::TransportZone)
    }

    pub fn is_hotel(self) -> bool {
        self.contains(VenueKind::Hotel)
    }

    pub fn is_lunch_only(self) -> bool {
        self.contains(VenueKind::LunchOnly)
    }

    /// Lunch-only venues are food venues too.
    pub fn is_food(self) -> bool {
        self.contains(VenueKind::Restaurant) || self.contains(VenueKind::LunchOnly)
    }
}

impl FromIterator<VenueKind> for VenueKinds {
    fn from_iter<I: IntoIterator<Item = VenueKind>>(iter: I) -> Self {
        let mut kinds = VenueKinds::EMPTY;
        for kind in iter {
            kinds.insert(kind);
        }
        kinds
    }
}

/// Case-insensitive substring patterns that mark a place as `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueRule {
    pub kind: VenueKind,
    pub patterns: Vec<String>,
}

impl VenueRule {
    pub fn new(kind: VenueKind, patterns: &[&str]) -> Self {
        Self {
            kind,
            patterns: patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    fn matches(&self, haystack: &str) -> bool {
        self.patterns.iter().any(|pattern| haystack.contains(pattern.as_str()))
    }
}

/// Side of the clock a time-lock forbids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "hour", rename_all = "snake_case")]
pub enum LockWindow {
    /// Arrivals before this hour violate the lock.
    NotBefore(f64),
    /// Arrivals at or after this hour violate the lock.
    NotAfter(f64),
}

impl LockWindow {
    pub fn violated_at(self, hour: f64) -> bool {
        match self {
            LockWindow::NotBefore(limit) => hour < limit,
            LockWindow::NotAfter(limit) => hour >= limit,
        }
    }
}

/// Absolute arrival window for a venue kind, independent of opening hours.
///
/// Higher `severity` locks always outrank lower ones when routes are compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeLock {
    pub kind: VenueKind,
    pub window: LockWindow,
    pub severity: u8,
}

/// Rule table driving classification and the penalty model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenueRules {
    pub rules: Vec<VenueRule>,
    pub locks: Vec<TimeLock>,
    pub windows: DayWindows,
}

impl Default for VenueRules {
    fn default() -> Self {
        use VenueKind::*;

        Self {
            rules: vec![
                VenueRule::new(TransportZone, &["desert", "agafay", "quad", "buggy", "balloon", "montgolfi"]),
                VenueRule::new(Hotel, &["hotel", "riad", "terminus"]),
                VenueRule::new(LunchOnly, &["lunch only", "lunch-only", "lunch_only"]),
                VenueRule::new(Restaurant, &["restaurant", "cafe", "café", "food", "dining"]),
                VenueRule::new(SunsetVenue, &["jemaa", "sunset", "rooftop"]),
                VenueRule::new(FlagshipLandmark, &["jemaa"]),
                VenueRule::new(CookingClass, &["cooking"]),
                VenueRule::new(Hammam, &["hammam"]),
                VenueRule::new(EarlyVisit, &["majorelle", "garden", "early visit"]),
                VenueRule::new(SunExposed, &["adventure", "ruins", "outdoor", "menara"]),
                VenueRule::new(MorningAnchor, &["desert", "agafay", "balloon", "montgolfi", "cooking"]),
            ],
            locks: vec![
                TimeLock {
                    kind: FlagshipLandmark,
                    window: LockWindow::NotBefore(16.0),
                    severity: 2,
                },
                TimeLock {
                    kind: CookingClass,
                    window: LockWindow::NotAfter(11.0),
                    severity: 3,
                },
                TimeLock {
                    kind: Hammam,
                    window: LockWindow::NotAfter(19.0),
                    severity: 1,
                },
            ],
            windows: DayWindows::default(),
        }
    }
}

impl VenueRules {
    /// Parses a rule document; absent sections take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let mut rules: Self = serde_json::from_str(json)?;
        for rule in &mut rules.rules {
            for pattern in &mut rule.patterns {
                *pattern = pattern.to_lowercase();
            }
        }
        rules.validate()?;
        Ok(rules)
    }

    /// Rejects empty patterns and lock hours outside the day.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self
            .rules
            .iter()
            .any(|rule| rule.patterns.iter().any(|pattern| pattern.is_empty()))
        {
            return Err(PlannerError::InvalidConfig("venue rule patterns must be non-empty"));
        }
        for lock in &self.locks {
            let hour = match lock.window {
                LockWindow::NotBefore(hour) | LockWindow::NotAfter(hour) => hour,
            };
            if !(0.0..=24.0).contains(&hour) {
                return Err(PlannerError::InvalidConfig("time-lock hours must be within [0, 24]"));
            }
        }
        Ok(())
    }

    /// Kinds of a single place: explicit kinds plus every matching rule.
    pub fn classify(&self, place: &Place) -> VenueKinds {
        let haystack = haystack(place);
        let mut kinds: VenueKinds = place.kinds.iter().copied().collect();
        for rule in &self.rules {
            if rule.matches(&haystack) {
                kinds.insert(rule.kind);
            }
        }
        kinds
    }

    pub fn classify_all(&self, places: &[Place]) -> Vec<VenueKinds> {
        places.iter().map(|place| self.classify(place)).collect()
    }

    /// Locks that apply to a place with the given kinds.
    pub fn locks_for(&self, kinds: VenueKinds) -> impl Iterator<Item = &TimeLock> {
        self.locks.iter().filter(move |lock| kinds.contains(lock.kind))
    }
}

fn haystack(place: &Place) -> String {
    let mut text = String::with_capacity(place.name.len() + place.category.len() + 32);
    text.push_str(&place.name);
    text.push('\n');
    text.push_str(&place.category);
    for tag in &place.tags {
        text.push('\n');
        text.push_str(tag);
    }
    if let Some(notes) = &place.notes {
        text.push('\n');
        text.push_str(notes);
    }
    text.to_lowercase()
}

/// Maximum number of food venues a caller may select.
pub const MAX_RESTAURANTS: usize = 2;

/// Selection rules the UI enforces before calling the planner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("only one lunch-only venue may be selected (`{first}` and `{second}`)")]
    MultipleLunchOnly { first: String, second: String },
    #[error("{count} restaurants selected, at most 2 allowed")]
    TooManyRestaurants { count: usize },
}

/// Checks the caller-side selection rules.
///
/// The planner assumes these hold and does not call this itself.
pub fn check_selection(places: &[Place], rules: &VenueRules) -> Result<(), SelectionError> {
    let mut lunch_only: Option<&Place> = None;
    let mut restaurants = 0;

    for place in places.iter().skip(1) {
        let kinds = rules.classify(place);
        if kinds.is_lunch_only() {
            if let Some(first) = lunch_only {
                return Err(SelectionError::MultipleLunchOnly {
                    first: first.id.clone(),
                    second: place.id.clone(),
                });
            }
            lunch_only = Some(place);
        }
        if kinds.contains(VenueKind::Restaurant) {
            restaurants += 1;
        }
    }

    if restaurants > MAX_RESTAURANTS {
        return Err(SelectionError::TooManyRestaurants { count: restaurants });
    }
    Ok(())
}
