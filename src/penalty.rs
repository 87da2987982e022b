//! Arrival-time penalty model.
//!
//! Every arrival is priced as one of four tiers. Soft penalties are plain
//! minutes-equivalent numbers; the hard tiers are tags, not big numbers, so
//! summing many of them can never overflow or lose precision. [`RouteCost`]
//! compares routes tier by tier, which gives the same ordering big sentinel
//! constants were meant to give: an avoidable hard violation always loses to
//! any amount of soft friction, and a stricter time-lock always loses to any
//! number of looser ones.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::place::Place;
use crate::traits::ArrivalPenalty;
use crate::zones::{TimeLock, VenueKind, VenueKinds, VenueRules};

pub const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Half-open range of decimal hours, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourRange {
    pub start: f64,
    pub end: f64,
}

impl HourRange {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, hour: f64) -> bool {
        self.start <= hour && hour < self.end
    }
}

/// Fixed daily windows and soft penalty amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayWindows {
    pub lunch: HourRange,
    pub dinner: HourRange,
    /// Food venues are effectively closed here.
    pub dead_zone: HourRange,
    /// Lunch-only venues reached at or after this hour are infeasible.
    pub lunch_only_cutoff: f64,
    /// Any arrival at or after this hour lands in the late tier.
    pub operational_cutoff: f64,
    /// Early-visit venues are penalized from this hour on.
    pub early_threshold: f64,
    pub midday_heat: HourRange,
    pub sunset: HourRange,

    pub dead_zone_penalty: f64,
    pub off_meal_penalty: f64,
    pub late_for_early_visit_penalty: f64,
    pub heat_penalty: f64,
    pub sunset_bonus: f64,
    /// Per minute of waiting for a venue to open.
    pub wait_penalty_per_minute: f64,
}

impl Default for DayWindows {
    fn default() -> Self {
        Self {
            lunch: HourRange::new(12.0, 14.5),
            dinner: HourRange::new(19.0, 22.0),
            dead_zone: HourRange::new(15.0, 18.5),
            lunch_only_cutoff: 14.0,
            operational_cutoff: 21.0,
            early_threshold: 10.0,
            midday_heat: HourRange::new(12.0, 16.0),
            sunset: HourRange::new(17.0, 19.5),
            dead_zone_penalty: 1000.0,
            off_meal_penalty: 150.0,
            late_for_early_visit_penalty: 60.0,
            heat_penalty: 45.0,
            sunset_bonus: 60.0,
            wait_penalty_per_minute: 1.0,
        }
    }
}

/// Why an arrival is impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardFail {
    /// At or after closing time (or on the following day).
    Closed,
    /// Lunch-only venue after its lunch service.
    LunchOnlyClosed,
}

/// Cost of a single arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    /// Minutes-equivalent friction; negative values are bonuses.
    Soft(f64),
    /// Past the operational cutoff: orderable but strongly disfavored.
    LateArrival,
    /// A named time-lock was violated.
    Locked { kind: VenueKind, severity: u8 },
    Infeasible(HardFail),
}

impl Penalty {
    pub const ZERO: Penalty = Penalty::Soft(0.0);

    fn tier(&self) -> u8 {
        match self {
            Penalty::Soft(_) => 0,
            Penalty::LateArrival => 1,
            Penalty::Locked { .. } => 2,
            Penalty::Infeasible(_) => 3,
        }
    }

    /// True for time-locks and infeasible arrivals.
    pub fn is_hard(&self) -> bool {
        self.tier() >= 2
    }

    /// Total order by severity: tier, then lock severity, then soft amount.
    pub fn severity_cmp(&self, other: &Penalty) -> Ordering {
        self.tier().cmp(&other.tier()).then_with(|| match (self, other) {
            (Penalty::Soft(a), Penalty::Soft(b)) => a.total_cmp(b),
            (Penalty::Locked { severity: a, .. }, Penalty::Locked { severity: b, .. }) => a.cmp(b),
            _ => Ordering::Equal,
        })
    }
}

/// Aggregate cost of a route.
///
/// Ordered lexicographically: infeasible arrivals, then violated lock
/// severities (most severe first), then late arrivals, then the weighted
/// soft sum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteCost {
    pub infeasible: u32,
    /// Violated lock severities, sorted descending.
    pub locks: Vec<u8>,
    pub late: u32,
    pub soft: f64,
}

impl RouteCost {
    /// Adds one arrival; only the soft tier is scaled by `weight`.
    pub fn add(&mut self, penalty: Penalty, weight: f64) {
        match penalty {
            Penalty::Soft(amount) => self.soft += amount * weight,
            Penalty::LateArrival => self.late += 1,
            Penalty::Locked { severity, .. } => {
                let at = self.locks.partition_point(|&s| s >= severity);
                self.locks.insert(at, severity);
            }
            Penalty::Infeasible(_) => self.infeasible += 1,
        }
    }

    /// No infeasible arrivals and no violated locks.
    pub fn is_feasible(&self) -> bool {
        self.infeasible == 0 && self.locks.is_empty()
    }
}

impl Ord for RouteCost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.infeasible
            .cmp(&other.infeasible)
            .then_with(|| self.locks.cmp(&other.locks))
            .then_with(|| self.late.cmp(&other.late))
            .then_with(|| self.soft.total_cmp(&other.soft))
    }
}

impl PartialOrd for RouteCost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RouteCost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RouteCost {}

/// Default [`ArrivalPenalty`] driven by a [`VenueRules`] table.
#[derive(Debug, Clone)]
pub struct PenaltyModel {
    locks: Vec<TimeLock>,
    windows: DayWindows,
}

impl Default for PenaltyModel {
    fn default() -> Self {
        Self::from_rules(&VenueRules::default())
    }
}

impl PenaltyModel {
    pub fn from_rules(rules: &VenueRules) -> Self {
        Self {
            locks: rules.locks.clone(),
            windows: rules.windows.clone(),
        }
    }

    pub fn windows(&self) -> &DayWindows {
        &self.windows
    }

    /// Most severe lock violated at `hour`, if any.
    fn violated_lock(&self, kinds: VenueKinds, hour: f64) -> Option<&TimeLock> {
        self.locks
            .iter()
            .filter(|lock| kinds.contains(lock.kind) && lock.window.violated_at(hour))
            .max_by_key(|lock| lock.severity)
    }

    fn soft(&self, place: &Place, kinds: VenueKinds, hour: f64) -> f64 {
        let w = &self.windows;
        let mut cost = 0.0;

        if let Some(hours) = place.opening_hours
            && hour < hours.open_hour
        {
            cost += (hours.open_hour - hour) * 60.0 * w.wait_penalty_per_minute;
        }

        if kinds.is_food() {
            if w.dead_zone.contains(hour) {
                cost += w.dead_zone_penalty;
            } else if !w.lunch.contains(hour) && !w.dinner.contains(hour) {
                cost += w.off_meal_penalty;
            }
        }

        if kinds.contains(VenueKind::SunsetVenue) && w.sunset.contains(hour) {
            cost -= w.sunset_bonus;
        }
        if kinds.contains(VenueKind::EarlyVisit) && hour >= w.early_threshold {
            cost += w.late_for_early_visit_penalty;
        }
        if kinds.contains(VenueKind::SunExposed) && w.midday_heat.contains(hour) {
            cost += w.heat_penalty;
        }

        cost
    }
}

impl ArrivalPenalty for PenaltyModel {
    fn penalty(&self, place: &Place, kinds: VenueKinds, arrival_minutes: f64) -> Penalty {
        let next_day = arrival_minutes >= MINUTES_PER_DAY;
        let hour = (arrival_minutes / 60.0).rem_euclid(24.0);

        if let Some(hours) = place.opening_hours
            && (next_day || hour >= hours.close_hour)
        {
            return Penalty::Infeasible(HardFail::Closed);
        }

        if let Some(lock) = self.violated_lock(kinds, hour) {
            return Penalty::Locked {
                kind: lock.kind,
                severity: lock.severity,
            };
        }

        if kinds.is_lunch_only() && (next_day || hour >= self.windows.lunch_only_cutoff) {
            return Penalty::Infeasible(HardFail::LunchOnlyClosed);
        }

        if next_day || hour >= self.windows.operational_cutoff {
            return Penalty::LateArrival;
        }

        Penalty::Soft(self.soft(place, kinds, hour))
    }
}
