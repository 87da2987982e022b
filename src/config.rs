//! Planner parameters.

use serde::{Deserialize, Serialize};

use crate::error::PlannerError;

/// Rest stop inserted into long stretches of walking and sightseeing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakPolicy {
    /// Active minutes (travel + visits) since the last rest that trigger a break.
    pub after_active_minutes: f64,
    /// Length of each break.
    pub break_minutes: f64,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            after_active_minutes: 180.0,
            break_minutes: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Departure from the start place, decimal hours.
    pub start_time_hours: f64,
    /// Longest leg that is still walked; anything further becomes a taxi.
    pub max_walk_distance_km: f64,
    /// Flat duration of any taxi leg.
    pub taxi_fixed_minutes: f64,
    pub walking_speed_kmh: f64,
    /// Multiplier applied to soft arrival penalties.
    pub time_penalty_weight: f64,
    /// Stops that cannot be reached before this hour are dropped.
    pub mission_cutoff_hours: f64,
    /// Let hotels skip the walking-distance veto.
    pub hotel_walk_exempt: bool,
    /// Upper bound on places per request, start included.
    pub max_places: usize,
    /// Upper bound on 2-opt passes.
    pub max_passes: usize,
    /// Reorder the unlocked suffix greedily before 2-opt.
    pub greedy_seed: bool,
    pub breaks: Option<BreakPolicy>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            start_time_hours: 9.0,
            max_walk_distance_km: 2.0,
            taxi_fixed_minutes: 20.0,
            walking_speed_kmh: 4.5,
            time_penalty_weight: 1.0,
            mission_cutoff_hours: 20.5,
            hotel_walk_exempt: false,
            max_places: 25,
            max_passes: 50,
            greedy_seed: false,
            breaks: None,
        }
    }
}

impl RouteConfig {
    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, PlannerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn start_minutes(&self) -> f64 {
        self.start_time_hours * 60.0
    }

    pub fn cutoff_minutes(&self) -> f64 {
        self.mission_cutoff_hours * 60.0
    }

    /// Walking time for `km` at the configured speed.
    pub fn walk_minutes(&self, km: f64) -> f64 {
        km / self.walking_speed_kmh * 60.0
    }

    pub fn validate(&self) -> Result<(), PlannerError> {
        let finite = [
            self.start_time_hours,
            self.max_walk_distance_km,
            self.taxi_fixed_minutes,
            self.walking_speed_kmh,
            self.time_penalty_weight,
            self.mission_cutoff_hours,
        ];
        if finite.iter().any(|value| !value.is_finite()) {
            return Err(PlannerError::InvalidConfig("values must be finite"));
        }
        if !(0.0..24.0).contains(&self.start_time_hours) {
            return Err(PlannerError::InvalidConfig("start_time_hours must be within [0, 24)"));
        }
        if self.walking_speed_kmh <= 0.0 {
            return Err(PlannerError::InvalidConfig("walking_speed_kmh must be positive"));
        }
        if self.max_walk_distance_km < 0.0 || self.taxi_fixed_minutes < 0.0 {
            return Err(PlannerError::InvalidConfig("distances and durations must be non-negative"));
        }
        if self.time_penalty_weight < 0.0 {
            return Err(PlannerError::InvalidConfig("time_penalty_weight must be non-negative"));
        }
        if self.mission_cutoff_hours <= self.start_time_hours {
            return Err(PlannerError::InvalidConfig("mission cutoff must be after the start time"));
        }
        if self.max_places == 0 || self.max_passes == 0 {
            return Err(PlannerError::InvalidConfig("max_places and max_passes must be positive"));
        }
        if let Some(policy) = self.breaks
            && (!policy.after_active_minutes.is_finite()
                || !policy.break_minutes.is_finite()
                || policy.after_active_minutes <= 0.0
                || policy.break_minutes < 0.0)
        {
            return Err(PlannerError::InvalidConfig("break policy values must be finite and positive"));
        }
        Ok(())
    }
}
