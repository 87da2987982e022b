//! Walk-forward schedule simulation.
//!
//! Turns an optimized route into a time-stamped itinerary. The simulation is
//! an explicit [`SimState`] value advanced one stop at a time, so each step
//! can be tested in isolation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::RouteConfig;
use crate::construct::Route;
use crate::matrix::TravelMatrix;
use crate::penalty::{HourRange, RouteCost};
use crate::place::Place;
use crate::solver::SearchStatus;
use crate::traits::ArrivalPenalty;
use crate::zones::VenueKinds;

/// Reason attached to stops dropped after the mission cutoff.
pub const TIME_LIMIT_REASON: &str = "time limit exceeded";

/// Food venues reached in this range are labelled as lunch.
const LUNCH_CONTEXT: HourRange = HourRange::new(11.0, 16.0);
/// Food venues reached from this hour on are labelled as dinner.
const DINNER_CONTEXT_FROM: f64 = 18.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Start,
    Walk,
    Taxi,
}

/// Display context for a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopContext {
    Start,
    Lunch,
    Dinner,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub place_index: usize,
    pub place_id: String,
    pub name: String,
    /// Minutes since midnight.
    pub arrival_minutes: f64,
    pub visit_minutes: f64,
    pub mode: TransportMode,
    pub leg_km: f64,
    pub leg_minutes: f64,
    pub context: StopContext,
}

impl Stop {
    pub fn departure_minutes(&self) -> f64 {
        self.arrival_minutes + self.visit_minutes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dropped {
    pub place_index: usize,
    pub place_id: String,
    pub name: String,
    pub reason: String,
}

/// Rest inserted before the leg leaving `after_place_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestBreak {
    pub after_place_id: String,
    pub start_minutes: f64,
    pub minutes: f64,
}

/// Final planner output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub stops: Vec<Stop>,
    pub dropped: Vec<Dropped>,
    pub breaks: Vec<RestBreak>,
    pub total_distance_km: f64,
    pub total_duration_minutes: f64,
    /// Departure time from the last visited stop.
    pub end_minutes: f64,
    /// At least one place visited and the day ends before the cutoff.
    pub within_daylight: bool,
    pub status: SearchStatus,
    pub cost: RouteCost,
}

/// Display context of place `idx` reached at `arrival_minutes`.
///
/// Index 0 is always the start. Food venues are a lunch or dinner depending on
/// the hour; everything else is a plain destination.
pub fn stop_context(idx: usize, kinds: VenueKinds, arrival_minutes: f64) -> StopContext {
    if idx == 0 {
        return StopContext::Start;
    }
    let hour = (arrival_minutes / 60.0).rem_euclid(24.0);
    if kinds.is_food() {
        if LUNCH_CONTEXT.contains(hour) {
            return StopContext::Lunch;
        }
        if hour >= DINNER_CONTEXT_FROM {
            return StopContext::Dinner;
        }
    }
    StopContext::Destination
}

/// Break minutes owed before the next leg, if any.
fn rest_due(config: &RouteConfig, active_minutes: f64) -> Option<f64> {
    config
        .breaks
        .filter(|policy| active_minutes >= policy.after_active_minutes)
        .map(|policy| policy.break_minutes)
}

/// Active minutes after visiting a stop; meals count as a rest.
fn active_after_visit(context: StopContext, active_minutes: f64, visit_minutes: f64) -> f64 {
    match context {
        StopContext::Lunch | StopContext::Dinner => 0.0,
        _ => active_minutes + visit_minutes,
    }
}

/// Clock used when scoring orders, advanced with the same rest and meal rules
/// as [`SimState::step`] but without recording anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DayClock {
    pub minutes: f64,
    pub active: f64,
}

impl DayClock {
    pub fn start(config: &RouteConfig) -> Self {
        Self {
            minutes: config.start_minutes(),
            active: 0.0,
        }
    }

    /// Clock on arrival at `to`, after any due rest and the leg from `from`.
    pub fn arrive(self, config: &RouteConfig, matrix: &TravelMatrix, from: usize, to: usize) -> Self {
        let mut next = self;
        if let Some(minutes) = rest_due(config, next.active) {
            next.minutes += minutes;
            next.active = 0.0;
        }
        let leg = matrix.minutes(from, to);
        next.minutes += leg;
        next.active += leg;
        next
    }

    /// Clock on leaving place `idx` after a visit of `visit_minutes`.
    pub fn leave(self, idx: usize, kinds: VenueKinds, visit_minutes: f64) -> Self {
        let context = stop_context(idx, kinds, self.minutes);
        Self {
            minutes: self.minutes + visit_minutes,
            active: active_after_visit(context, self.active, visit_minutes),
        }
    }
}

/// Simulation state between two stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub clock_minutes: f64,
    pub aborted: bool,
    /// Travel and visit minutes since the last rest or meal.
    pub active_minutes: f64,
    /// Place index the visitor is currently at.
    pub prev: usize,
}

/// What happened to one stop.
#[derive(Debug, Clone, PartialEq)]
pub enum StepEvent {
    Visited(Stop),
    Dropped(Dropped),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub rest: Option<RestBreak>,
    pub event: StepEvent,
}

/// Inputs shared by every simulation step.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleSimulator<'a> {
    places: &'a [Place],
    kinds: &'a [VenueKinds],
    matrix: &'a TravelMatrix,
    config: &'a RouteConfig,
}

impl SimState {
    /// Advances the simulation through the stop at place index `idx`.
    pub fn step(self, sim: &ScheduleSimulator<'_>, idx: usize) -> (SimState, StepOutcome) {
        let mut state = self;
        let cutoff = sim.config.cutoff_minutes();

        if state.clock_minutes > cutoff {
            state.aborted = true;
        }
        if state.aborted {
            return (state, sim.dropped(idx));
        }

        let mut rest = None;
        if let Some(minutes) = rest_due(sim.config, state.active_minutes) {
            rest = Some(RestBreak {
                after_place_id: sim.places[state.prev].id.clone(),
                start_minutes: state.clock_minutes,
                minutes,
            });
            state.clock_minutes += minutes;
            state.active_minutes = 0.0;
        }

        let (mode, leg_km, leg_minutes) = sim.leg(state.prev, idx);
        state.clock_minutes += leg_minutes;
        state.active_minutes += leg_minutes;

        // A rest before a dropped stop is not recorded
        if state.clock_minutes > cutoff {
            return (state, sim.dropped(idx));
        }

        let place = &sim.places[idx];
        let context = sim.context(idx, state.clock_minutes);
        let stop = Stop {
            place_index: idx,
            place_id: place.id.clone(),
            name: place.name.clone(),
            arrival_minutes: state.clock_minutes,
            visit_minutes: place.visit_minutes(),
            mode,
            leg_km,
            leg_minutes,
            context,
        };

        state.clock_minutes += stop.visit_minutes;
        state.active_minutes = active_after_visit(context, state.active_minutes, stop.visit_minutes);
        state.prev = idx;

        (
            state,
            StepOutcome {
                rest,
                event: StepEvent::Visited(stop),
            },
        )
    }
}

impl<'a> ScheduleSimulator<'a> {
    /// `places`, `kinds` and the matrix must all be indexed the same way.
    pub fn new(
        places: &'a [Place],
        kinds: &'a [VenueKinds],
        matrix: &'a TravelMatrix,
        config: &'a RouteConfig,
    ) -> Self {
        Self {
            places,
            kinds,
            matrix,
            config,
        }
    }

    /// State and stop record for departing from the start place.
    pub fn start(&self, start: usize) -> (SimState, Stop) {
        let place = &self.places[start];
        let clock = self.config.start_minutes();
        let stop = Stop {
            place_index: start,
            place_id: place.id.clone(),
            name: place.name.clone(),
            arrival_minutes: clock,
            visit_minutes: 0.0,
            mode: TransportMode::Start,
            leg_km: 0.0,
            leg_minutes: 0.0,
            context: StopContext::Start,
        };
        let state = SimState {
            clock_minutes: clock,
            aborted: false,
            active_minutes: 0.0,
            prev: start,
        };
        (state, stop)
    }

    /// Simulates the whole route.
    ///
    /// The itinerary cost is priced from the scheduled arrivals of the stops
    /// actually visited, breaks included. Dropped stops carry no penalty.
    pub fn run<P: ArrivalPenalty>(&self, route: &Route, status: SearchStatus, penalty: &P) -> Itinerary {
        let start_minutes = self.config.start_minutes();
        let mut stops = Vec::with_capacity(route.len());
        let mut dropped = Vec::new();
        let mut breaks = Vec::new();

        let Some((&first, rest)) = route.order.split_first() else {
            return Itinerary {
                stops,
                dropped,
                breaks,
                total_distance_km: 0.0,
                total_duration_minutes: 0.0,
                end_minutes: start_minutes,
                within_daylight: false,
                status,
                cost: RouteCost::default(),
            };
        };

        let (mut state, start_stop) = self.start(first);
        stops.push(start_stop);

        for &idx in rest {
            let (next, outcome) = state.step(self, idx);
            state = next;
            breaks.extend(outcome.rest);
            match outcome.event {
                StepEvent::Visited(stop) => stops.push(stop),
                StepEvent::Dropped(entry) => dropped.push(entry),
            }
        }

        let end_minutes = stops
            .last()
            .map(Stop::departure_minutes)
            .unwrap_or(start_minutes);
        let total_distance_km = stops.iter().map(|stop| stop.leg_km).sum();
        let cost = self.price(&stops[1..], penalty);
        let within_daylight = stops.len() > 1 && end_minutes <= self.config.cutoff_minutes();

        if !dropped.is_empty() {
            warn!(
                dropped = dropped.len(),
                visited = stops.len() - 1,
                "stops dropped after mission cutoff"
            );
        }

        Itinerary {
            stops,
            dropped,
            breaks,
            total_distance_km,
            total_duration_minutes: end_minutes - start_minutes,
            end_minutes,
            within_daylight,
            status,
            cost,
        }
    }

    /// Mode, reported km and minutes of the leg `from -> to`.
    fn leg(&self, from: usize, to: usize) -> (TransportMode, f64, f64) {
        let taxi = self.kinds[from].is_transport_zone()
            || self.kinds[to].is_transport_zone()
            || self.matrix.is_taxi(from, to);
        if taxi {
            (
                TransportMode::Taxi,
                self.matrix.straight_km(from, to),
                self.config.taxi_fixed_minutes,
            )
        } else {
            (
                TransportMode::Walk,
                self.matrix.distance_km(from, to),
                self.matrix.minutes(from, to),
            )
        }
    }

    fn context(&self, idx: usize, arrival_minutes: f64) -> StopContext {
        stop_context(idx, self.kinds[idx], arrival_minutes)
    }

    fn price<P: ArrivalPenalty>(&self, visited: &[Stop], penalty: &P) -> RouteCost {
        let mut cost = RouteCost::default();
        for stop in visited {
            let idx = stop.place_index;
            let p = penalty.penalty(&self.places[idx], self.kinds[idx], stop.arrival_minutes);
            cost.add(p, self.config.time_penalty_weight);
        }
        cost
    }

    fn dropped(&self, idx: usize) -> StepOutcome {
        let place = &self.places[idx];
        StepOutcome {
            rest: None,
            event: StepEvent::Dropped(Dropped {
                place_index: idx,
                place_id: place.id.clone(),
                name: place.name.clone(),
                reason: TIME_LIMIT_REASON.to_string(),
            }),
        }
    }
}
