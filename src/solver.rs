//! Itinerary optimizer.
//!
//! Routes are scored by arrival penalties only. Legs that are too long to walk
//! have already been turned into flat taxi legs by the matrix, so the one lever
//! left is *when* each place is reached, and that is what the penalty sum
//! measures.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RouteConfig;
use crate::construct::{Route, anchor_lock_reorder, greedy_seed};
use crate::error::PlannerError;
use crate::haversine::Haversine;
use crate::matrix::TravelMatrix;
use crate::penalty::{PenaltyModel, RouteCost};
use crate::place::Place;
use crate::schedule::{DayClock, Itinerary, ScheduleSimulator};
use crate::traits::{ArrivalPenalty, GeoMetric};
use crate::zones::{VenueKinds, VenueRules};

/// How local search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// Nothing to reorder behind the locked prefix.
    Skipped,
    /// A full pass made no improvement.
    Converged,
    /// Stopped at `max_passes`; the route is the best found so far.
    PassLimitReached,
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub route: Route,
    pub cost: RouteCost,
    pub passes: usize,
    pub moves: usize,
    /// Route cost after each accepted move, in acceptance order.
    pub improvements: Vec<RouteCost>,
    pub status: SearchStatus,
}

/// Scores candidate routes for one request.
pub struct RouteEvaluator<'a, P: ArrivalPenalty> {
    places: &'a [Place],
    kinds: &'a [VenueKinds],
    matrix: &'a TravelMatrix,
    penalty: &'a P,
    config: &'a RouteConfig,
}

impl<'a, P: ArrivalPenalty> RouteEvaluator<'a, P> {
    pub fn new(
        places: &'a [Place],
        kinds: &'a [VenueKinds],
        matrix: &'a TravelMatrix,
        penalty: &'a P,
        config: &'a RouteConfig,
    ) -> Self {
        Self {
            places,
            kinds,
            matrix,
            penalty,
            config,
        }
    }

    /// Penalty sum of visiting `order` from the configured start time.
    ///
    /// The start place is departed immediately; every other stop waits out any
    /// rest that is due, adds its travel time, is priced at arrival, then adds
    /// its visit duration. Rests follow the same rule as the schedule.
    pub fn total_cost(&self, order: &[usize]) -> RouteCost {
        let mut cost = RouteCost::default();
        let Some((&first, rest)) = order.split_first() else {
            return cost;
        };

        let mut clock = DayClock::start(self.config);
        let mut prev = first;
        for &idx in rest {
            clock = clock.arrive(self.config, self.matrix, prev, idx);
            let kinds = self.kinds[idx];
            let penalty = self.penalty.penalty(&self.places[idx], kinds, clock.minutes);
            cost.add(penalty, self.config.time_penalty_weight);
            clock = clock.leave(idx, kinds, self.places[idx].visit_minutes());
            prev = idx;
        }
        cost
    }
}

/// One full 2-opt pass over the unlocked suffix.
///
/// Every candidate reverses the closed range `[i, j]`. A candidate replaces the
/// current route only when strictly cheaper, and scanning continues from the
/// accepted route. The cost after each accepted move is appended to `trace`.
/// Returns the number of accepted moves.
fn two_opt_pass<P: ArrivalPenalty>(
    eval: &RouteEvaluator<'_, P>,
    route: &mut Route,
    cost: &mut RouteCost,
    trace: &mut Vec<RouteCost>,
) -> usize {
    let n = route.len();
    let mut moves = 0;
    let mut candidate = route.order.clone();

    for i in route.opt_start_index..n - 1 {
        for j in i + 1..n {
            candidate.copy_from_slice(&route.order);
            candidate[i..=j].reverse();

            let candidate_cost = eval.total_cost(&candidate);
            if candidate_cost < *cost {
                debug!(i, j, ?candidate_cost, "2-opt move accepted");
                route.order.copy_from_slice(&candidate);
                trace.push(candidate_cost.clone());
                *cost = candidate_cost;
                moves += 1;
            }
        }
    }

    moves
}

/// Runs 2-opt passes until one makes no improvement or `max_passes` is hit.
pub fn local_search<P: ArrivalPenalty>(
    eval: &RouteEvaluator<'_, P>,
    route: Route,
    max_passes: usize,
) -> SearchOutcome {
    let mut route = route;
    let mut cost = eval.total_cost(&route.order);

    if route.len() < 2 || route.opt_start_index >= route.len() - 1 {
        return SearchOutcome {
            route,
            cost,
            passes: 0,
            moves: 0,
            improvements: Vec::new(),
            status: SearchStatus::Skipped,
        };
    }

    let mut passes = 0;
    let mut moves = 0;
    let mut improvements = Vec::new();
    let mut status = SearchStatus::PassLimitReached;

    for _ in 0..max_passes {
        passes += 1;
        let accepted = two_opt_pass(eval, &mut route, &mut cost, &mut improvements);
        moves += accepted;
        if accepted == 0 {
            status = SearchStatus::Converged;
            break;
        }
    }

    if status == SearchStatus::PassLimitReached {
        warn!(passes, moves, "2-opt stopped at pass limit");
    }

    SearchOutcome {
        route,
        cost,
        passes,
        moves,
        improvements,
        status,
    }
}

/// Plans itineraries for a fixed configuration and rule table.
///
/// Holds no per-request state, so one planner can serve many requests in
/// parallel.
#[derive(Debug, Clone)]
pub struct Planner<M = Haversine, P = PenaltyModel> {
    config: RouteConfig,
    rules: VenueRules,
    metric: M,
    penalty: P,
}

impl Planner {
    pub fn new(config: RouteConfig) -> Self {
        Self::with_rules(config, VenueRules::default())
    }

    pub fn with_rules(config: RouteConfig, rules: VenueRules) -> Self {
        let penalty = PenaltyModel::from_rules(&rules);
        Self {
            config,
            rules,
            metric: Haversine,
            penalty,
        }
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(RouteConfig::default())
    }
}

impl<M: GeoMetric, P: ArrivalPenalty> Planner<M, P> {
    /// Planner with a custom distance metric and penalty model.
    pub fn with_parts(config: RouteConfig, rules: VenueRules, metric: M, penalty: P) -> Self {
        Self {
            config,
            rules,
            metric,
            penalty,
        }
    }

    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    pub fn rules(&self) -> &VenueRules {
        &self.rules
    }

    /// Plans one day over `places`; `places[0]` is the start.
    ///
    /// Infeasible days are not errors: they come back with `dropped` entries
    /// and `within_daylight == false`.
    pub fn optimize(&self, places: &[Place]) -> Result<Itinerary, PlannerError> {
        let config = &self.config;
        config.validate()?;
        self.rules.validate()?;
        if places.is_empty() {
            return Err(PlannerError::NoPlaces);
        }
        if places.len() > config.max_places {
            return Err(PlannerError::TooManyPlaces {
                count: places.len(),
                max: config.max_places,
            });
        }

        let kinds = self.rules.classify_all(places);
        // Rejects places with missing or out-of-range data
        let matrix = TravelMatrix::build(places, &kinds, config, &self.metric)?;
        let eval = RouteEvaluator::new(places, &kinds, &matrix, &self.penalty, config);

        let mut route = anchor_lock_reorder(&kinds);
        if config.greedy_seed {
            let seeded = greedy_seed(&route, places, &kinds, &matrix, &self.penalty, config);
            if eval.total_cost(&seeded.order) <= eval.total_cost(&route.order) {
                route = seeded;
            }
        }

        let outcome = local_search(&eval, route, config.max_passes);
        info!(
            places = places.len(),
            locked = outcome.route.opt_start_index,
            passes = outcome.passes,
            moves = outcome.moves,
            status = ?outcome.status,
            feasible = outcome.cost.is_feasible(),
            "route optimized"
        );

        let sim = ScheduleSimulator::new(places, &kinds, &matrix, config);
        Ok(sim.run(&outcome.route, outcome.status, &self.penalty))
    }

    /// Plans independent requests in parallel, preserving input order.
    pub fn optimize_many(&self, requests: &[Vec<Place>]) -> Vec<Result<Itinerary, PlannerError>> {
        requests.par_iter().map(|places| self.optimize(places)).collect()
    }
}

/// Plans one day with the default rule table and haversine distances.
pub fn optimize(places: &[Place], config: &RouteConfig) -> Result<Itinerary, PlannerError> {
    Planner::new(config.clone()).optimize(places)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BreakPolicy;
    use crate::penalty::Penalty;

    /// Penalizes arriving at place `k` anywhere except as the `k`-th stop.
    struct WantsIdentity;

    impl ArrivalPenalty for WantsIdentity {
        fn penalty(&self, place: &Place, _kinds: VenueKinds, arrival: f64) -> Penalty {
            let want: f64 = place.id.parse().unwrap_or(0.0);
            // Stops are an hour apart on a zero-distance metric
            let slot = (arrival - 540.0) / 60.0 + 1.0;
            Penalty::Soft((slot - want).abs())
        }
    }

    struct ZeroMetric;

    impl GeoMetric for ZeroMetric {
        fn distance_km(&self, _from: crate::place::GeoPoint, _to: crate::place::GeoPoint) -> f64 {
            0.0
        }
    }

    fn numbered(n: usize) -> Vec<Place> {
        (0..n)
            .map(|i| Place::new(i.to_string(), format!("P{i}"), "sight").at(31.62, -7.99))
            .collect()
    }

    fn evaluator_parts(places: &[Place]) -> (Vec<VenueKinds>, TravelMatrix, RouteConfig) {
        let config = RouteConfig::default();
        let kinds = vec![VenueKinds::EMPTY; places.len()];
        let matrix = TravelMatrix::build(places, &kinds, &config, &ZeroMetric).expect("matrix");
        (kinds, matrix, config)
    }

    #[test]
    fn total_cost_walks_the_clock() {
        let places = numbered(4);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        assert_eq!(eval.total_cost(&[0, 1, 2, 3]).soft, 0.0);
        // 3 in slot 1, 1 in slot 3: |1-3| + |3-1|
        assert_eq!(eval.total_cost(&[0, 3, 2, 1]).soft, 4.0);
    }

    #[test]
    fn two_opt_recovers_sorted_order() {
        let places = numbered(4);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        let route = Route {
            order: vec![0, 3, 2, 1],
            opt_start_index: 1,
        };
        let outcome = local_search(&eval, route, 50);
        assert_eq!(outcome.route.order, vec![0, 1, 2, 3]);
        assert_eq!(outcome.status, SearchStatus::Converged);
        assert_eq!(outcome.cost.soft, 0.0);
        assert_eq!(outcome.moves, 1);
        assert_eq!(outcome.passes, 2);
    }

    #[test]
    fn total_cost_waits_out_due_rests() {
        let places = numbered(5);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let config = RouteConfig {
            breaks: Some(BreakPolicy::default()),
            ..config
        };
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        // Three hour-long visits, then 20 minutes of rest before the fourth
        let cost = eval.total_cost(&[0, 1, 2, 3, 4]);
        assert!((cost.soft - 20.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn every_accepted_move_lowers_the_cost() {
        let places = numbered(7);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        let order = vec![0, 4, 6, 1, 5, 3, 2];
        let initial = eval.total_cost(&order);
        let route = Route {
            order,
            opt_start_index: 1,
        };

        let outcome = local_search(&eval, route, 50);

        assert_eq!(outcome.improvements.len(), outcome.moves);
        assert!(outcome.moves > 0);
        assert!(outcome.improvements[0] < initial);
        for pair in outcome.improvements.windows(2) {
            assert!(pair[1] < pair[0], "{:?} after {:?}", pair[1], pair[0]);
        }
        assert_eq!(outcome.improvements.last(), Some(&outcome.cost));
    }

    #[test]
    fn two_opt_never_touches_locked_prefix() {
        let places = numbered(6);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        let route = Route {
            order: vec![0, 4, 5, 3, 2, 1],
            opt_start_index: 2,
        };
        let outcome = local_search(&eval, route, 50);
        assert_eq!(&outcome.route.order[..2], &[0, 4]);
    }

    #[test]
    fn nothing_to_optimize_is_skipped() {
        let places = numbered(3);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        let route = Route {
            order: vec![0, 2, 1],
            opt_start_index: 2,
        };
        let outcome = local_search(&eval, route, 50);
        assert_eq!(outcome.status, SearchStatus::Skipped);
        assert_eq!(outcome.route.order, vec![0, 2, 1]);
        assert_eq!(outcome.passes, 0);
    }

    #[test]
    fn pass_limit_is_reported() {
        let places = numbered(4);
        let (kinds, matrix, config) = evaluator_parts(&places);
        let eval = RouteEvaluator::new(&places, &kinds, &matrix, &WantsIdentity, &config);
        let route = Route {
            order: vec![0, 3, 2, 1],
            opt_start_index: 1,
        };
        let outcome = local_search(&eval, route, 1);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.status, SearchStatus::PassLimitReached);
    }

    #[test]
    fn rejects_empty_request() {
        let result = optimize(&[], &RouteConfig::default());
        assert!(matches!(result, Err(PlannerError::NoPlaces)));
    }

    #[test]
    fn rejects_oversized_request() {
        let config = RouteConfig {
            max_places: 3,
            ..RouteConfig::default()
        };
        let result = optimize(&numbered(4), &config);
        assert!(matches!(result, Err(PlannerError::TooManyPlaces { count: 4, max: 3 })));
    }

    #[test]
    fn rejects_missing_coordinates_before_planning() {
        let mut places = numbered(3);
        places[2].location = None;
        let result = optimize(&places, &RouteConfig::default());
        assert!(matches!(result, Err(PlannerError::InvalidInput { .. })));
    }

    #[test]
    fn custom_parts_are_used() {
        let planner = Planner::with_parts(RouteConfig::default(), VenueRules::default(), ZeroMetric, WantsIdentity);
        let mut places = numbered(5);
        places.swap(1, 4);
        let itinerary = planner.optimize(&places).expect("plan");
        let ids: Vec<_> = itinerary.stops.iter().map(|s| s.place_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }
}
