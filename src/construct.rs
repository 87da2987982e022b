//! Initial route construction.

use std::cmp::Ordering;

use crate::config::RouteConfig;
use crate::matrix::TravelMatrix;
use crate::penalty::Penalty;
use crate::place::Place;
use crate::schedule::DayClock;
use crate::traits::ArrivalPenalty;
use crate::zones::{VenueKind, VenueKinds};

/// Visiting order over place indices.
///
/// `order[0]` is always the start place. The first `opt_start_index` entries
/// (start plus morning anchors) are locked and never touched by local search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub order: Vec<usize>,
    pub opt_start_index: usize,
}

impl Route {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The locked prefix.
    pub fn locked(&self) -> &[usize] {
        &self.order[..self.opt_start_index]
    }
}

/// Moves morning-anchor places directly behind the start.
///
/// Returns `[0] + anchors + remainder`; both groups keep their input order.
/// `kinds` is parallel to the request's places.
pub fn anchor_lock_reorder(kinds: &[VenueKinds]) -> Route {
    if kinds.is_empty() {
        return Route {
            order: Vec::new(),
            opt_start_index: 0,
        };
    }

    let (anchors, remainder): (Vec<usize>, Vec<usize>) =
        (1..kinds.len()).partition(|&i| kinds[i].contains(VenueKind::MorningAnchor));

    let opt_start_index = 1 + anchors.len();
    let mut order = Vec::with_capacity(kinds.len());
    order.push(0);
    order.extend(anchors);
    order.extend(remainder);

    Route {
        order,
        opt_start_index,
    }
}

/// Reorders the unlocked suffix nearest-first.
///
/// From the end of the locked prefix, repeatedly appends the remaining place
/// whose arrival is cheapest, comparing penalty severity first, then travel
/// minutes, then input index. Deterministic for identical input.
pub fn greedy_seed<P: ArrivalPenalty>(
    route: &Route,
    places: &[Place],
    kinds: &[VenueKinds],
    matrix: &TravelMatrix,
    penalty: &P,
    config: &RouteConfig,
) -> Route {
    if route.opt_start_index >= route.len() {
        return route.clone();
    }

    let mut clock = DayClock::start(config);
    let mut prev = route.order[0];
    for &idx in &route.order[1..route.opt_start_index] {
        clock = clock
            .arrive(config, matrix, prev, idx)
            .leave(idx, kinds[idx], places[idx].visit_minutes());
        prev = idx;
    }

    let mut remaining: Vec<usize> = route.order[route.opt_start_index..].to_vec();
    let mut order = route.locked().to_vec();

    while !remaining.is_empty() {
        let mut best: Option<(usize, f64, Penalty)> = None;

        for (slot, &idx) in remaining.iter().enumerate() {
            let travel = matrix.minutes(prev, idx);
            let arrival = clock.arrive(config, matrix, prev, idx);
            let p = penalty.penalty(&places[idx], kinds[idx], arrival.minutes);
            let better = match &best {
                Some((_, best_travel, best_p)) => match p.severity_cmp(best_p) {
                    Ordering::Less => true,
                    Ordering::Equal => travel < *best_travel,
                    Ordering::Greater => false,
                },
                None => true,
            };
            if better {
                best = Some((slot, travel, p));
            }
        }

        let Some((slot, _, _)) = best else {
            break;
        };
        let idx = remaining.remove(slot);
        clock = clock
            .arrive(config, matrix, prev, idx)
            .leave(idx, kinds[idx], places[idx].visit_minutes());
        order.push(idx);
        prev = idx;
    }

    Route {
        order,
        opt_start_index: route.opt_start_index,
    }
}
