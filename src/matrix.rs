//! Distance and time matrices with taxi overrides.
//!
//! Every pair of places is either a walking leg (real distance, speed-derived
//! time) or a taxi leg. Taxi legs carry [`TAXI_SENTINEL_KM`] instead of a
//! distance so downstream code can tell them apart without re-classifying the
//! endpoints, and take a flat [`RouteConfig::taxi_fixed_minutes`].

use rayon::prelude::*;
use tracing::debug;

use crate::config::RouteConfig;
use crate::error::PlannerError;
use crate::place::{GeoPoint, Place, validate_places};
use crate::traits::GeoMetric;
use crate::zones::VenueKinds;

/// Placeholder distance for "must be a taxi ride".
///
/// Larger than any walk the planner would ever accept, but finite.
pub const TAXI_SENTINEL_KM: f64 = 999.0;

/// How a leg between two places is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegMode {
    Walk,
    Taxi,
}

/// Pairwise travel tables, indexed by place order in the request.
#[derive(Debug, Clone, PartialEq)]
pub struct TravelMatrix {
    distance_km: Vec<Vec<f64>>,
    minutes: Vec<Vec<f64>>,
    straight_km: Vec<Vec<f64>>,
}

struct Row {
    distance_km: Vec<f64>,
    minutes: Vec<f64>,
    straight_km: Vec<f64>,
}

impl TravelMatrix {
    /// Builds the matrix, rejecting places without usable coordinates.
    ///
    /// `kinds` must be parallel to `places`.
    pub fn build<M: GeoMetric>(
        places: &[Place],
        kinds: &[VenueKinds],
        config: &RouteConfig,
        metric: &M,
    ) -> Result<Self, PlannerError> {
        debug_assert_eq!(places.len(), kinds.len());
        validate_places(places)?;
        let points = places.iter().map(Place::point).collect::<Result<Vec<GeoPoint>, _>>()?;
        let n = points.len();

        let rows: Vec<Row> = (0..n)
            .into_par_iter()
            .map(|i| {
                let mut row = Row {
                    distance_km: vec![0.0; n],
                    minutes: vec![0.0; n],
                    straight_km: vec![0.0; n],
                };
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let km = metric.distance_km(points[i], points[j]);
                    row.straight_km[j] = km;
                    match leg_mode(km, kinds[i], kinds[j], config) {
                        LegMode::Walk => {
                            row.distance_km[j] = km;
                            row.minutes[j] = config.walk_minutes(km);
                        }
                        LegMode::Taxi => {
                            row.distance_km[j] = TAXI_SENTINEL_KM;
                            row.minutes[j] = config.taxi_fixed_minutes;
                        }
                    }
                }
                row
            })
            .collect();

        let mut matrix = TravelMatrix {
            distance_km: Vec::with_capacity(n),
            minutes: Vec::with_capacity(n),
            straight_km: Vec::with_capacity(n),
        };
        for row in rows {
            matrix.distance_km.push(row.distance_km);
            matrix.minutes.push(row.minutes);
            matrix.straight_km.push(row.straight_km);
        }

        debug!(places = n, taxi_legs = matrix.taxi_leg_count(), "travel matrix built");
        Ok(matrix)
    }

    pub fn len(&self) -> usize {
        self.distance_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_km.is_empty()
    }

    /// Walking distance, or [`TAXI_SENTINEL_KM`] for taxi legs.
    pub fn distance_km(&self, from: usize, to: usize) -> f64 {
        self.distance_km[from][to]
    }

    pub fn minutes(&self, from: usize, to: usize) -> f64 {
        self.minutes[from][to]
    }

    /// Great-circle distance regardless of leg mode.
    pub fn straight_km(&self, from: usize, to: usize) -> f64 {
        self.straight_km[from][to]
    }

    pub fn is_taxi(&self, from: usize, to: usize) -> bool {
        self.distance_km[from][to] == TAXI_SENTINEL_KM
    }

    pub fn mode(&self, from: usize, to: usize) -> LegMode {
        if self.is_taxi(from, to) {
            LegMode::Taxi
        } else {
            LegMode::Walk
        }
    }

    pub fn distances(&self) -> &[Vec<f64>] {
        &self.distance_km
    }

    pub fn times(&self) -> &[Vec<f64>] {
        &self.minutes
    }

    fn taxi_leg_count(&self) -> usize {
        let n = self.len();
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| i != j && self.is_taxi(i, j))
            .count()
    }
}

/// Decides walk vs. taxi for one leg.
///
/// Transport zones always force a taxi. Otherwise legs longer than the walking
/// limit become taxis, unless a hotel endpoint is exempt from that limit.
pub fn leg_mode(km: f64, from: VenueKinds, to: VenueKinds, config: &RouteConfig) -> LegMode {
    if from.is_transport_zone() || to.is_transport_zone() {
        return LegMode::Taxi;
    }
    let hotel_exempt = config.hotel_walk_exempt && (from.is_hotel() || to.is_hotel());
    if km > config.max_walk_distance_km && !hotel_exempt {
        return LegMode::Taxi;
    }
    LegMode::Walk
}
