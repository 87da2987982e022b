//! Haversine great-circle distance.
//!
//! Straight-line distance ignores streets entirely, which is good enough for
//! deciding whether two medina venues are a short walk apart.

use crate::place::GeoPoint;
use crate::traits::GeoMetric;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct Haversine;

impl Haversine {
    /// Calculate haversine distance between two points in kilometers.
    pub fn km(from: GeoPoint, to: GeoPoint) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }
}

impl GeoMetric for Haversine {
    fn distance_km(&self, from: GeoPoint, to: GeoPoint) -> f64 {
        Self::km(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_same_point() {
        let p = GeoPoint::new(31.6258, -7.9891);
        let dist = Haversine::km(p, p);
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Marrakech (31.63, -7.99) to Casablanca (33.57, -7.59)
        // Actual great-circle distance ~218 km
        let dist = Haversine::km(GeoPoint::new(31.63, -7.99), GeoPoint::new(33.57, -7.59));
        assert!(dist > 205.0 && dist < 230.0, "Marrakech to Casablanca should be ~218km, got {}", dist);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = GeoPoint::new(31.6258, -7.9891);
        let b = GeoPoint::new(31.6417, -8.0033);
        assert!((Haversine::km(a, b) - Haversine::km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_metric_trait_matches_inherent() {
        let a = GeoPoint::new(31.6258, -7.9891);
        let b = GeoPoint::new(31.6172, -7.9892);
        assert_eq!(Haversine.distance_km(a, b), Haversine::km(a, b));
    }
}
