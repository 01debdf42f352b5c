//! Great-circle distance and walking time.

use property_insights_models::{Coordinate, PlaceResult, PointOfInterest};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Walking pace in meters per minute.
pub const WALK_METERS_PER_MINUTE: f64 = 80.0;

/// Haversine distance between two points in kilometers.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (lat1.cos() * lat2.cos()).mul_add(
        (delta_lng / 2.0).sin().powi(2),
        (delta_lat / 2.0).sin().powi(2),
    );
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Whole minutes needed to walk `distance_km` at 80 m/min, rounded down.
///
/// `distance_km` must be non-negative; release builds saturate negative
/// input to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn walk_minutes(distance_km: f64) -> u32 {
    debug_assert!(distance_km >= 0.0, "negative distance {distance_km} km");
    (distance_km * 1000.0 / WALK_METERS_PER_MINUTE).floor() as u32
}

/// Builds a [`PointOfInterest`] for `place` as seen from `origin`.
#[must_use]
pub fn point_of_interest(
    origin: Coordinate,
    place: &PlaceResult,
    category: Option<String>,
) -> PointOfInterest {
    let distance_km = distance_km(origin, place.coordinate);
    PointOfInterest {
        name: place.name.clone(),
        category,
        distance_km,
        walk_minutes: walk_minutes(distance_km),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANELAGH: Coordinate = Coordinate::new(53.326, -6.256);
    const SPIRE: Coordinate = Coordinate::new(53.3498, -6.2603);

    #[test]
    fn self_distance_is_zero() {
        assert!(distance_km(RANELAGH, RANELAGH).abs() < 1e-12);
    }

    #[test]
    fn distance_is_symmetric() {
        let there = distance_km(RANELAGH, SPIRE);
        let back = distance_km(SPIRE, RANELAGH);
        assert!((there - back).abs() < 1e-9);
        assert!(there > 2.5 && there < 2.8, "got {there}");
    }

    #[test]
    fn london_to_paris() {
        let d = distance_km(
            Coordinate::new(51.5074, -0.1278),
            Coordinate::new(48.8566, 2.3522),
        );
        assert!((d - 344.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn walk_minutes_at_80_meters_per_minute() {
        assert_eq!(walk_minutes(0.0), 0);
        assert_eq!(walk_minutes(0.3), 3);
        assert_eq!(walk_minutes(1.0), 12);
        assert_eq!(walk_minutes(2.0), 25);
        assert_eq!(walk_minutes(12.0), 150);
    }

    #[test]
    fn poi_walk_minutes_follow_distance() {
        let place = PlaceResult {
            name: "The Spire".to_string(),
            coordinate: SPIRE,
            category_tags: vec![],
        };
        let poi = point_of_interest(RANELAGH, &place, None);
        assert_eq!(poi.name, "The Spire");
        assert_eq!(poi.category, None);
        assert_eq!(poi.walk_minutes, walk_minutes(poi.distance_km));
    }
}
